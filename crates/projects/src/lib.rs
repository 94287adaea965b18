//! Crafting projects: named shopping goals made of several target items.

pub mod project;

pub use project::{NewProject, NewProjectItem, Project, ProjectItem, ValidProject};
