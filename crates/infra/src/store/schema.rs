//! SQLite schema bootstrap.

use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        item_name    TEXT    NOT NULL,
        tier         TEXT    NOT NULL,
        quantity     INTEGER NOT NULL DEFAULT 0,
        category     TEXT    NOT NULL,
        source       TEXT    NOT NULL DEFAULT '',
        is_craftable INTEGER NOT NULL DEFAULT 0,
        notes        TEXT    NOT NULL DEFAULT '',
        PRIMARY KEY (item_name, tier)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        recipe_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        recipe_name TEXT    NOT NULL UNIQUE,
        output_item TEXT    NOT NULL,
        output_qty  INTEGER NOT NULL,
        is_shaped   INTEGER NOT NULL DEFAULT 0,
        notes       TEXT    NOT NULL DEFAULT ''
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_recipes_output_item ON recipes (output_item)",
    r#"
    CREATE TABLE IF NOT EXISTS ingredients (
        ingredient_id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipe_id     INTEGER NOT NULL REFERENCES recipes (recipe_id) ON DELETE CASCADE,
        input_item    TEXT    NOT NULL,
        quantity      INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ingredients_recipe_id ON ingredients (recipe_id)",
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        project_id  INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT    NOT NULL,
        description TEXT    NOT NULL DEFAULT '',
        created_at  TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS project_items (
        project_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id      INTEGER NOT NULL REFERENCES projects (project_id) ON DELETE CASCADE,
        item_name       TEXT    NOT NULL,
        tier            TEXT    NOT NULL DEFAULT '',
        quantity        INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_project_items_project_id ON project_items (project_id)",
];

/// Create every table and index that does not exist yet.
pub(crate) async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
