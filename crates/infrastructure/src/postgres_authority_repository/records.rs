//! Queries shared by the roles and permissions tables, which have the same shape.

use super::*;

pub(super) async fn find_by_name<'e, E>(
    executor: E,
    table: &str,
    name: &str,
    lock: bool,
) -> AppResult<Option<NamedRow>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT id, name, description FROM {table} WHERE name = $1{}",
        if lock { " FOR UPDATE" } else { "" }
    );

    sqlx::query_as::<_, NamedRow>(sql.as_str())
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to find {table} row '{name}': {error}")))
}

pub(super) async fn find_by_id<'e, E>(
    executor: E,
    table: &str,
    id: i64,
) -> AppResult<Option<NamedRow>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT id, name, description FROM {table} WHERE id = $1");

    sqlx::query_as::<_, NamedRow>(sql.as_str())
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to find {table} row {id}: {error}")))
}

pub(super) async fn list<'e, E>(executor: E, table: &str) -> AppResult<Vec<NamedRow>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT id, name, description FROM {table} ORDER BY id");

    sqlx::query_as::<_, NamedRow>(sql.as_str())
        .fetch_all(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list {table}: {error}")))
}

pub(super) async fn insert<'e, E>(
    executor: E,
    table: &str,
    name: &str,
    description: &str,
) -> AppResult<NamedRow>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO {table} (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description
        "#
    );

    sqlx::query_as::<_, NamedRow>(sql.as_str())
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|error| {
            map_unique_violation(error, "insert record", &format!("'{name}' in {table}"))
        })
}

pub(super) async fn update<'e, E>(
    executor: E,
    table: &str,
    id: i64,
    name: &str,
    description: &str,
) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let sql = format!("UPDATE {table} SET name = $2, description = $3 WHERE id = $1");

    sqlx::query(sql.as_str())
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(executor)
        .await
        .map_err(|error| {
            map_unique_violation(error, "update record", &format!("'{name}' in {table}"))
        })?;

    Ok(())
}

pub(super) async fn delete<'e, E>(executor: E, table: &str, id: i64) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let sql = format!("DELETE FROM {table} WHERE id = $1");

    sqlx::query(sql.as_str())
        .bind(id)
        .execute(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to delete {table} row {id}: {error}")))?;

    Ok(())
}
