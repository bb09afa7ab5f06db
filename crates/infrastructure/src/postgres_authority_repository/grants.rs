use super::*;

fn role_id_filter(query: &RolePermissionQuery) -> Option<Vec<i64>> {
    query
        .role_ids
        .as_ref()
        .map(|role_ids| role_ids.iter().map(RoleId::as_i64).collect())
}

pub(super) async fn list_role_permissions<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    query: &RolePermissionQuery,
) -> AppResult<Vec<RolePermission>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        SELECT id, role_id, permission_id
        FROM {}
        WHERE ($1::bigint[] IS NULL OR role_id = ANY($1))
            AND ($2::bigint IS NULL OR permission_id = $2)
        ORDER BY id
        LIMIT $3::bigint
        "#,
        tables.role_permissions
    );

    let rows = sqlx::query_as::<_, RolePermissionRow>(sql.as_str())
        .bind(role_id_filter(query))
        .bind(query.permission_id.map(|permission_id| permission_id.as_i64()))
        .bind(query_limit(query.limit))
        .fetch_all(executor)
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to list role permissions: {error}"))
        })?;

    Ok(rows.into_iter().map(RolePermission::from).collect())
}

pub(super) async fn insert_role_permission<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    role_id: RoleId,
    permission_id: PermissionId,
) -> AppResult<RolePermission>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO {} (role_id, permission_id)
        VALUES ($1, $2)
        RETURNING id, role_id, permission_id
        "#,
        tables.role_permissions
    );

    sqlx::query_as::<_, RolePermissionRow>(sql.as_str())
        .bind(role_id.as_i64())
        .bind(permission_id.as_i64())
        .fetch_one(executor)
        .await
        .map(RolePermission::from)
        .map_err(|error| {
            map_unique_violation(
                error,
                "grant permission",
                &format!("grant of permission {permission_id} to role {role_id}"),
            )
        })
}

pub(super) async fn delete_role_permissions<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    query: &RolePermissionQuery,
) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    if query.is_unfiltered() {
        return Err(AppError::Validation(
            "refusing to delete role permissions without a filter".to_owned(),
        ));
    }

    let sql = format!(
        r#"
        DELETE FROM {}
        WHERE ($1::bigint[] IS NULL OR role_id = ANY($1))
            AND ($2::bigint IS NULL OR permission_id = $2)
        "#,
        tables.role_permissions
    );

    let result = sqlx::query(sql.as_str())
        .bind(role_id_filter(query))
        .bind(query.permission_id.map(|permission_id| permission_id.as_i64()))
        .execute(executor)
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to delete role permissions: {error}"))
        })?;

    Ok(result.rows_affected())
}

pub(super) async fn list_user_roles<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    query: &UserRoleQuery,
) -> AppResult<Vec<UserRole>>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        SELECT id, user_id, role_id
        FROM {}
        WHERE ($1::uuid IS NULL OR user_id = $1)
            AND ($2::bigint IS NULL OR role_id = $2)
        ORDER BY id
        LIMIT $3::bigint
        "#,
        tables.user_roles
    );

    let rows = sqlx::query_as::<_, UserRoleRow>(sql.as_str())
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.role_id.map(|role_id| role_id.as_i64()))
        .bind(query_limit(query.limit))
        .fetch_all(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to list user roles: {error}")))?;

    Ok(rows.into_iter().map(UserRole::from).collect())
}

pub(super) async fn insert_user_role<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    user_id: UserId,
    role_id: RoleId,
) -> AppResult<UserRole>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO {} (user_id, role_id)
        VALUES ($1, $2)
        RETURNING id, user_id, role_id
        "#,
        tables.user_roles
    );

    sqlx::query_as::<_, UserRoleRow>(sql.as_str())
        .bind(user_id.as_uuid())
        .bind(role_id.as_i64())
        .fetch_one(executor)
        .await
        .map(UserRole::from)
        .map_err(|error| {
            map_unique_violation(
                error,
                "assign role",
                &format!("assignment of role {role_id} to user {user_id}"),
            )
        })
}

pub(super) async fn delete_user_roles<'e, E>(
    executor: E,
    tables: &AuthorityTables,
    query: &UserRoleQuery,
) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    if query.is_unfiltered() {
        return Err(AppError::Validation(
            "refusing to delete user roles without a filter".to_owned(),
        ));
    }

    let sql = format!(
        r#"
        DELETE FROM {}
        WHERE ($1::uuid IS NULL OR user_id = $1)
            AND ($2::bigint IS NULL OR role_id = $2)
        "#,
        tables.user_roles
    );

    let result = sqlx::query(sql.as_str())
        .bind(query.user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.role_id.map(|role_id| role_id.as_i64()))
        .execute(executor)
        .await
        .map_err(|error| AppError::Storage(format!("failed to delete user roles: {error}")))?;

    Ok(result.rows_affected())
}
