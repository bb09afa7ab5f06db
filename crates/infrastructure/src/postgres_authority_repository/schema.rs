use super::*;

impl AuthorityTables {
    pub(super) fn schema_statements(&self) -> Vec<String> {
        let Self {
            prefix,
            roles,
            permissions,
            role_permissions,
            user_roles,
        } = self;

        vec![
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {roles} (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL DEFAULT ''
                )
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {permissions} (
                    id BIGSERIAL PRIMARY KEY,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL DEFAULT ''
                )
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {role_permissions} (
                    id BIGSERIAL PRIMARY KEY,
                    role_id BIGINT NOT NULL REFERENCES {roles} (id),
                    permission_id BIGINT NOT NULL REFERENCES {permissions} (id),
                    UNIQUE (role_id, permission_id)
                )
                "#
            ),
            format!(
                r#"
                CREATE INDEX IF NOT EXISTS {prefix}role_permissions_permission_id_idx
                    ON {role_permissions} (permission_id)
                "#
            ),
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {user_roles} (
                    id BIGSERIAL PRIMARY KEY,
                    user_id UUID NOT NULL,
                    role_id BIGINT NOT NULL REFERENCES {roles} (id),
                    UNIQUE (user_id, role_id)
                )
                "#
            ),
            format!(
                r#"
                CREATE INDEX IF NOT EXISTS {prefix}user_roles_role_id_idx
                    ON {user_roles} (role_id)
                "#
            ),
        ]
    }
}

impl PostgresAuthorityRepository {
    /// Creates the four tables and their indexes when missing.
    ///
    /// Concurrent bootstraps with the same prefix serialize on an advisory lock.
    pub(super) async fn ensure_schema_impl(&self) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Storage(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("authority-schema:{}", self.tables.prefix))
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to lock authority schema: {error}"))
            })?;

        for statement in self.tables.schema_statements() {
            sqlx::query(statement.as_str())
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Storage(format!("failed to create authority schema: {error}"))
                })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Storage(format!("failed to commit transaction: {error}"))
        })?;

        tracing::debug!(prefix = %self.tables.prefix, "authority tables ensured");
        Ok(())
    }
}
