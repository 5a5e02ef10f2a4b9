// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::{Role, UserRole};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Papéis de um usuário. Sem vínculos = conjunto vazio, nunca erro:
    // quem não tem papel simplesmente não passa em nenhum predicado.
    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_scalar::<_, Role>(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    pub async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: Role,
    ) -> Result<UserRole, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Vínculo duplicado é idempotente graças ao ON CONFLICT.
        let assignment = sqlx::query_as::<_, UserRole>(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO UPDATE SET role = EXCLUDED.role
            RETURNING id, user_id, role, created_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(assignment)
    }

    pub async fn remove_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: Role,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role = $2")
            .bind(user_id)
            .bind(role)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
