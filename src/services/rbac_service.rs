// src/services/rbac_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{RbacRepository, UserRepository};
use crate::models::rbac::{Role, RolesResponse, UserRole};

// Registro de Papéis: leituras sem efeito colateral sobre a tabela
// `user_roles`. Usuário sem vínculo recebe conjunto vazio ("nega tudo"),
// nunca um erro.
#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(repo: RbacRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<Role>, AppError> {
        self.repo.roles_of(user_id).await
    }

    pub async fn has_role(&self, user_id: Uuid, role: Role) -> Result<bool, AppError> {
        self.repo.has_role(user_id, role).await
    }

    pub async fn roles_response(&self, user_id: Uuid) -> Result<RolesResponse, AppError> {
        let roles = self.repo.roles_of(user_id).await?;
        Ok(RolesResponse { user_id, roles })
    }

    pub async fn assign_role(&self, user_id: Uuid, role: Role) -> Result<UserRole, AppError> {
        // Vínculo só para usuário existente.
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        let assignment = self.repo.assign_role(&self.pool, user_id, role).await?;
        tracing::info!("Papel '{}' atribuído ao usuário {}", role.as_str(), user_id);
        Ok(assignment)
    }

    pub async fn remove_role(&self, user_id: Uuid, role: Role) -> Result<(), AppError> {
        let removed = self.repo.remove_role(&self.pool, user_id, role).await?;
        if removed == 0 {
            return Err(AppError::NotFound("Vínculo de papel"));
        }
        Ok(())
    }
}
