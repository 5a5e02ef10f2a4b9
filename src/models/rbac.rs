// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// O conjunto fechado de papéis do sistema (enum `app_role` no banco).
// Um usuário pode acumular vários papéis; cada vínculo é uma linha
// independente em `user_roles`, sem hierarquia implícita.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Gestor,
    Projetista,
    Engenheiro,
    Campo,
    Cliente,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Gestor,
        Role::Projetista,
        Role::Engenheiro,
        Role::Campo,
        Role::Cliente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Gestor => "gestor",
            Role::Projetista => "projetista",
            Role::Engenheiro => "engenheiro",
            Role::Campo => "campo",
            Role::Cliente => "cliente",
        }
    }
}

// Predicado de autorização usado por todas as transições: basta UM papel
// do ator estar entre os exigidos pela aresta. Conjunto vazio nega tudo.
pub fn role_allowed(held: &[Role], required: &[Role]) -> bool {
    held.iter().any(|r| required.contains(r))
}

// O que sai do banco (Tabela user_roles)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

// O Payload para atribuir um papel a um usuário (somente admin)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    #[schema(example = "projetista")]
    pub role: Role,
}

// Resposta com os papéis de um usuário
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolesResponse {
    pub user_id: Uuid,
    #[schema(example = json!(["gestor", "engenheiro"]))]
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunto_vazio_nega_tudo() {
        for required in [&[Role::Admin][..], &Role::ALL[..]] {
            assert!(!role_allowed(&[], required));
        }
    }

    #[test]
    fn basta_um_papel_autorizado() {
        assert!(role_allowed(&[Role::Cliente, Role::Gestor], &[Role::Gestor, Role::Admin]));
        assert!(!role_allowed(&[Role::Cliente, Role::Campo], &[Role::Gestor, Role::Admin]));
    }

    #[test]
    fn literais_do_banco() {
        let esperado = ["admin", "gestor", "projetista", "engenheiro", "campo", "cliente"];
        for (role, lit) in Role::ALL.iter().zip(esperado) {
            assert_eq!(role.as_str(), lit);
        }
    }
}
