// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::User, rbac::Role},
};

// O Trait que define o papel exigido por um endpoint.
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

// Papéis usados como guardião de rota. As transições de status NÃO passam
// por aqui: elas recebem o conjunto de papéis do ator como argumento e
// validam contra a tabela da máquina de estados.
pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn role() -> Role {
        Role::Admin
    }
}

// O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // Usuário vem do auth_guard, que roda antes.
        let user = parts.extensions.get::<User>().cloned().ok_or(AppError::InvalidToken)?;

        let allowed = app_state.rbac_service.has_role(user.id, T::role()).await?;
        if !allowed {
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}
