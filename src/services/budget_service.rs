// src/services/budget_service.rs

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::BudgetRepository;
use crate::models::budget::{
    self, Budget, BudgetStatus, BudgetTransitionCtx, CreateBudgetPayload,
};
use crate::models::rbac::Role;

// Tentativas de CAS antes de devolver `Conflict` ao chamador.
const MAX_TRANSITION_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct BudgetService {
    repo: BudgetRepository,
    pool: PgPool,
}

impl BudgetService {
    pub fn new(repo: BudgetRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_budget(
        &self,
        payload: &CreateBudgetPayload,
        created_by: Uuid,
    ) -> Result<Budget, AppError> {
        let budget = self.repo.create_budget(&self.pool, payload, created_by).await?;
        tracing::info!("Orçamento {} criado como rascunho", budget.id);
        Ok(budget)
    }

    pub async fn get_budget(&self, id: Uuid) -> Result<Budget, AppError> {
        self.repo.get_budget(id).await?.ok_or(AppError::NotFound("Orçamento"))
    }

    pub async fn list_budgets(&self) -> Result<Vec<Budget>, AppError> {
        self.repo.list_budgets().await
    }

    // Transição de status: lê o registro, valida a aresta contra a tabela
    // (com os papéis explícitos do ator) e aplica via compare-and-swap.
    // Corrida perdida refaz a leitura até esgotar as tentativas; falhas
    // determinísticas (Forbidden, IllegalTransition, ...) saem na hora.
    pub async fn transition(
        &self,
        id: Uuid,
        to: BudgetStatus,
        actor_roles: &[Role],
    ) -> Result<Budget, AppError> {
        let mut attempt = 0;
        loop {
            let current = self.get_budget(id).await?;

            // O guard de obra ativa só interessa ao cancelamento de um
            // orçamento já aprovado.
            let guarded_cancel = to == BudgetStatus::Cancelado && current.status.is_approved();
            let ctx = if guarded_cancel {
                BudgetTransitionCtx { has_active_work: self.repo.has_active_work(id).await? }
            } else {
                BudgetTransitionCtx::default()
            };

            budget::validate_transition(current.status, to, actor_roles, ctx)?;

            // No cancelamento guardado, o NOT EXISTS vai junto do CAS: uma
            // obra criada entre o probe e a escrita ainda invalida a escrita.
            let result = if guarded_cancel {
                self.repo.cancel_approved(&self.pool, id, current.status).await
            } else {
                self.repo.update_status(&self.pool, id, current.status, to).await
            };

            match result {
                Ok(updated) => {
                    tracing::info!(
                        "Orçamento {}: {} -> {}",
                        id,
                        current.status.as_str(),
                        to.as_str()
                    );
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() && attempt + 1 < MAX_TRANSITION_ATTEMPTS => {
                    attempt += 1;
                    tracing::warn!(
                        "Conflito de status no orçamento {} (tentativa {})",
                        id,
                        attempt
                    );
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
