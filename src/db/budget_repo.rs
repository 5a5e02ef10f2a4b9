// src/db/budget_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::budget::{Budget, BudgetStatus, CreateBudgetPayload};

const BUDGET_COLUMNS: &str = "id, client_name, client_contact, local, description, \
     initial_survey, status, technical_responsible, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct BudgetRepository {
    pool: PgPool,
}

impl BudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_budget<'e, E>(
        &self,
        executor: E,
        payload: &CreateBudgetPayload,
        created_by: Uuid,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Todo orçamento nasce como `rascunho`; o default da coluna garante.
        let budget = sqlx::query_as::<_, Budget>(&format!(
            r#"
            INSERT INTO budgets
                (client_name, client_contact, local, description, initial_survey,
                 technical_responsible, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(&payload.client_name)
        .bind(&payload.client_contact)
        .bind(&payload.local)
        .bind(&payload.description)
        .bind(&payload.initial_survey)
        .bind(payload.technical_responsible)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(budget)
    }

    pub async fn get_budget(&self, id: Uuid) -> Result<Option<Budget>, AppError> {
        let budget = sqlx::query_as::<_, Budget>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    pub async fn list_budgets(&self) -> Result<Vec<Budget>, AppError> {
        let budgets = sqlx::query_as::<_, Budget>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(budgets)
    }

    // Compare-and-swap do status: a escrita só acontece se o status ainda
    // for o lido pelo chamador. Nenhuma linha afetada = corrida perdida.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected: BudgetStatus,
        new_status: BudgetStatus,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Budget>(&format!(
            r#"
            UPDATE budgets
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(new_status)
        .fetch_optional(executor)
        .await?;

        // O chamador já leu o registro; se sumiu daqui, foi o status que
        // mudou embaixo dele, não o registro que deixou de existir.
        updated.ok_or(AppError::Conflict)
    }

    // CAS do cancelamento de orçamento aprovado: além do status esperado, a
    // escrita exige ausência de obra ativa no mesmo instante. Zero linhas =
    // corrida perdida; a releitura do chamador decide entre Forbidden e novo
    // CAS.
    pub async fn cancel_approved<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected: BudgetStatus,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Budget>(&format!(
            r#"
            UPDATE budgets
            SET status = 'cancelado', updated_at = now()
            WHERE id = $1 AND status = $2
              AND NOT EXISTS (
                  SELECT 1 FROM works
                  WHERE budget_id = $1
                    AND status NOT IN ('finalizado', 'cancelado')
              )
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .fetch_optional(executor)
        .await?;

        updated.ok_or(AppError::Conflict)
    }

    // Existe obra não-terminal pendurada neste orçamento?
    pub async fn has_active_work(&self, budget_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM works
                WHERE budget_id = $1
                  AND status NOT IN ('finalizado', 'cancelado')
            )
            "#,
        )
        .bind(budget_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
