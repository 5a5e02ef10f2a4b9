// src/db/dashboard_repo.rs

use sqlx::{FromRow, PgPool};

use crate::common::error::AppError;
use crate::models::budget::BudgetStatus;
use crate::models::work::WorkStatus;

// Linha mínima para derivar a etapa de pipeline de cada obra.
#[derive(Debug, FromRow)]
pub struct WorkStageRow {
    pub status: WorkStatus,
    pub started: bool,
    pub book_ready: bool,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn budgets_by_status(&self) -> Result<Vec<(BudgetStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (BudgetStatus, i64)>(
            "SELECT status, COUNT(*) FROM budgets GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn works_by_status(&self) -> Result<Vec<(WorkStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (WorkStatus, i64)>(
            "SELECT status, COUNT(*) FROM works GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // Recorte de cada obra para o mapeamento puro de etapa do pipeline.
    pub async fn work_stage_rows(&self) -> Result<Vec<WorkStageRow>, AppError> {
        let rows = sqlx::query_as::<_, WorkStageRow>(
            r#"
            SELECT w.status,
                   (w.start_date IS NOT NULL) AS started,
                   EXISTS (
                       SELECT 1 FROM documents d
                       WHERE d.work_id = w.id AND 'book_final' = ANY(d.tags)
                   ) AS book_ready
            FROM works w
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
