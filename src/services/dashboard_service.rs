// src/services/dashboard_service.rs

use std::collections::BTreeMap;

use crate::common::error::AppError;
use crate::db::DashboardRepository;
use crate::models::budget::BudgetStatus;
use crate::models::dashboard::{
    BudgetStatusCount, DashboardSummary, StageCount, WorkStatusCount,
};
use crate::models::pipeline::{self, StageId, WorkSnapshot};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn summary(&self) -> Result<DashboardSummary, AppError> {
        let budgets_by_status = self
            .repo
            .budgets_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| BudgetStatusCount { status, count })
            .collect::<Vec<_>>();

        let works_by_status = self
            .repo
            .works_by_status()
            .await?
            .into_iter()
            .map(|(status, count)| WorkStatusCount { status, count })
            .collect::<Vec<_>>();

        // Etapa "orcamento": orçamentos ainda em elaboração/aprovação.
        let mut per_stage: BTreeMap<StageId, i64> = BTreeMap::new();
        for entry in &budgets_by_status {
            if !entry.status.is_approved() && entry.status != BudgetStatus::Cancelado {
                *per_stage.entry(StageId::Orcamento).or_default() += entry.count;
            }
        }

        // Demais etapas: cada obra mapeada pela derivação pura de estágio.
        // Obras só existem sob orçamento aprovado.
        for row in self.repo.work_stage_rows().await? {
            let snapshot = WorkSnapshot {
                status: row.status,
                started: row.started,
                book_ready: row.book_ready,
            };
            if let Some(stage) = pipeline::active_stage(BudgetStatus::Aprovado, Some(&snapshot)) {
                *per_stage.entry(stage).or_default() += 1;
            }
        }

        let pipeline = StageId::ALL
            .iter()
            .map(|&stage| StageCount {
                stage,
                title: stage.title(),
                count: per_stage.get(&stage).copied().unwrap_or(0),
            })
            .collect();

        Ok(DashboardSummary { budgets_by_status, works_by_status, pipeline })
    }
}
