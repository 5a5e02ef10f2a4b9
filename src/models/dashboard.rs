// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::budget::BudgetStatus;
use crate::models::pipeline::StageId;
use crate::models::work::WorkStatus;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatusCount {
    pub status: BudgetStatus,
    #[schema(example = 4)]
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkStatusCount {
    pub status: WorkStatus,
    #[schema(example = 2)]
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: StageId,
    #[schema(example = "Execução")]
    pub title: &'static str,
    #[schema(example = 3)]
    pub count: i64,
}

// Resumo do painel: contagens por status + obras ativas por etapa do
// pipeline (derivadas obra a obra pela função pura de estágio).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub budgets_by_status: Vec<BudgetStatusCount>,
    pub works_by_status: Vec<WorkStatusCount>,
    pub pipeline: Vec<StageCount>,
}
