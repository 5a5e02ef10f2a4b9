// src/models/work.rs
//
// Máquina de estados da Obra. Uma obra só nasce de um orçamento da família
// "aprovado" e carrega a referência imutável a ele. As arestas ficam na
// tabela explícita abaixo; condições extras (data de início, checklists)
// são guards avaliados sobre um contexto passado pelo chamador.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::budget::BudgetStatus;
use crate::models::rbac::{role_allowed, Role};

// --- Enums ---

// Status da obra (enum `work_status` no banco).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "work_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Planejamento,
    AguardandoInicio,
    EmExecucao,
    Suspenso,
    Finalizado,
    Cancelado,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 6] = [
        WorkStatus::Planejamento,
        WorkStatus::AguardandoInicio,
        WorkStatus::EmExecucao,
        WorkStatus::Suspenso,
        WorkStatus::Finalizado,
        WorkStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Planejamento => "planejamento",
            WorkStatus::AguardandoInicio => "aguardando_inicio",
            WorkStatus::EmExecucao => "em_execucao",
            WorkStatus::Suspenso => "suspenso",
            WorkStatus::Finalizado => "finalizado",
            WorkStatus::Cancelado => "cancelado",
        }
    }

    // `finalizado` não regride nem para `cancelado`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkStatus::Finalizado | WorkStatus::Cancelado)
    }
}

// Categoria de foto de campo (enum `photo_category` no banco). O núcleo
// consome o valor, nunca o transiciona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "photo_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PhotoCategory {
    Antes,
    Durante,
    Depois,
    Risco,
    Pendencia,
    Correcao,
    MaterialAplicado,
}

// --- Tabela de transições ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkGuard {
    // `aguardando_inicio -> em_execucao` exige data de início definida.
    StartDateSet,
    // `em_execucao -> finalizado` exige todos os checklists concluídos.
    ChecklistsComplete,
}

pub struct WorkTransition {
    pub from: WorkStatus,
    pub to: WorkStatus,
    pub roles: &'static [Role],
    pub guard: Option<WorkGuard>,
}

pub const WORK_TRANSITIONS: &[WorkTransition] = &[
    WorkTransition {
        from: WorkStatus::Planejamento,
        to: WorkStatus::AguardandoInicio,
        roles: &[Role::Engenheiro, Role::Gestor, Role::Admin],
        guard: None,
    },
    WorkTransition {
        from: WorkStatus::AguardandoInicio,
        to: WorkStatus::EmExecucao,
        roles: &[Role::Campo, Role::Engenheiro, Role::Gestor, Role::Admin],
        guard: Some(WorkGuard::StartDateSet),
    },
    WorkTransition {
        from: WorkStatus::AguardandoInicio,
        to: WorkStatus::Suspenso,
        roles: &[Role::Gestor, Role::Engenheiro, Role::Admin],
        guard: None,
    },
    WorkTransition {
        from: WorkStatus::EmExecucao,
        to: WorkStatus::Suspenso,
        roles: &[Role::Gestor, Role::Engenheiro, Role::Admin],
        guard: None,
    },
    // A suspensão só retorna para a execução.
    WorkTransition {
        from: WorkStatus::Suspenso,
        to: WorkStatus::EmExecucao,
        roles: &[Role::Gestor, Role::Engenheiro, Role::Admin],
        guard: None,
    },
    WorkTransition {
        from: WorkStatus::EmExecucao,
        to: WorkStatus::Finalizado,
        roles: &[Role::Gestor, Role::Admin],
        guard: Some(WorkGuard::ChecklistsComplete),
    },
];

// Curinga: cancelar qualquer obra não-terminal (somente admin).
pub const WORK_CANCEL_ROLES: &[Role] = &[Role::Admin];

// Pré-condição de existência: uma obra só nasce de orçamento da família
// "aprovado". A escrita no repositório reaplica a mesma condição de forma
// atômica; esta função dá o erro tipado determinístico.
pub fn ensure_budget_approved(budget_status: BudgetStatus) -> Result<(), AppError> {
    if budget_status.is_approved() {
        Ok(())
    } else {
        Err(AppError::BudgetNotApproved)
    }
}

// Contexto do registro no momento da transição, passado pelo chamador.
#[derive(Debug, Clone, Copy)]
pub struct WorkTransitionCtx {
    pub start_date_set: bool,
    pub pending_checklists: usize,
}

impl Default for WorkTransitionCtx {
    fn default() -> Self {
        Self { start_date_set: true, pending_checklists: 0 }
    }
}

// Validação pura da aresta `from -> to`; o CAS fica no repositório.
pub fn validate_transition(
    from: WorkStatus,
    to: WorkStatus,
    actor_roles: &[Role],
    ctx: WorkTransitionCtx,
) -> Result<(), AppError> {
    if let Some(t) = WORK_TRANSITIONS.iter().find(|t| t.from == from && t.to == to) {
        if !role_allowed(actor_roles, t.roles) {
            return Err(AppError::Forbidden);
        }
        match t.guard {
            Some(WorkGuard::StartDateSet) if !ctx.start_date_set => {
                return Err(AppError::StartDateMissing);
            }
            Some(WorkGuard::ChecklistsComplete) if ctx.pending_checklists > 0 => {
                return Err(AppError::ChecklistsIncomplete(ctx.pending_checklists));
            }
            _ => {}
        }
        return Ok(());
    }

    if !from.is_terminal() {
        if to == WorkStatus::Cancelado {
            return if role_allowed(actor_roles, WORK_CANCEL_ROLES) {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            };
        }
        return Err(AppError::IllegalTransition { from: from.as_str(), to: to.as_str() });
    }

    Err(AppError::AlreadyTerminal(from.as_str()))
}

// --- Structs ---

// O que sai do banco (Tabela works)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    // Orçamento de origem: obrigatório e imutável após a criação.
    pub budget_id: Uuid,

    #[schema(example = "Retrofit subestação - Jardim das Acácias")]
    pub name: String,

    #[schema(example = "OB-2025-014")]
    pub work_code: String,

    // Números externos de autorização, quando existirem.
    #[schema(example = "OS-4451")]
    pub os_number: Option<String>,
    #[schema(example = "ART-SP-889123")]
    pub art_number: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,

    pub status: WorkStatus,

    pub team_leader: Option<Uuid>,
    pub technical_responsible: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O Payload para criar uma obra a partir de um orçamento aprovado
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkPayload {
    pub budget_id: Uuid,

    #[validate(length(min = 1, message = "O nome da obra é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "O código da obra é obrigatório."))]
    #[schema(example = "OB-2025-014")]
    pub work_code: String,

    pub os_number: Option<String>,
    pub art_number: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,

    pub team_leader: Option<Uuid>,
    pub technical_responsible: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionWorkPayload {
    #[schema(example = "em_execucao")]
    pub status: WorkStatus,
}

// Atualização de cronograma (datas planejadas/reais)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkDatesPayload {
    pub start_date: Option<NaiveDate>,
    pub planned_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
}

// --- Checklists ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: Uuid,
    pub work_id: Uuid,

    #[schema(example = "Medições finais NR-10")]
    pub title: String,

    #[schema(example = "seguranca")]
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,

    pub completed: bool,
    pub completed_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,

    #[schema(example = "Torque dos barramentos conferido")]
    pub description: String,

    pub checked: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Resposta completa (Checklist + Itens)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResponse {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    #[serde(rename = "type")]
    #[schema(example = "seguranca")]
    pub kind: String,

    #[validate(length(min = 1, message = "Informe ao menos um item."))]
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChecklistItemPayload {
    pub checked: bool,
    pub notes: Option<String>,
}

// --- Documentos (somente metadados; upload de bytes fica fora do núcleo) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub budget_id: Option<Uuid>,
    pub work_id: Option<Uuid>,

    #[schema(example = "book-final-ob-2025-014.pdf")]
    pub filename: String,
    #[schema(example = "pdf")]
    pub file_type: String,
    pub storage_path: String,

    #[schema(example = json!(["book_final", "as_built"]))]
    pub tags: Option<Vec<String>>,

    pub version: i32,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

// Tag que marca o pacote de documentação final de uma obra.
pub const BOOK_FINAL_TAG: &str = "book_final";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentPayload {
    #[validate(length(min = 1, message = "O nome do arquivo é obrigatório."))]
    pub filename: String,

    #[validate(length(min = 1, message = "O tipo do arquivo é obrigatório."))]
    pub file_type: String,

    #[validate(length(min = 1, message = "O caminho de armazenamento é obrigatório."))]
    pub storage_path: String,

    pub tags: Option<Vec<String>>,
}

// --- Fotos de campo ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub work_id: Uuid,
    pub category: PhotoCategory,
    pub storage_path: String,
    pub caption: Option<String>,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhotoPayload {
    #[schema(example = "durante")]
    pub category: PhotoCategory,

    #[validate(length(min = 1, message = "O caminho de armazenamento é obrigatório."))]
    pub storage_path: String,

    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODOS: &[Role] = &Role::ALL;

    fn ctx() -> WorkTransitionCtx {
        WorkTransitionCtx::default()
    }

    #[test]
    fn criar_obra_exige_orcamento_da_familia_aprovado() {
        for status in BudgetStatus::ALL {
            let res = ensure_budget_approved(status);
            if matches!(status, BudgetStatus::Aprovado | BudgetStatus::AprovadoRessalvas) {
                assert!(res.is_ok(), "{:?} deveria permitir criar obra", status);
            } else {
                assert!(
                    matches!(res, Err(AppError::BudgetNotApproved)),
                    "{:?} deveria falhar com BudgetNotApproved",
                    status
                );
            }
        }
    }

    #[test]
    fn caminho_feliz_da_obra() {
        let passos = [
            (WorkStatus::Planejamento, WorkStatus::AguardandoInicio, Role::Engenheiro),
            (WorkStatus::AguardandoInicio, WorkStatus::EmExecucao, Role::Campo),
            (WorkStatus::EmExecucao, WorkStatus::Finalizado, Role::Gestor),
        ];
        for (from, to, role) in passos {
            validate_transition(from, to, &[role], ctx())
                .unwrap_or_else(|e| panic!("{:?} -> {:?} com {:?}: {e}", from, to, role));
        }
    }

    #[test]
    fn suspensao_e_retomada() {
        for from in [WorkStatus::AguardandoInicio, WorkStatus::EmExecucao] {
            assert!(
                validate_transition(from, WorkStatus::Suspenso, &[Role::Engenheiro], ctx())
                    .is_ok()
            );
        }
        assert!(
            validate_transition(WorkStatus::Suspenso, WorkStatus::EmExecucao, &[Role::Gestor], ctx())
                .is_ok()
        );
        // Suspenso não volta para planejamento nem pula para finalizado.
        for to in [WorkStatus::Planejamento, WorkStatus::AguardandoInicio, WorkStatus::Finalizado] {
            assert!(matches!(
                validate_transition(WorkStatus::Suspenso, to, TODOS, ctx()),
                Err(AppError::IllegalTransition { .. })
            ));
        }
    }

    #[test]
    fn iniciar_execucao_exige_data_de_inicio() {
        let sem_data = WorkTransitionCtx { start_date_set: false, pending_checklists: 0 };
        assert!(matches!(
            validate_transition(
                WorkStatus::AguardandoInicio,
                WorkStatus::EmExecucao,
                &[Role::Campo],
                sem_data
            ),
            Err(AppError::StartDateMissing)
        ));
    }

    #[test]
    fn finalizar_exige_checklists_concluidos() {
        let pendente = WorkTransitionCtx { start_date_set: true, pending_checklists: 1 };
        assert!(matches!(
            validate_transition(
                WorkStatus::EmExecucao,
                WorkStatus::Finalizado,
                &[Role::Gestor],
                pendente
            ),
            Err(AppError::ChecklistsIncomplete(1))
        ));

        // Zero checklists pendentes (inclusive zero checklists) finaliza.
        assert!(validate_transition(
            WorkStatus::EmExecucao,
            WorkStatus::Finalizado,
            &[Role::Gestor],
            ctx()
        )
        .is_ok());
    }

    #[test]
    fn finalizar_e_restrito_a_gestor_e_admin() {
        for role in [Role::Campo, Role::Engenheiro, Role::Projetista, Role::Cliente] {
            assert!(matches!(
                validate_transition(
                    WorkStatus::EmExecucao,
                    WorkStatus::Finalizado,
                    &[role],
                    ctx()
                ),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn cancelamento_somente_admin_e_nunca_apos_finalizado() {
        for from in WorkStatus::ALL {
            if from.is_terminal() {
                continue;
            }
            assert!(
                validate_transition(from, WorkStatus::Cancelado, &[Role::Admin], ctx()).is_ok()
            );
            assert!(matches!(
                validate_transition(from, WorkStatus::Cancelado, &[Role::Gestor], ctx()),
                Err(AppError::Forbidden)
            ));
        }
        // Obra finalizada não pode ser cancelada.
        assert!(matches!(
            validate_transition(WorkStatus::Finalizado, WorkStatus::Cancelado, &[Role::Admin], ctx()),
            Err(AppError::AlreadyTerminal("finalizado"))
        ));
    }

    #[test]
    fn terminais_sem_nenhuma_saida() {
        for from in [WorkStatus::Finalizado, WorkStatus::Cancelado] {
            for to in WorkStatus::ALL {
                assert!(matches!(
                    validate_transition(from, to, TODOS, ctx()),
                    Err(AppError::AlreadyTerminal(_))
                ));
            }
        }
    }

    #[test]
    fn arestas_fora_da_tabela_sao_ilegais() {
        for (from, to) in [
            (WorkStatus::Planejamento, WorkStatus::EmExecucao),
            (WorkStatus::Planejamento, WorkStatus::Finalizado),
            (WorkStatus::AguardandoInicio, WorkStatus::Finalizado),
            (WorkStatus::EmExecucao, WorkStatus::Planejamento),
        ] {
            assert!(matches!(
                validate_transition(from, to, TODOS, ctx()),
                Err(AppError::IllegalTransition { .. })
            ));
        }
    }

    #[test]
    fn toda_aresta_da_tabela_inclui_admin() {
        for t in WORK_TRANSITIONS {
            assert!(!t.roles.is_empty());
            assert!(t.roles.contains(&Role::Admin), "{:?} -> {:?}", t.from, t.to);
        }
    }
}
