// src/models/pipeline.rs
//
// Pipeline de Obras: Orçamento -> Planejamento -> Execução -> Encerramento
// -> Book Final. A visão é SEMPRE derivada do status persistido do
// orçamento/obra; nada aqui é armazenado ou contado de forma mutável.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::budget::BudgetStatus;
use crate::models::work::WorkStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Orcamento,
    Planejamento,
    Execucao,
    Encerramento,
    Book,
}

impl StageId {
    pub const ALL: [StageId; 5] = [
        StageId::Orcamento,
        StageId::Planejamento,
        StageId::Execucao,
        StageId::Encerramento,
        StageId::Book,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StageId::Orcamento => "Orçamento",
            StageId::Planejamento => "Planejamento",
            StageId::Execucao => "Execução",
            StageId::Encerramento => "Encerramento",
            StageId::Book => "Book Final",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StageId::Orcamento => "Elaboração e aprovação",
            StageId::Planejamento => "Cronograma e recursos",
            StageId::Execucao => "Acompanhamento diário",
            StageId::Encerramento => "Finalização e pendências",
            StageId::Book => "Documentação completa",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub id: StageId,
    #[schema(example = "Execução")]
    pub title: &'static str,
    #[schema(example = "Acompanhamento diário")]
    pub description: &'static str,
    pub status: StageStatus,
    // Marca a etapa em que o fluxo foi cancelado; as etapas seguintes
    // permanecem pendentes e as anteriores continuam concluídas.
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineView {
    pub stages: Vec<StageView>,
}

// Recorte mínimo da obra necessário para derivar o pipeline.
#[derive(Debug, Clone, Copy)]
pub struct WorkSnapshot {
    pub status: WorkStatus,
    // A obra chegou a ter data de início definida?
    pub started: bool,
    // Existe documento do "book final" registrado para a obra?
    pub book_ready: bool,
}

// Resultado interno da classificação: ou uma etapa ativa, ou nenhuma
// (pipeline não iniciado / totalmente concluído), ou um cancelamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Active(StageId),
    NoneActive { completed: usize },
    Cancelled { at: StageId },
}

fn classify(budget_status: BudgetStatus, work: Option<&WorkSnapshot>) -> Progress {
    // Orçamento não aprovado manda: a primeira etapa segue ativa (ou
    // cancelada) independente de qualquer campo da obra.
    if !budget_status.is_approved() {
        return match budget_status {
            BudgetStatus::Cancelado => Progress::Cancelled { at: StageId::Orcamento },
            // Inclusive reprovado/paralisado: ainda é fase de orçamento.
            _ => Progress::Active(StageId::Orcamento),
        };
    }

    if let Some(w) = work {
        // O cancelamento da própria obra prevalece na renderização.
        return match w.status {
            WorkStatus::Cancelado => {
                let at = if w.started { StageId::Execucao } else { StageId::Planejamento };
                Progress::Cancelled { at }
            }
            WorkStatus::Planejamento | WorkStatus::AguardandoInicio => {
                Progress::Active(StageId::Planejamento)
            }
            WorkStatus::EmExecucao | WorkStatus::Suspenso => Progress::Active(StageId::Execucao),
            WorkStatus::Finalizado if !w.book_ready => Progress::Active(StageId::Encerramento),
            WorkStatus::Finalizado => Progress::Active(StageId::Book),
        };
    }

    // Aprovado mas ainda sem obra: orçamento concluído, pipeline parado.
    Progress::NoneActive { completed: 1 }
}

// Etapa ativa, se houver (exatamente uma por vez).
pub fn active_stage(budget_status: BudgetStatus, work: Option<&WorkSnapshot>) -> Option<StageId> {
    match classify(budget_status, work) {
        Progress::Active(id) => Some(id),
        _ => None,
    }
}

// Função pura: deriva a visão das cinco etapas a partir do status
// persistido. Recalculada a cada evento, nunca armazenada.
pub fn derive_pipeline(budget_status: BudgetStatus, work: Option<&WorkSnapshot>) -> PipelineView {
    let progress = classify(budget_status, work);

    let stages = StageId::ALL
        .iter()
        .enumerate()
        .map(|(idx, &id)| {
            let (status, cancelled) = match progress {
                Progress::Active(active) => {
                    let active_idx = active as usize;
                    if idx < active_idx {
                        (StageStatus::Completed, false)
                    } else if idx == active_idx {
                        (StageStatus::Active, false)
                    } else {
                        (StageStatus::Pending, false)
                    }
                }
                Progress::NoneActive { completed } => {
                    if idx < completed {
                        (StageStatus::Completed, false)
                    } else {
                        (StageStatus::Pending, false)
                    }
                }
                Progress::Cancelled { at } => {
                    let at_idx = at as usize;
                    if idx < at_idx {
                        (StageStatus::Completed, false)
                    } else if idx == at_idx {
                        (StageStatus::Pending, true)
                    } else {
                        (StageStatus::Pending, false)
                    }
                }
            };
            StageView { id, title: id.title(), description: id.description(), status, cancelled }
        })
        .collect();

    PipelineView { stages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::budget::{self, BudgetTransitionCtx};
    use crate::models::rbac::Role;
    use crate::models::work::{self, WorkTransitionCtx};

    fn snapshot(status: WorkStatus) -> WorkSnapshot {
        WorkSnapshot { status, started: true, book_ready: false }
    }

    fn active_of(view: &PipelineView) -> Vec<StageId> {
        view.stages
            .iter()
            .filter(|s| s.status == StageStatus::Active)
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn orcamento_nao_aprovado_fica_na_primeira_etapa() {
        // Independente dos campos da obra.
        let snap = snapshot(WorkStatus::EmExecucao);
        for status in [
            BudgetStatus::Rascunho,
            BudgetStatus::EmElaboracao,
            BudgetStatus::AguardandoProjetista,
            BudgetStatus::AguardandoEngenheiro,
            BudgetStatus::AguardandoGestor,
            BudgetStatus::EnviadoCliente,
            BudgetStatus::Reprovado,
            BudgetStatus::Paralisado,
        ] {
            assert_eq!(active_stage(status, None), Some(StageId::Orcamento), "{:?}", status);
            assert_eq!(active_stage(status, Some(&snap)), Some(StageId::Orcamento), "{:?}", status);
        }
    }

    #[test]
    fn aprovado_sem_obra_nao_tem_etapa_ativa() {
        for status in [BudgetStatus::Aprovado, BudgetStatus::AprovadoRessalvas] {
            let view = derive_pipeline(status, None);
            assert!(active_of(&view).is_empty());
            assert_eq!(view.stages[0].status, StageStatus::Completed);
            assert!(view.stages[1..].iter().all(|s| s.status == StageStatus::Pending));
        }
    }

    #[test]
    fn etapas_da_obra() {
        let casos = [
            (WorkStatus::Planejamento, StageId::Planejamento),
            (WorkStatus::AguardandoInicio, StageId::Planejamento),
            (WorkStatus::EmExecucao, StageId::Execucao),
            (WorkStatus::Suspenso, StageId::Execucao),
            (WorkStatus::Finalizado, StageId::Encerramento),
        ];
        for (ws, esperado) in casos {
            let snap = snapshot(ws);
            assert_eq!(
                active_stage(BudgetStatus::Aprovado, Some(&snap)),
                Some(esperado),
                "{:?}",
                ws
            );
        }
    }

    #[test]
    fn book_ativo_quando_documentacao_completa() {
        let snap = WorkSnapshot { status: WorkStatus::Finalizado, started: true, book_ready: true };
        let view = derive_pipeline(BudgetStatus::Aprovado, Some(&snap));
        assert_eq!(active_of(&view), vec![StageId::Book]);
        // Todas as etapas anteriores concluídas.
        assert!(view.stages[..4].iter().all(|s| s.status == StageStatus::Completed));
    }

    #[test]
    fn exatamente_uma_etapa_ativa_e_ordem_estrita() {
        let snaps = [
            None,
            Some(snapshot(WorkStatus::Planejamento)),
            Some(snapshot(WorkStatus::EmExecucao)),
            Some(snapshot(WorkStatus::Finalizado)),
        ];
        for budget_status in BudgetStatus::ALL {
            for snap in &snaps {
                let view = derive_pipeline(budget_status, snap.as_ref());
                let ativas = active_of(&view);
                assert!(ativas.len() <= 1, "{:?}/{:?}: {:?}", budget_status, snap, ativas);

                // Concluídas formam um prefixo estrito antes da ativa.
                if let Some(active) = ativas.first() {
                    let active_idx = *active as usize;
                    for (idx, stage) in view.stages.iter().enumerate() {
                        if idx < active_idx {
                            assert_eq!(stage.status, StageStatus::Completed);
                        } else if idx > active_idx {
                            assert_eq!(stage.status, StageStatus::Pending);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn cancelamento_marca_a_etapa_corrente_e_preserva_concluidas() {
        // Orçamento cancelado antes de aprovar.
        let view = derive_pipeline(BudgetStatus::Cancelado, None);
        assert!(view.stages[0].cancelled);
        assert!(view.stages.iter().all(|s| s.status != StageStatus::Active));

        // Obra cancelada depois de iniciada: orçamento e planejamento
        // continuam concluídos, execução leva a marca.
        let snap = WorkSnapshot { status: WorkStatus::Cancelado, started: true, book_ready: false };
        let view = derive_pipeline(BudgetStatus::Aprovado, Some(&snap));
        assert_eq!(view.stages[0].status, StageStatus::Completed);
        assert_eq!(view.stages[1].status, StageStatus::Completed);
        assert!(view.stages[2].cancelled);
        assert_eq!(view.stages[2].status, StageStatus::Pending);

        // Obra cancelada sem nunca iniciar: a marca fica no planejamento.
        let snap = WorkSnapshot { status: WorkStatus::Cancelado, started: false, book_ready: false };
        let view = derive_pipeline(BudgetStatus::Aprovado, Some(&snap));
        assert!(view.stages[1].cancelled);
    }

    // Cenário fim-a-fim do spec: orçamento criado por projetista percorre o
    // fluxo até aprovado, a obra percorre o dela até finalizada com
    // checklists concluídos e o pipeline termina com o Book ativo.
    #[test]
    fn ciclo_completo_ate_o_book() {
        let fluxo_orcamento = [
            (BudgetStatus::Rascunho, BudgetStatus::EmElaboracao, Role::Projetista),
            (BudgetStatus::EmElaboracao, BudgetStatus::AguardandoProjetista, Role::Projetista),
            (
                BudgetStatus::AguardandoProjetista,
                BudgetStatus::AguardandoEngenheiro,
                Role::Engenheiro,
            ),
            (BudgetStatus::AguardandoEngenheiro, BudgetStatus::AguardandoGestor, Role::Gestor),
            (BudgetStatus::AguardandoGestor, BudgetStatus::EnviadoCliente, Role::Gestor),
            (BudgetStatus::EnviadoCliente, BudgetStatus::Aprovado, Role::Cliente),
        ];

        let mut budget_status = BudgetStatus::Rascunho;
        for (from, to, role) in fluxo_orcamento {
            assert_eq!(budget_status, from);
            budget::validate_transition(from, to, &[role], BudgetTransitionCtx::default())
                .expect("aresta do fluxo de aprovação");
            budget_status = to;
        }
        assert!(budget_status.is_approved());

        // Obra elegível: nasce em planejamento e percorre o fluxo dela.
        let fluxo_obra = [
            (WorkStatus::Planejamento, WorkStatus::AguardandoInicio, Role::Engenheiro),
            (WorkStatus::AguardandoInicio, WorkStatus::EmExecucao, Role::Campo),
            (WorkStatus::EmExecucao, WorkStatus::Finalizado, Role::Gestor),
        ];
        let mut work_status = WorkStatus::Planejamento;
        for (from, to, role) in fluxo_obra {
            assert_eq!(work_status, from);
            work::validate_transition(from, to, &[role], WorkTransitionCtx::default())
                .expect("aresta do fluxo da obra");
            work_status = to;
        }

        let snap = WorkSnapshot { status: work_status, started: true, book_ready: true };
        assert_eq!(active_stage(budget_status, Some(&snap)), Some(StageId::Book));
    }
}
