// src/models/budget.rs
//
// Máquina de estados do Orçamento. As arestas legais vivem numa tabela
// explícita de (de, para, papéis exigidos) em vez de condicionais soltas,
// para que os testes possam varrer o espaço inteiro de combinações.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::rbac::{role_allowed, Role};

// --- Enums ---

// Status do orçamento (enum `budget_status` no banco).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "budget_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Rascunho,
    EmElaboracao,
    AguardandoProjetista,
    AguardandoEngenheiro,
    AguardandoGestor,
    EnviadoCliente,
    Aprovado,
    AprovadoRessalvas,
    Reprovado,
    Cancelado,
    Paralisado,
}

impl BudgetStatus {
    pub const ALL: [BudgetStatus; 11] = [
        BudgetStatus::Rascunho,
        BudgetStatus::EmElaboracao,
        BudgetStatus::AguardandoProjetista,
        BudgetStatus::AguardandoEngenheiro,
        BudgetStatus::AguardandoGestor,
        BudgetStatus::EnviadoCliente,
        BudgetStatus::Aprovado,
        BudgetStatus::AprovadoRessalvas,
        BudgetStatus::Reprovado,
        BudgetStatus::Cancelado,
        BudgetStatus::Paralisado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Rascunho => "rascunho",
            BudgetStatus::EmElaboracao => "em_elaboracao",
            BudgetStatus::AguardandoProjetista => "aguardando_projetista",
            BudgetStatus::AguardandoEngenheiro => "aguardando_engenheiro",
            BudgetStatus::AguardandoGestor => "aguardando_gestor",
            BudgetStatus::EnviadoCliente => "enviado_cliente",
            BudgetStatus::Aprovado => "aprovado",
            BudgetStatus::AprovadoRessalvas => "aprovado_ressalvas",
            BudgetStatus::Reprovado => "reprovado",
            BudgetStatus::Cancelado => "cancelado",
            BudgetStatus::Paralisado => "paralisado",
        }
    }

    // Terminais: sem saída, exceto as reversões/cancelamentos modelados
    // explicitamente na tabela abaixo.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BudgetStatus::Aprovado
                | BudgetStatus::AprovadoRessalvas
                | BudgetStatus::Reprovado
                | BudgetStatus::Cancelado
        )
    }

    // Família "aprovado": a única que habilita a criação de uma Obra.
    pub fn is_approved(&self) -> bool {
        matches!(self, BudgetStatus::Aprovado | BudgetStatus::AprovadoRessalvas)
    }
}

// --- Tabela de transições ---

// Condição adicional de uma aresta, avaliada sobre o contexto do registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetGuard {
    // Cancelar um orçamento aprovado exige que a obra dele (se houver)
    // já esteja finalizada ou cancelada.
    NoActiveWork,
}

pub struct BudgetTransition {
    pub from: BudgetStatus,
    pub to: BudgetStatus,
    pub roles: &'static [Role],
    pub guard: Option<BudgetGuard>,
}

const fn edge(
    from: BudgetStatus,
    to: BudgetStatus,
    roles: &'static [Role],
) -> BudgetTransition {
    BudgetTransition { from, to, roles, guard: None }
}

// O caminho de aprovação, mais as reversões explícitas.
pub const BUDGET_TRANSITIONS: &[BudgetTransition] = &[
    edge(
        BudgetStatus::Rascunho,
        BudgetStatus::EmElaboracao,
        &[Role::Projetista, Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::EmElaboracao,
        BudgetStatus::AguardandoProjetista,
        &[Role::Projetista, Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::AguardandoProjetista,
        BudgetStatus::AguardandoEngenheiro,
        &[Role::Engenheiro, Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::AguardandoEngenheiro,
        BudgetStatus::AguardandoGestor,
        &[Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::AguardandoGestor,
        BudgetStatus::EnviadoCliente,
        &[Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::EnviadoCliente,
        BudgetStatus::Aprovado,
        &[Role::Cliente, Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::EnviadoCliente,
        BudgetStatus::AprovadoRessalvas,
        &[Role::Cliente, Role::Gestor, Role::Admin],
    ),
    edge(
        BudgetStatus::EnviadoCliente,
        BudgetStatus::Reprovado,
        &[Role::Cliente, Role::Gestor, Role::Admin],
    ),
    // Retrabalho após reprovação do cliente: volta ao rascunho.
    edge(
        BudgetStatus::Reprovado,
        BudgetStatus::Rascunho,
        &[Role::Gestor, Role::Admin],
    ),
    // Retomada de um orçamento paralisado.
    edge(
        BudgetStatus::Paralisado,
        BudgetStatus::EmElaboracao,
        &[Role::Gestor, Role::Admin],
    ),
    // Cancelamento de orçamento já aprovado: só sem obra ativa pendente.
    BudgetTransition {
        from: BudgetStatus::Aprovado,
        to: BudgetStatus::Cancelado,
        roles: &[Role::Admin],
        guard: Some(BudgetGuard::NoActiveWork),
    },
    BudgetTransition {
        from: BudgetStatus::AprovadoRessalvas,
        to: BudgetStatus::Cancelado,
        roles: &[Role::Admin],
        guard: Some(BudgetGuard::NoActiveWork),
    },
];

// Regras curinga: valem a partir de QUALQUER estado não-terminal.
pub const PAUSE_ROLES: &[Role] = &[Role::Gestor, Role::Admin];
pub const CANCEL_ROLES: &[Role] = &[Role::Admin];

// Contexto do registro no momento da transição. Vem do chamador, nunca de
// estado ambiente, para manter a validação pura e testável.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetTransitionCtx {
    pub has_active_work: bool,
}

// Valida a aresta `from -> to` para um ator com o conjunto de papéis dado.
// Não toca em banco nenhum; o efeito (CAS do status) fica no repositório.
pub fn validate_transition(
    from: BudgetStatus,
    to: BudgetStatus,
    actor_roles: &[Role],
    ctx: BudgetTransitionCtx,
) -> Result<(), AppError> {
    if let Some(t) = BUDGET_TRANSITIONS.iter().find(|t| t.from == from && t.to == to) {
        if !role_allowed(actor_roles, t.roles) {
            return Err(AppError::Forbidden);
        }
        if let Some(BudgetGuard::NoActiveWork) = t.guard {
            if ctx.has_active_work {
                // A obra precisa ser encerrada ou cancelada primeiro.
                return Err(AppError::Forbidden);
            }
        }
        return Ok(());
    }

    // Curingas: paralisar ou cancelar qualquer orçamento não-terminal.
    if !from.is_terminal() {
        if to == BudgetStatus::Paralisado && from != BudgetStatus::Paralisado {
            return if role_allowed(actor_roles, PAUSE_ROLES) {
                Ok(())
            } else {
                Err(AppError::Forbidden)
            };
        }
        if to == BudgetStatus::Cancelado {
            return if role_allowed(actor_roles, CANCEL_ROLES) {
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

// O que sai do banco (Tabela budgets)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Condomínio Jardim das Acácias")]
    pub client_name: String,

    #[schema(example = "(11) 98888-7777")]
    pub client_contact: Option<String>,

    #[schema(example = "Av. Paulista, 1000 - São Paulo/SP")]
    pub local: String,

    #[schema(example = "Retrofit da subestação e novo QGBT")]
    pub description: String,

    pub initial_survey: Option<String>,

    pub status: BudgetStatus,

    // Responsável técnico (portador de papel), quando já definido.
    pub technical_responsible: Option<Uuid>,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O Payload para criar um orçamento (nasce como `rascunho`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Condomínio Jardim das Acácias")]
    pub client_name: String,

    pub client_contact: Option<String>,

    #[validate(length(min = 1, message = "O local da obra é obrigatório."))]
    #[schema(example = "Av. Paulista, 1000 - São Paulo/SP")]
    pub local: String,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub description: String,

    pub initial_survey: Option<String>,

    pub technical_responsible: Option<Uuid>,
}

// O Payload de transição: apenas o status de destino. Os papéis do ator
// vêm do vínculo autenticado, nunca do corpo da requisição.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBudgetPayload {
    #[schema(example = "em_elaboracao")]
    pub status: BudgetStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODOS: &[Role] = &Role::ALL;

    fn ctx() -> BudgetTransitionCtx {
        BudgetTransitionCtx::default()
    }

    #[test]
    fn familia_aprovado_e_exatamente_aprovado_e_ressalvas() {
        for status in BudgetStatus::ALL {
            assert_eq!(
                status.is_approved(),
                matches!(status, BudgetStatus::Aprovado | BudgetStatus::AprovadoRessalvas),
                "{:?}",
                status
            );
        }
    }

    #[test]
    fn caminho_feliz_de_aprovacao() {
        let passos = [
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
        for (from, to, role) in passos {
            validate_transition(from, to, &[role], ctx())
                .unwrap_or_else(|e| panic!("{:?} -> {:?} com {:?}: {e}", from, to, role));
        }
    }

    #[test]
    fn decisoes_do_cliente_no_enviado() {
        for to in [
            BudgetStatus::Aprovado,
            BudgetStatus::AprovadoRessalvas,
            BudgetStatus::Reprovado,
        ] {
            assert!(validate_transition(
                BudgetStatus::EnviadoCliente,
                to,
                &[Role::Cliente],
                ctx()
            )
            .is_ok());
        }
    }

    #[test]
    fn papel_errado_e_proibido_sem_mudar_nada() {
        // Campo não participa do fluxo de orçamento.
        let err = validate_transition(
            BudgetStatus::Rascunho,
            BudgetStatus::EmElaboracao,
            &[Role::Campo],
            ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        // Cliente não pode avançar etapas internas.
        let err = validate_transition(
            BudgetStatus::AguardandoEngenheiro,
            BudgetStatus::AguardandoGestor,
            &[Role::Cliente],
            ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn conjunto_vazio_de_papeis_nega_todas_as_arestas() {
        for from in BudgetStatus::ALL {
            for to in BudgetStatus::ALL {
                assert!(
                    validate_transition(from, to, &[], ctx()).is_err(),
                    "{:?} -> {:?} deveria ser negado sem papéis",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn arestas_fora_da_tabela_sao_ilegais() {
        // Pular etapas não é permitido nem para admin.
        let err = validate_transition(
            BudgetStatus::Rascunho,
            BudgetStatus::EnviadoCliente,
            &[Role::Admin],
            ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));

        // Auto-transição também não existe.
        let err = validate_transition(
            BudgetStatus::EmElaboracao,
            BudgetStatus::EmElaboracao,
            &[Role::Admin],
            ctx(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));
    }

    #[test]
    fn qualquer_nao_terminal_pode_ser_paralisado_por_gestor() {
        for from in BudgetStatus::ALL {
            if from.is_terminal() || from == BudgetStatus::Paralisado {
                continue;
            }
            assert!(
                validate_transition(from, BudgetStatus::Paralisado, &[Role::Gestor], ctx())
                    .is_ok(),
                "{:?} -> paralisado deveria ser permitido ao gestor",
                from
            );
            // Projetista não pode paralisar.
            assert!(matches!(
                validate_transition(from, BudgetStatus::Paralisado, &[Role::Projetista], ctx()),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn qualquer_nao_terminal_pode_ser_cancelado_somente_por_admin() {
        for from in BudgetStatus::ALL {
            if from.is_terminal() {
                continue;
            }
            assert!(
                validate_transition(from, BudgetStatus::Cancelado, &[Role::Admin], ctx()).is_ok()
            );
            assert!(matches!(
                validate_transition(from, BudgetStatus::Cancelado, &[Role::Gestor], ctx()),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn terminais_nao_tem_saida_alem_das_modeladas() {
        let explicitas = [
            (BudgetStatus::Reprovado, BudgetStatus::Rascunho),
            (BudgetStatus::Aprovado, BudgetStatus::Cancelado),
            (BudgetStatus::AprovadoRessalvas, BudgetStatus::Cancelado),
        ];
        for from in BudgetStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in BudgetStatus::ALL {
                if explicitas.contains(&(from, to)) {
                    continue;
                }
                let err = validate_transition(from, to, TODOS, ctx()).unwrap_err();
                assert!(
                    matches!(err, AppError::AlreadyTerminal(_)),
                    "{:?} -> {:?} deveria ser AlreadyTerminal, veio {:?}",
                    from,
                    to,
                    err
                );
            }
        }
    }

    #[test]
    fn cancelar_aprovado_com_obra_ativa_e_proibido() {
        let ctx_com_obra = BudgetTransitionCtx { has_active_work: true };
        for from in [BudgetStatus::Aprovado, BudgetStatus::AprovadoRessalvas] {
            assert!(matches!(
                validate_transition(from, BudgetStatus::Cancelado, &[Role::Admin], ctx_com_obra),
                Err(AppError::Forbidden)
            ));
            // Sem obra ativa, o admin pode cancelar.
            assert!(
                validate_transition(from, BudgetStatus::Cancelado, &[Role::Admin], ctx()).is_ok()
            );
        }
    }

    #[test]
    fn toda_aresta_da_tabela_exige_pelo_menos_um_papel() {
        for t in BUDGET_TRANSITIONS {
            assert!(!t.roles.is_empty(), "{:?} -> {:?} sem papéis", t.from, t.to);
            // Admin sempre consta entre os autorizados.
            assert!(t.roles.contains(&Role::Admin));
        }
    }
}
