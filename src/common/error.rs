// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Todas as falhas do ciclo de vida são variantes tipadas: nada aqui é fatal,
// o handler decide entre renderizar ou pedir retry (somente `Conflict`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // Papel do ator não autoriza a operação. Conjunto vazio de papéis nega tudo.
    #[error("Papel do usuário não permite esta operação")]
    Forbidden,

    // A aresta (de -> para) não existe na tabela de transições.
    #[error("Transição ilegal: {from} -> {to}")]
    IllegalTransition { from: &'static str, to: &'static str },

    // O registro já está num estado terminal e a aresta pedida não é
    // nenhuma das reversões/cancelamentos modelados explicitamente.
    #[error("Registro em estado terminal: {0}")]
    AlreadyTerminal(&'static str),

    #[error("Orçamento ainda não aprovado")]
    BudgetNotApproved,

    #[error("{0} checklist(s) pendente(s) impedem a finalização")]
    ChecklistsIncomplete(usize),

    #[error("Data de início da obra não definida")]
    StartDateMissing,

    // Corrida de escrita concorrente: o status mudou entre a leitura e o
    // compare-and-swap. Seguro tentar de novo com estado atualizado.
    #[error("Conflito de atualização concorrente")]
    Conflict,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    // Só o conflito de CAS vale um retry; o resto é determinístico.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::NotFound(entity) => {
                (StatusCode::NOT_FOUND, format!("{} não encontrado.", entity))
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Seu papel não permite executar esta operação.".to_string(),
            ),
            AppError::IllegalTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Transição de status ilegal: {} -> {}.", from, to),
            ),
            AppError::AlreadyTerminal(state) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Registro já está no estado terminal '{}'.", state),
            ),
            AppError::BudgetNotApproved => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "O orçamento precisa estar aprovado (ou aprovado com ressalvas).".to_string(),
            ),
            AppError::ChecklistsIncomplete(pending) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{} checklist(s) ainda não concluído(s).", pending),
            ),
            AppError::StartDateMissing => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Defina a data de início antes de colocar a obra em execução.".to_string(),
            ),
            AppError::Conflict => (
                StatusCode::CONFLICT,
                "O registro foi alterado por outra operação. Recarregue e tente novamente."
                    .to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apenas_conflito_permite_retry() {
        assert!(AppError::Conflict.is_retryable());
        assert!(!AppError::Forbidden.is_retryable());
        assert!(!AppError::BudgetNotApproved.is_retryable());
        assert!(!AppError::ChecklistsIncomplete(1).is_retryable());
        assert!(!AppError::AlreadyTerminal("cancelado").is_retryable());
        assert!(
            !AppError::IllegalTransition { from: "rascunho", to: "aprovado" }.is_retryable()
        );
        assert!(!AppError::NotFound("Orçamento").is_retryable());
    }
}
