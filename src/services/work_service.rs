// src/services/work_service.rs

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{BudgetRepository, WorkRepository};
use crate::models::pipeline::{self, PipelineView, WorkSnapshot};
use crate::models::rbac::Role;
use crate::models::work::{
    self, Checklist, ChecklistItem, ChecklistResponse, CreateChecklistPayload,
    CreateDocumentPayload, CreatePhotoPayload, CreateWorkPayload, Document, Photo,
    UpdateChecklistItemPayload, UpdateWorkDatesPayload, Work, WorkStatus, WorkTransitionCtx,
};

const MAX_TRANSITION_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct WorkService {
    repo: WorkRepository,
    budget_repo: BudgetRepository,
    pool: PgPool,
}

impl WorkService {
    pub fn new(repo: WorkRepository, budget_repo: BudgetRepository, pool: PgPool) -> Self {
        Self { repo, budget_repo, pool }
    }

    // --- Obras ---

    // Pré-condição de existência: o orçamento dono precisa estar na
    // família "aprovado". A obra nasce em `planejamento`. O INSERT reaplica
    // a condição de forma atômica, cobrindo a corrida com um cancelamento
    // concorrente do orçamento.
    pub async fn create_work(&self, payload: &CreateWorkPayload) -> Result<Work, AppError> {
        let budget = self
            .budget_repo
            .get_budget(payload.budget_id)
            .await?
            .ok_or(AppError::NotFound("Orçamento"))?;

        work::ensure_budget_approved(budget.status)?;

        let work = self.repo.create_work(&self.pool, payload).await?;
        tracing::info!("Obra {} criada a partir do orçamento {}", work.id, budget.id);
        Ok(work)
    }

    pub async fn get_work(&self, id: Uuid) -> Result<Work, AppError> {
        self.repo.get_work(id).await?.ok_or(AppError::NotFound("Obra"))
    }

    pub async fn list_works(&self) -> Result<Vec<Work>, AppError> {
        self.repo.list_works().await
    }

    pub async fn update_dates(
        &self,
        id: Uuid,
        payload: &UpdateWorkDatesPayload,
    ) -> Result<Work, AppError> {
        self.repo.update_dates(&self.pool, id, payload).await
    }

    // Mesmo protocolo do orçamento: validação pura + compare-and-swap,
    // com releitura em caso de corrida.
    pub async fn transition(
        &self,
        id: Uuid,
        to: WorkStatus,
        actor_roles: &[Role],
    ) -> Result<Work, AppError> {
        let mut attempt = 0;
        loop {
            let current = self.get_work(id).await?;

            let pending_checklists = if to == WorkStatus::Finalizado {
                self.repo.count_pending_checklists(id).await? as usize
            } else {
                0
            };
            let ctx = WorkTransitionCtx {
                start_date_set: current.start_date.is_some(),
                pending_checklists,
            };

            work::validate_transition(current.status, to, actor_roles, ctx)?;

            match self.repo.update_status(&self.pool, id, current.status, to).await {
                Ok(updated) => {
                    tracing::info!(
                        "Obra {}: {} -> {}",
                        id,
                        current.status.as_str(),
                        to.as_str()
                    );
                    return Ok(updated);
                }
                Err(err) if err.is_retryable() && attempt + 1 < MAX_TRANSITION_ATTEMPTS => {
                    attempt += 1;
                    tracing::warn!("Conflito de status na obra {} (tentativa {})", id, attempt);
                    tokio::time::sleep(Duration::from_millis(25 * u64::from(attempt))).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // --- Pipeline ---

    // Visão derivada, nunca armazenada: recomputada a cada consulta a
    // partir do status persistido do orçamento e da obra.
    pub async fn pipeline(&self, work_id: Uuid) -> Result<PipelineView, AppError> {
        let work = self.get_work(work_id).await?;
        let budget = self
            .budget_repo
            .get_budget(work.budget_id)
            .await?
            .ok_or(AppError::NotFound("Orçamento"))?;

        let snapshot = WorkSnapshot {
            status: work.status,
            started: work.start_date.is_some(),
            book_ready: self.repo.has_final_book(work_id).await?,
        };

        Ok(pipeline::derive_pipeline(budget.status, Some(&snapshot)))
    }

    // --- Checklists ---

    pub async fn create_checklist(
        &self,
        work_id: Uuid,
        payload: &CreateChecklistPayload,
    ) -> Result<ChecklistResponse, AppError> {
        // Garante que a obra existe antes de abrir a transação.
        self.get_work(work_id).await?;

        let mut tx = self.pool.begin().await?;

        let checklist = self
            .repo
            .create_checklist(&mut *tx, work_id, &payload.title, &payload.kind)
            .await?;

        let mut items = Vec::with_capacity(payload.items.len());
        for description in &payload.items {
            items.push(self.repo.add_checklist_item(&mut *tx, checklist.id, description).await?);
        }

        tx.commit().await?;

        Ok(ChecklistResponse { checklist, items })
    }

    pub async fn list_checklists(&self, work_id: Uuid) -> Result<Vec<ChecklistResponse>, AppError> {
        self.get_work(work_id).await?;

        let checklists = self.repo.list_checklists(work_id).await?;
        let mut out = Vec::with_capacity(checklists.len());
        for checklist in checklists {
            let items = self.repo.list_checklist_items(checklist.id).await?;
            out.push(ChecklistResponse { checklist, items });
        }
        Ok(out)
    }

    pub async fn update_checklist_item(
        &self,
        item_id: Uuid,
        payload: &UpdateChecklistItemPayload,
    ) -> Result<ChecklistItem, AppError> {
        self.repo
            .update_checklist_item(&self.pool, item_id, payload.checked, payload.notes.as_deref())
            .await
    }

    // Concluir um checklist exige todos os itens marcados.
    pub async fn complete_checklist(
        &self,
        checklist_id: Uuid,
        completed_by: Uuid,
    ) -> Result<Checklist, AppError> {
        self.repo
            .get_checklist(checklist_id)
            .await?
            .ok_or(AppError::NotFound("Checklist"))?;

        let unchecked = self.repo.count_unchecked_items(checklist_id).await?;
        if unchecked > 0 {
            return Err(AppError::ChecklistsIncomplete(unchecked as usize));
        }

        self.repo.complete_checklist(&self.pool, checklist_id, completed_by).await
    }

    // --- Documentos e fotos (somente metadados) ---

    pub async fn add_document(
        &self,
        work_id: Uuid,
        payload: &CreateDocumentPayload,
        uploaded_by: Uuid,
    ) -> Result<Document, AppError> {
        let work = self.get_work(work_id).await?;

        self.repo
            .create_document(
                &self.pool,
                Some(work.budget_id),
                Some(work_id),
                &payload.filename,
                &payload.file_type,
                &payload.storage_path,
                payload.tags.as_deref(),
                uploaded_by,
            )
            .await
    }

    pub async fn list_documents(&self, work_id: Uuid) -> Result<Vec<Document>, AppError> {
        self.get_work(work_id).await?;
        self.repo.list_documents(work_id).await
    }

    pub async fn add_photo(
        &self,
        work_id: Uuid,
        payload: &CreatePhotoPayload,
        uploaded_by: Uuid,
    ) -> Result<Photo, AppError> {
        self.get_work(work_id).await?;

        self.repo
            .create_photo(
                &self.pool,
                work_id,
                payload.category,
                &payload.storage_path,
                payload.caption.as_deref(),
                uploaded_by,
            )
            .await
    }

    pub async fn list_photos(&self, work_id: Uuid) -> Result<Vec<Photo>, AppError> {
        self.get_work(work_id).await?;
        self.repo.list_photos(work_id).await
    }
}
