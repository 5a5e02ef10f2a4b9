// src/db/work_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::work::{
    Checklist, ChecklistItem, CreateWorkPayload, Document, Photo, UpdateWorkDatesPayload, Work,
    WorkStatus, BOOK_FINAL_TAG,
};

const WORK_COLUMNS: &str = "id, budget_id, name, work_code, os_number, art_number, \
     start_date, planned_end_date, actual_end_date, status, team_leader, \
     technical_responsible, created_at, updated_at";

const CHECKLIST_COLUMNS: &str =
    "id, work_id, title, type, completed, completed_by, completed_at, created_at";

#[derive(Clone)]
pub struct WorkRepository {
    pool: PgPool,
}

impl WorkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Obras ---

    pub async fn create_work<'e, E>(
        &self,
        executor: E,
        payload: &CreateWorkPayload,
    ) -> Result<Work, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Nasce em `planejamento` (default da coluna). O SELECT condiciona a
        // escrita ao orçamento ainda estar na família "aprovado" no mesmo
        // instante: zero linhas = pré-condição perdida numa corrida.
        let work = sqlx::query_as::<_, Work>(&format!(
            r#"
            INSERT INTO works
                (budget_id, name, work_code, os_number, art_number,
                 start_date, planned_end_date, team_leader, technical_responsible)
            SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
            WHERE EXISTS (
                SELECT 1 FROM budgets
                WHERE id = $1 AND status IN ('aprovado', 'aprovado_ressalvas')
            )
            RETURNING {WORK_COLUMNS}
            "#
        ))
        .bind(payload.budget_id)
        .bind(&payload.name)
        .bind(&payload.work_code)
        .bind(&payload.os_number)
        .bind(&payload.art_number)
        .bind(payload.start_date)
        .bind(payload.planned_end_date)
        .bind(payload.team_leader)
        .bind(payload.technical_responsible)
        .fetch_optional(executor)
        .await?;

        work.ok_or(AppError::BudgetNotApproved)
    }

    pub async fn get_work(&self, id: Uuid) -> Result<Option<Work>, AppError> {
        let work = sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(work)
    }

    pub async fn list_works(&self) -> Result<Vec<Work>, AppError> {
        let works = sqlx::query_as::<_, Work>(&format!(
            "SELECT {WORK_COLUMNS} FROM works ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(works)
    }

    // Compare-and-swap do status, mesmo contrato do orçamento.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected: WorkStatus,
        new_status: WorkStatus,
    ) -> Result<Work, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Work>(&format!(
            r#"
            UPDATE works
            SET status = $3,
                actual_end_date = CASE WHEN $3 = 'finalizado'::work_status
                                       THEN COALESCE(actual_end_date, CURRENT_DATE)
                                       ELSE actual_end_date END,
                updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {WORK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected)
        .bind(new_status)
        .fetch_optional(executor)
        .await?;

        updated.ok_or(AppError::Conflict)
    }

    pub async fn update_dates<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateWorkDatesPayload,
    ) -> Result<Work, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Work>(&format!(
            r#"
            UPDATE works
            SET start_date = COALESCE($2, start_date),
                planned_end_date = COALESCE($3, planned_end_date),
                actual_end_date = COALESCE($4, actual_end_date),
                updated_at = now()
            WHERE id = $1
            RETURNING {WORK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.start_date)
        .bind(payload.planned_end_date)
        .bind(payload.actual_end_date)
        .fetch_optional(executor)
        .await?;

        updated.ok_or(AppError::NotFound("Obra"))
    }

    // --- Checklists ---

    pub async fn create_checklist<'e, E>(
        &self,
        executor: E,
        work_id: Uuid,
        title: &str,
        kind: &str,
    ) -> Result<Checklist, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            r#"
            INSERT INTO checklists (work_id, title, type)
            VALUES ($1, $2, $3)
            RETURNING {CHECKLIST_COLUMNS}
            "#
        ))
        .bind(work_id)
        .bind(title)
        .bind(kind)
        .fetch_one(executor)
        .await?;

        Ok(checklist)
    }

    pub async fn add_checklist_item<'e, E>(
        &self,
        executor: E,
        checklist_id: Uuid,
        description: &str,
    ) -> Result<ChecklistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            INSERT INTO checklist_items (checklist_id, description)
            VALUES ($1, $2)
            RETURNING id, checklist_id, description, checked, notes, created_at
            "#,
        )
        .bind(checklist_id)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn get_checklist(&self, id: Uuid) -> Result<Option<Checklist>, AppError> {
        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(checklist)
    }

    pub async fn list_checklists(&self, work_id: Uuid) -> Result<Vec<Checklist>, AppError> {
        let checklists = sqlx::query_as::<_, Checklist>(&format!(
            "SELECT {CHECKLIST_COLUMNS} FROM checklists WHERE work_id = $1 ORDER BY created_at"
        ))
        .bind(work_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(checklists)
    }

    pub async fn list_checklist_items(
        &self,
        checklist_id: Uuid,
    ) -> Result<Vec<ChecklistItem>, AppError> {
        let items = sqlx::query_as::<_, ChecklistItem>(
            r#"
            SELECT id, checklist_id, description, checked, notes, created_at
            FROM checklist_items
            WHERE checklist_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(checklist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn update_checklist_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        checked: bool,
        notes: Option<&str>,
    ) -> Result<ChecklistItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ChecklistItem>(
            r#"
            UPDATE checklist_items
            SET checked = $2, notes = COALESCE($3, notes)
            WHERE id = $1
            RETURNING id, checklist_id, description, checked, notes, created_at
            "#,
        )
        .bind(item_id)
        .bind(checked)
        .bind(notes)
        .fetch_optional(executor)
        .await?;

        item.ok_or(AppError::NotFound("Item de checklist"))
    }

    pub async fn count_unchecked_items(&self, checklist_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM checklist_items WHERE checklist_id = $1 AND checked = false",
        )
        .bind(checklist_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn complete_checklist<'e, E>(
        &self,
        executor: E,
        checklist_id: Uuid,
        completed_by: Uuid,
    ) -> Result<Checklist, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let checklist = sqlx::query_as::<_, Checklist>(&format!(
            r#"
            UPDATE checklists
            SET completed = true, completed_by = $2, completed_at = now()
            WHERE id = $1
            RETURNING {CHECKLIST_COLUMNS}
            "#
        ))
        .bind(checklist_id)
        .bind(completed_by)
        .fetch_optional(executor)
        .await?;

        checklist.ok_or(AppError::NotFound("Checklist"))
    }

    // Checklists da obra ainda não concluídos: é isto que trava a
    // finalização.
    pub async fn count_pending_checklists(&self, work_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM checklists WHERE work_id = $1 AND completed = false",
        )
        .bind(work_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // --- Documentos ---

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        budget_id: Option<Uuid>,
        work_id: Option<Uuid>,
        filename: &str,
        file_type: &str,
        storage_path: &str,
        tags: Option<&[String]>,
        uploaded_by: Uuid,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (budget_id, work_id, filename, file_type, storage_path, tags, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, budget_id, work_id, filename, file_type, storage_path,
                      tags, version, uploaded_by, uploaded_at
            "#,
        )
        .bind(budget_id)
        .bind(work_id)
        .bind(filename)
        .bind(file_type)
        .bind(storage_path)
        .bind(tags)
        .bind(uploaded_by)
        .fetch_one(executor)
        .await?;

        Ok(document)
    }

    pub async fn list_documents(&self, work_id: Uuid) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, budget_id, work_id, filename, file_type, storage_path,
                   tags, version, uploaded_by, uploaded_at
            FROM documents
            WHERE work_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(work_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    // O "Book Final" existe quando há documento com a tag `book_final`.
    pub async fn has_final_book(&self, work_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM documents WHERE work_id = $1 AND $2 = ANY(tags))",
        )
        .bind(work_id)
        .bind(BOOK_FINAL_TAG)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    // --- Fotos ---

    pub async fn create_photo<'e, E>(
        &self,
        executor: E,
        work_id: Uuid,
        category: crate::models::work::PhotoCategory,
        storage_path: &str,
        caption: Option<&str>,
        uploaded_by: Uuid,
    ) -> Result<Photo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (work_id, category, storage_path, caption, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, work_id, category, storage_path, caption, uploaded_by, created_at
            "#,
        )
        .bind(work_id)
        .bind(category)
        .bind(storage_path)
        .bind(caption)
        .bind(uploaded_by)
        .fetch_one(executor)
        .await?;

        Ok(photo)
    }

    pub async fn list_photos(&self, work_id: Uuid) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, work_id, category, storage_path, caption, uploaded_by, created_at
            FROM photos
            WHERE work_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(work_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }
}
