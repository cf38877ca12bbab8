// src/db/case_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CaseRepository,
    models::case::{
        AppendOnly, Case, CaseFile, CaseStatus, CaseUpdate, FileMeta, IncidentLocation, NewCase,
    },
};

// Linha da tabela `cases`; os logs vêm de `case_updates` e `case_files`
#[derive(Debug, FromRow)]
struct CaseRow {
    id: Uuid,
    title: String,
    description: String,
    status: CaseStatus,
    created_at: DateTime<Utc>,
    assigned_to: Option<Uuid>,
    franchise_id: Uuid,
    floor_plan_id: Option<Uuid>,
    incident_x: Option<f64>,
    incident_y: Option<f64>,
}

impl CaseRow {
    fn into_case(self, updates: Vec<CaseUpdate>, files: Vec<CaseFile>) -> Case {
        // As CHECK constraints da tabela garantem o intervalo e o par (x, y)
        let incident_location = match (self.incident_x, self.incident_y) {
            (Some(x), Some(y)) => Some(IncidentLocation { x, y }),
            _ => None,
        };

        Case {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            created_at: self.created_at,
            assigned_to: self.assigned_to,
            updates: AppendOnly::from_vec(updates),
            files: AppendOnly::from_vec(files),
            franchise_id: self.franchise_id,
            floor_plan_id: self.floor_plan_id,
            incident_location,
        }
    }
}

#[derive(Debug, FromRow)]
struct UpdateRow {
    case_id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<UpdateRow> for CaseUpdate {
    fn from(row: UpdateRow) -> Self {
        CaseUpdate {
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FileRow {
    case_id: Uuid,
    name: String,
    content_type: String,
    uploaded_at: DateTime<Utc>,
    uploaded_by: Uuid,
}

impl From<FileRow> for CaseFile {
    fn from(row: FileRow) -> Self {
        CaseFile {
            name: row.name,
            content_type: row.content_type,
            uploaded_at: row.uploaded_at,
            uploaded_by: row.uploaded_by,
        }
    }
}

#[derive(Clone)]
pub struct PgCaseRepository {
    pool: PgPool,
}

impl PgCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Junta os logs de vários casos com duas queries (e não 2 por caso)
async fn hydrate(conn: &mut PgConnection, rows: Vec<CaseRow>) -> Result<Vec<Case>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let updates = sqlx::query_as::<_, UpdateRow>(
        r#"
        SELECT case_id, user_id, content, created_at
        FROM case_updates
        WHERE case_id = ANY($1)
        ORDER BY seq ASC
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;

    let files = sqlx::query_as::<_, FileRow>(
        r#"
        SELECT case_id, name, content_type, uploaded_at, uploaded_by
        FROM case_files
        WHERE case_id = ANY($1)
        ORDER BY seq ASC
        "#,
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;

    let mut updates_by_case: HashMap<Uuid, Vec<CaseUpdate>> = HashMap::new();
    for row in updates {
        updates_by_case.entry(row.case_id).or_default().push(row.into());
    }
    let mut files_by_case: HashMap<Uuid, Vec<CaseFile>> = HashMap::new();
    for row in files {
        files_by_case.entry(row.case_id).or_default().push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let updates = updates_by_case.remove(&row.id).unwrap_or_default();
            let files = files_by_case.remove(&row.id).unwrap_or_default();
            row.into_case(updates, files)
        })
        .collect())
}

async fn load_case(conn: &mut PgConnection, id: Uuid) -> Result<Option<Case>, AppError> {
    let row = sqlx::query_as::<_, CaseRow>(
        r#"
        SELECT id, title, description, status, created_at, assigned_to,
               franchise_id, floor_plan_id, incident_x, incident_y
        FROM cases
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

// Trava a linha do caso até o fim da transação; serializa escritores concorrentes
async fn lock_case(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
    sqlx::query_scalar::<_, Uuid>("SELECT id FROM cases WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .map(|_| ())
        .ok_or(AppError::CaseNotFound(id))
}

// UPDATE condicional não pegou nenhuma linha: o caso sumiu ou mudou no meio do caminho
async fn missing_or_conflict(conn: &mut PgConnection, id: Uuid, what: &str) -> AppError {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM cases WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await;

    match exists {
        Ok(true) => AppError::Conflict(format!("case {id} {what}")),
        Ok(false) => AppError::CaseNotFound(id),
        Err(e) => e.into(),
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    async fn create_case(&self, new: NewCase) -> Result<Case, AppError> {
        let row = sqlx::query_as::<_, CaseRow>(
            r#"
            INSERT INTO cases (id, title, description, franchise_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, created_at, assigned_to,
                      franchise_id, floor_plan_id, incident_x, incident_y
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.title.trim())
        .bind(new.description.trim())
        .bind(new.franchise_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!("franchise {}", new.franchise_id));
                }
            }
            e.into()
        })?;

        Ok(row.into_case(Vec::new(), Vec::new()))
    }

    async fn find_case(&self, id: Uuid) -> Result<Option<Case>, AppError> {
        let mut conn = self.pool.acquire().await?;
        load_case(&mut conn, id).await
    }

    async fn list_cases(
        &self,
        franchise_id: Option<Uuid>,
        status: Option<CaseStatus>,
    ) -> Result<Vec<Case>, AppError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, CaseRow>(
            r#"
            SELECT id, title, description, status, created_at, assigned_to,
                   franchise_id, floor_plan_id, incident_x, incident_y
            FROM cases
            WHERE ($1::uuid IS NULL OR franchise_id = $1)
              AND ($2::case_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(franchise_id)
        .bind(status)
        .fetch_all(&mut *conn)
        .await?;

        hydrate(&mut conn, rows).await
    }

    async fn append_update(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CaseUpdate, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_case(&mut tx, case_id).await?;

        // O timestamp nunca fica atrás da última entrada do mesmo caso
        let row = sqlx::query_as::<_, UpdateRow>(
            r#"
            INSERT INTO case_updates (case_id, user_id, content, created_at)
            VALUES (
                $1, $2, $3,
                GREATEST(
                    clock_timestamp(),
                    COALESCE(
                        (SELECT MAX(created_at) FROM case_updates WHERE case_id = $1),
                        '-infinity'::timestamptz
                    )
                )
            )
            RETURNING case_id, user_id, content, created_at
            "#,
        )
        .bind(case_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn append_file(
        &self,
        case_id: Uuid,
        file: FileMeta,
        uploaded_by: Uuid,
    ) -> Result<CaseFile, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_case(&mut tx, case_id).await?;

        let row = sqlx::query_as::<_, FileRow>(
            r#"
            INSERT INTO case_files (case_id, name, content_type, uploaded_by, uploaded_at)
            VALUES (
                $1, $2, $3, $4,
                GREATEST(
                    clock_timestamp(),
                    COALESCE(
                        (SELECT MAX(uploaded_at) FROM case_files WHERE case_id = $1),
                        '-infinity'::timestamptz
                    )
                )
            )
            RETURNING case_id, name, content_type, uploaded_at, uploaded_by
            "#,
        )
        .bind(case_id)
        .bind(&file.name)
        .bind(&file.content_type)
        .bind(uploaded_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_status(
        &self,
        case_id: Uuid,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<Case, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE cases SET status = $3 WHERE id = $1 AND status = $2")
            .bind(case_id)
            .bind(from)
            .bind(to)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(missing_or_conflict(&mut tx, case_id, "status").await);
        }

        let case = load_case(&mut tx, case_id)
            .await?
            .ok_or(AppError::CaseNotFound(case_id))?;
        tx.commit().await?;
        Ok(case)
    }

    async fn set_assignee(&self, case_id: Uuid, user_id: Option<Uuid>) -> Result<Case, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE cases SET assigned_to = $2 WHERE id = $1")
            .bind(case_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::UserNotFound;
                    }
                }
                AppError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::CaseNotFound(case_id));
        }

        let case = load_case(&mut tx, case_id)
            .await?
            .ok_or(AppError::CaseNotFound(case_id))?;
        tx.commit().await?;
        Ok(case)
    }

    async fn set_placement(
        &self,
        case_id: Uuid,
        expected_floor_plan: Option<Uuid>,
        floor_plan_id: Option<Uuid>,
        location: Option<IncidentLocation>,
    ) -> Result<Case, AppError> {
        if location.is_some() && floor_plan_id.is_none() {
            return Err(AppError::MissingFloorPlan);
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE cases
            SET floor_plan_id = $3, incident_x = $4, incident_y = $5
            WHERE id = $1 AND floor_plan_id IS NOT DISTINCT FROM $2::uuid
            "#,
        )
        .bind(case_id)
        .bind(expected_floor_plan)
        .bind(floor_plan_id)
        .bind(location.map(|l| l.x))
        .bind(location.map(|l| l.y))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::MissingFloorPlan;
                }
            }
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(missing_or_conflict(&mut tx, case_id, "floor plan").await);
        }

        let case = load_case(&mut tx, case_id)
            .await?
            .ok_or(AppError::CaseNotFound(case_id))?;
        tx.commit().await?;
        Ok(case)
    }
}
