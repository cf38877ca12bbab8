// src/services/case_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CaseRepository, UserRepository},
    models::{
        auth::User,
        case::{Case, CaseFile, CaseFilter, CaseStatus, CaseUpdate, FileMeta, NewCase, NewUpdate, Transition},
        session::Session,
    },
    services::scope,
};

/// Ciclo de vida dos casos. Toda operação passa pela guarda de escopo antes
/// de tocar o repositório.
#[derive(Clone)]
pub struct CaseService {
    case_repo: Arc<dyn CaseRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl CaseService {
    pub fn new(case_repo: Arc<dyn CaseRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            case_repo,
            user_repo,
        }
    }

    // Carrega o caso e aplica a guarda contra a franquia DELE
    async fn load_authorized<'s>(
        &self,
        session: &'s Session,
        case_id: Uuid,
    ) -> Result<(Case, &'s User), AppError> {
        if !session.is_authenticated() {
            return Err(AppError::InvalidToken);
        }
        let case = self
            .case_repo
            .find_case(case_id)
            .await?
            .ok_or(AppError::CaseNotFound(case_id))?;
        let user = scope::authorize(session, case.franchise_id)?;
        Ok((case, user))
    }

    pub async fn create_case(&self, session: &Session, new: NewCase) -> Result<Case, AppError> {
        if !session.is_authenticated() {
            return Err(AppError::InvalidToken);
        }
        new.validate()?;
        let user = scope::authorize(session, new.franchise_id)?;

        let case = self.case_repo.create_case(new).await?;
        tracing::info!(
            case_id = %case.id,
            franchise_id = %case.franchise_id,
            user_id = %user.id,
            "Caso aberto"
        );
        Ok(case)
    }

    pub async fn get_case(&self, session: &Session, case_id: Uuid) -> Result<Case, AppError> {
        let (case, _) = self.load_authorized(session, case_id).await?;
        Ok(case)
    }

    pub async fn list_cases(&self, session: &Session, filter: CaseFilter) -> Result<Vec<Case>, AppError> {
        let franchise_id = scope::listing_scope(session, filter.franchise_id)?;
        self.case_repo.list_cases(franchise_id, filter.status).await
    }

    pub async fn append_update(
        &self,
        session: &Session,
        case_id: Uuid,
        update: NewUpdate,
    ) -> Result<CaseUpdate, AppError> {
        let (case, author) = self.load_authorized(session, case_id).await?;
        update.validate()?;

        let entry = self
            .case_repo
            .append_update(case.id, author.id, update.content.trim())
            .await?;
        tracing::debug!(case_id = %case.id, user_id = %author.id, "Atualização anexada");
        Ok(entry)
    }

    pub async fn attach_file(
        &self,
        session: &Session,
        case_id: Uuid,
        file: FileMeta,
    ) -> Result<CaseFile, AppError> {
        let (case, uploader) = self.load_authorized(session, case_id).await?;
        file.validate()?;

        let entry = self.case_repo.append_file(case.id, file, uploader.id).await?;
        tracing::debug!(case_id = %case.id, file = %entry.name, "Arquivo anexado");
        Ok(entry)
    }

    /// Avançar é livre dentro da franquia; voltar (reabrir) exige admin/superadmin.
    pub async fn set_status(
        &self,
        session: &Session,
        case_id: Uuid,
        status: CaseStatus,
    ) -> Result<Case, AppError> {
        let (case, user) = self.load_authorized(session, case_id).await?;

        match case.status.transition_to(status, user.role)? {
            Transition::Unchanged => Ok(case),
            transition => {
                let updated = self
                    .case_repo
                    .update_status(case.id, case.status, status)
                    .await?;
                if transition == Transition::Reopen {
                    tracing::info!(
                        case_id = %case.id,
                        user_id = %user.id,
                        from = %case.status,
                        to = %status,
                        "Caso reaberto"
                    );
                }
                Ok(updated)
            }
        }
    }

    pub async fn assign(&self, session: &Session, case_id: Uuid, user_id: Uuid) -> Result<Case, AppError> {
        let (case, _) = self.load_authorized(session, case_id).await?;

        let assignee = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if assignee.franchise_id != case.franchise_id {
            return Err(AppError::FranchiseMismatch);
        }

        self.case_repo.set_assignee(case.id, Some(assignee.id)).await
    }

    pub async fn unassign(&self, session: &Session, case_id: Uuid) -> Result<Case, AppError> {
        let (case, _) = self.load_authorized(session, case_id).await?;
        if case.assigned_to.is_none() {
            return Ok(case);
        }
        self.case_repo.set_assignee(case.id, None).await
    }
}
