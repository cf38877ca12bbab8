// src/models/session.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Identity {
    user: User,
    view_mode: Role,
}

/// Sessão lógica de um processo cliente (ou de uma requisição, no servidor).
///
/// O modo de visualização só existe junto com um usuário autenticado, então
/// "viewMode vazio" e "sem usuário" são o mesmo estado.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Sessão recém-validada: o modo de visualização começa igual ao papel.
    pub fn authenticated(user: User) -> Self {
        let view_mode = user.role;
        Self {
            identity: Some(Identity { user, view_mode }),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.identity.as_ref().map(|i| &i.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn franchise_id(&self) -> Option<Uuid> {
        self.user().map(|u| u.franchise_id)
    }

    pub fn view_mode(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.view_mode)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role().is_some_and(Role::is_super_admin)
    }

    /// Troca o papel "de exibição". Só admin/superadmin, e nunca acima do próprio papel.
    pub fn set_view_mode(&mut self, mode: Role) -> Result<(), AppError> {
        let identity = self.identity.as_mut().ok_or(AppError::InvalidToken)?;
        let role = identity.user.role;

        if !role.is_admin() || mode > role {
            tracing::warn!(
                user_id = %identity.user.id,
                %role,
                requested = %mode,
                "troca de modo de visualização negada"
            );
            return Err(AppError::PermissionDenied);
        }

        identity.view_mode = mode;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.identity = None;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            user: self.user().cloned(),
            is_authenticated: self.is_authenticated(),
            is_admin: self.is_admin(),
            is_super_admin: self.is_super_admin(),
            view_mode: self.view_mode().map(|m| m.to_string()).unwrap_or_default(),
        }
    }
}

// Formato exposto em GET /api/auth/me
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub is_super_admin: bool,
    #[schema(example = "manager")]
    pub view_mode: String,
}
