mod common;

use casedesk::common::error::AppError;
use casedesk::models::auth::Role;
use casedesk::routes::build_router;
use casedesk::services::session::{HttpAuthApi, LocalAuthApi, SessionManager};
use casedesk::services::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
use common::{Fixture, PASSWORD};

fn manager_for(fx: &Fixture) -> SessionManager<LocalAuthApi, MemoryTokenStore> {
    SessionManager::new(
        LocalAuthApi::new(fx.state.auth_service.clone()),
        MemoryTokenStore::new(),
    )
}

#[tokio::test]
async fn authenticate_populates_session_and_stores_token() {
    let fx = Fixture::new().await;
    let mut manager = manager_for(&fx);

    let session = manager.authenticate(&fx.manager.email, PASSWORD).await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.user(), Some(&fx.manager));
    assert_eq!(session.view_mode(), Some(Role::Manager));
    assert!(!session.is_admin());

    assert!(manager.token().is_some());
}

#[tokio::test]
async fn view_mode_starts_at_role_for_every_role() {
    let fx = Fixture::new().await;
    for user in [&fx.superadmin, &fx.admin, &fx.manager, &fx.staff] {
        let mut manager = manager_for(&fx);
        let session = manager.authenticate(&user.email, PASSWORD).await.unwrap();
        assert_eq!(session.view_mode(), Some(user.role));
        assert_eq!(session.is_admin(), matches!(user.role, Role::Admin | Role::SuperAdmin));
        assert_eq!(session.is_super_admin(), user.role == Role::SuperAdmin);
    }
}

#[tokio::test]
async fn wrong_password_leaves_session_untouched() {
    let fx = Fixture::new().await;
    let mut manager = manager_for(&fx);

    let err = manager.authenticate(&fx.manager.email, "errada").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
    assert!(!manager.session().is_authenticated());
    assert!(manager.token().is_none());

    let err = manager.authenticate("ninguem@f1.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn logout_is_idempotent_and_clears_store() {
    let fx = Fixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = SessionManager::new(
        LocalAuthApi::new(fx.state.auth_service.clone()),
        FileTokenStore::new(dir.path()),
    );

    // Sem sessão também funciona
    manager.logout().await;
    assert!(!manager.session().is_authenticated());

    manager.authenticate(&fx.staff.email, PASSWORD).await.unwrap();
    assert!(FileTokenStore::new(dir.path()).load().await.unwrap().is_some());

    manager.logout().await;
    manager.logout().await;
    assert!(!manager.session().is_authenticated());
    assert!(manager.token().is_none());
    assert_eq!(FileTokenStore::new(dir.path()).load().await.unwrap(), None);
}

#[tokio::test]
async fn resume_restores_from_stored_token() {
    let fx = Fixture::new().await;
    let token = fx.token_for(&fx.admin).await;

    let mut manager = SessionManager::new(
        LocalAuthApi::new(fx.state.auth_service.clone()),
        MemoryTokenStore::with_token(token.clone()),
    );
    let session = manager.resume().await.unwrap();
    assert_eq!(session.user(), Some(&fx.admin));
    assert_eq!(session.view_mode(), Some(Role::Admin));
    assert_eq!(manager.token(), Some(token.as_str()));
}

#[tokio::test]
async fn resume_without_token_stays_anonymous() {
    let fx = Fixture::new().await;
    let mut manager = manager_for(&fx);

    let session = manager.resume().await.unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_restore_logs_out() {
    let fx = Fixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    FileTokenStore::new(dir.path()).save("nao.e.um.jwt").await.unwrap();

    let mut manager = SessionManager::new(
        LocalAuthApi::new(fx.state.auth_service.clone()),
        FileTokenStore::new(dir.path()),
    );

    let err = manager.resume().await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
    assert!(!manager.session().is_authenticated());
    assert!(manager.token().is_none());
    assert_eq!(FileTokenStore::new(dir.path()).load().await.unwrap(), None);
}

#[tokio::test]
async fn unreadable_stored_token_logs_out() {
    let fx = Fixture::new().await;
    let dir = tempfile::tempdir().unwrap();
    let mut manager = SessionManager::new(
        LocalAuthApi::new(fx.state.auth_service.clone()),
        FileTokenStore::new(dir.path()),
    );
    manager.authenticate(&fx.manager.email, PASSWORD).await.unwrap();

    // Arquivo corrompido: não é UTF-8
    let path = FileTokenStore::new(dir.path()).path().to_path_buf();
    std::fs::write(&path, [0xff, 0xfe]).unwrap();

    let err = manager.resume().await.unwrap_err();
    assert!(matches!(err, AppError::IoError(_)));
    assert!(!manager.session().is_authenticated());
    assert!(manager.token().is_none());
    assert!(!path.exists());

    // Próxima inicialização já começa limpa
    let session = manager.resume().await.unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn failed_restore_drops_an_existing_session() {
    let fx = Fixture::new().await;
    let mut manager = manager_for(&fx);
    manager.authenticate(&fx.manager.email, PASSWORD).await.unwrap();

    let err = manager.restore_session("adulterado").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
    assert!(!manager.session().is_authenticated());
}

#[tokio::test]
async fn view_mode_is_admin_only_and_never_escalates() {
    let fx = Fixture::new().await;

    let mut manager = manager_for(&fx);
    manager.authenticate(&fx.manager.email, PASSWORD).await.unwrap();
    let err = manager.set_view_mode(Role::Staff).unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));
    assert_eq!(manager.session().view_mode(), Some(Role::Manager));

    let mut manager = manager_for(&fx);
    manager.authenticate(&fx.admin.email, PASSWORD).await.unwrap();
    let err = manager.set_view_mode(Role::SuperAdmin).unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));
    let session = manager.set_view_mode(Role::Staff).unwrap();
    assert_eq!(session.view_mode(), Some(Role::Staff));
    // O papel real não muda
    assert!(session.is_admin());

    let mut manager = manager_for(&fx);
    let err = manager.set_view_mode(Role::Staff).unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}

#[tokio::test]
async fn http_client_talks_to_the_router() {
    let fx = Fixture::new().await;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(fx.state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{addr}");
    let mut manager = SessionManager::new(HttpAuthApi::new(base_url.clone()), MemoryTokenStore::new());

    let err = manager.authenticate(&fx.staff.email, "errada").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    manager.authenticate(&fx.staff.email, PASSWORD).await.unwrap();
    let token = manager.token().unwrap().to_string();

    let mut fresh = SessionManager::new(HttpAuthApi::new(base_url), MemoryTokenStore::with_token(token));
    let session = fresh.resume().await.unwrap();
    assert_eq!(session.user(), Some(&fx.staff));

    let err = fresh.restore_session("lixo").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
    assert!(!fresh.session().is_authenticated());
}
