#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use casedesk::config::{AppState, Config, Repositories};
use casedesk::db::{FranchiseRepository, InMemoryStore};
use casedesk::models::auth::{NewUser, Role, User};
use casedesk::models::case::{Case, NewCase};
use casedesk::models::session::Session;

pub const PASSWORD: &str = "senha-segura";

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "segredo-de-teste".to_string(),
        token_ttl: chrono::Duration::hours(1),
        bind_addr: "127.0.0.1:0".to_string(),
        // Custo mínimo do bcrypt: os testes não medem força de hash
        bcrypt_cost: 4,
        bootstrap_admin: None,
    }
}

/// Duas franquias (F1, F2) e um usuário por papel relevante.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub state: AppState,
    pub f1: uuid::Uuid,
    pub f2: uuid::Uuid,
    pub superadmin: User,
    pub admin: User,
    pub manager: User,
    pub staff: User,
    pub manager_f2: User,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::from_repositories(Repositories::in_memory(store.clone()), &test_config());

        let f1 = store.create_franchise("F1").await.expect("f1").id;
        let f2 = store.create_franchise("F2").await.expect("f2").id;

        let superadmin = provision(&state, "root@matriz.com", Role::SuperAdmin, f1).await;
        let admin = provision(&state, "admin@f1.com", Role::Admin, f1).await;
        let manager = provision(&state, "gerente@f1.com", Role::Manager, f1).await;
        let staff = provision(&state, "equipe@f1.com", Role::Staff, f1).await;
        let manager_f2 = provision(&state, "gerente@f2.com", Role::Manager, f2).await;

        Self {
            store,
            state,
            f1,
            f2,
            superadmin,
            admin,
            manager,
            staff,
            manager_f2,
        }
    }

    pub fn session(&self, user: &User) -> Session {
        Session::authenticated(user.clone())
    }

    pub async fn open_case(&self, user: &User, franchise_id: uuid::Uuid) -> Case {
        self.state
            .case_service
            .create_case(
                &self.session(user),
                NewCase {
                    title: "Vazamento na cozinha".to_string(),
                    description: "Água sob a pia".to_string(),
                    franchise_id,
                },
            )
            .await
            .expect("create case")
    }

    pub async fn token_for(&self, user: &User) -> String {
        self.state
            .auth_service
            .login_user(&user.email, PASSWORD)
            .await
            .expect("login")
            .token
    }
}

async fn provision(state: &AppState, email: &str, role: Role, franchise_id: uuid::Uuid) -> User {
    state
        .auth_service
        .provision_user(NewUser {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
            franchise_id,
        })
        .await
        .expect("provision user")
}
