// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CaseRepository, FloorPlanRepository, FranchiseRepository, InMemoryStore, PgCaseRepository,
        PgFloorPlanRepository, PgFranchiseRepository, PgUserRepository, UserRepository,
    },
    models::auth::{NewUser, Role},
    services::{auth::AuthService, case_service::CaseService, floor_plan_service::FloorPlanLocator},
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
// Franquia criada junto com o primeiro superadmin
pub const HEAD_OFFICE: &str = "Matriz";

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sem `DATABASE_URL` o servidor sobe com o armazenamento em memória.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bind_addr: String,
    pub bcrypt_cost: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET não pode ser vazio");
        }

        let token_ttl = match env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => parse_token_ttl(&raw)?,
            Err(_) => chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("BCRYPT_COST inválido: {}", raw))?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let bootstrap_admin = match (
            env::var("BOOTSTRAP_ADMIN_EMAIL"),
            env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            token_ttl,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            bcrypt_cost,
            bootstrap_admin,
        })
    }
}

// Horas positivas e representáveis; fora disso a aplicação não sobe
fn parse_token_ttl(raw: &str) -> anyhow::Result<chrono::Duration> {
    let hours = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("TOKEN_TTL_HOURS inválido: {}", raw))?;
    if hours <= 0 {
        anyhow::bail!("TOKEN_TTL_HOURS deve ser positivo: {}", hours);
    }
    chrono::Duration::try_hours(hours)
        .with_context(|| format!("TOKEN_TTL_HOURS fora do intervalo: {}", hours))
}

// Os quatro repositórios, seja qual for o backend
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub franchises: Arc<dyn FranchiseRepository>,
    pub floor_plans: Arc<dyn FloorPlanRepository>,
    pub cases: Arc<dyn CaseRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            franchises: Arc::new(PgFranchiseRepository::new(pool.clone())),
            floor_plans: Arc::new(PgFloorPlanRepository::new(pool.clone())),
            cases: Arc::new(PgCaseRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            franchises: store.clone(),
            floor_plans: store.clone(),
            cases: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub case_service: CaseService,
    pub floor_plan_locator: FloorPlanLocator,
    pub franchise_repo: Arc<dyn FranchiseRepository>,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let repos = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Repositories::postgres(db_pool)
            }
            None => {
                tracing::warn!("DATABASE_URL ausente: usando armazenamento em memória");
                Repositories::in_memory(Arc::new(InMemoryStore::new()))
            }
        };

        let state = Self::from_repositories(repos, config);
        if let Some(admin) = &config.bootstrap_admin {
            state.bootstrap(admin).await?;
        }
        Ok(state)
    }

    /// Monta o gráfico de dependências sobre repositórios já prontos.
    pub fn from_repositories(repos: Repositories, config: &Config) -> Self {
        let auth_service = AuthService::new(
            repos.users.clone(),
            config.jwt_secret.clone(),
            config.token_ttl,
            config.bcrypt_cost,
        );
        let case_service = CaseService::new(repos.cases.clone(), repos.users.clone());
        let floor_plan_locator = FloorPlanLocator::new(repos.cases, repos.floor_plans);

        Self {
            auth_service,
            case_service,
            floor_plan_locator,
            franchise_repo: repos.franchises,
        }
    }

    // Primeiro superadmin e a franquia matriz; idempotente entre reinícios
    async fn bootstrap(&self, admin: &BootstrapAdmin) -> anyhow::Result<()> {
        let franchise = match self.franchise_repo.find_franchise_by_name(HEAD_OFFICE).await? {
            Some(existing) => existing,
            None => self.franchise_repo.create_franchise(HEAD_OFFICE).await?,
        };

        if self.auth_service.user_exists(&admin.email).await? {
            tracing::debug!("Superadmin inicial já existe");
            return Ok(());
        }

        let user = self
            .auth_service
            .provision_user(NewUser {
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: Role::SuperAdmin,
                franchise_id: franchise.id,
            })
            .await?;
        tracing::info!(user_id = %user.id, franchise_id = %franchise.id, "🔑 Superadmin inicial criado");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttl_accepts_positive_hours() {
        assert_eq!(parse_token_ttl("168").unwrap(), chrono::Duration::hours(168));
        assert_eq!(parse_token_ttl(" 1 ").unwrap(), chrono::Duration::hours(1));
    }

    #[test]
    fn token_ttl_rejects_zero_negative_and_overflow() {
        assert!(parse_token_ttl("0").is_err());
        assert!(parse_token_ttl("-5").is_err());
        assert!(parse_token_ttl("9999999999999999").is_err());
        assert!(parse_token_ttl("sete dias").is_err());
    }
}
