//! Test harnesses.
//!
//! `TestHarness` wires in-memory mocks into `ServerDeps` and seeds a small
//! marketplace: one funded sender, three runners, an admin with two offline
//! accounts, and a task and a service category.
//!
//! `PgHarness` runs against a real Postgres via testcontainers. The container
//! and migrations are initialized once and shared across tests.

use anyhow::{Context, Result};
use axum::Router;
use errand_core::common::{AuthUser, ErrandId, UserId};
use errand_core::domains::errands::activities;
use errand_core::domains::errands::models::Errand;
use errand_core::domains::users::models::UserProfile;
use errand_core::kernel::test_dependencies::{
    InMemoryCategoryDirectory, InMemoryIdentityResolver, InMemoryLedger, InMemoryUserDirectory,
};
use errand_core::kernel::{BaseLedger, ServerDeps, TestDependencies};
use errand_core::server::build_app;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use super::fixtures::{cleaning_category, delivery_category, errand_input};

pub const SENDER_BALANCE: i64 = 5000;
pub const SENDER_TOKEN: &str = "sender-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const RUNNER_TOKENS: [&str; 3] = ["runner-a-token", "runner-b-token", "runner-c-token"];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestHarness {
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
    pub sender: AuthUser,
    pub runners: Vec<AuthUser>,
    pub admin: AuthUser,
    pub offline_sender: UserId,
    pub offline_runner: UserId,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_ledger(InMemoryLedger::new())
    }

    /// Build the harness around a custom ledger. The sender's starting
    /// balance is credited on top of whatever the ledger already holds.
    pub fn with_ledger(ledger: InMemoryLedger) -> Self {
        init_tracing();

        let sender_profile = UserProfile::new("Ada", "Sender");
        let runner_profiles = [
            UserProfile::new("Bola", "Runner"),
            UserProfile::new("Chidi", "Runner"),
            UserProfile::new("Dayo", "Runner"),
        ];
        let admin_profile = UserProfile::new("Efe", "Admin");
        let offline_sender = UserProfile::offline("Funke", "Offline");
        let offline_runner = UserProfile::offline("Gbenga", "Offline");

        let sender = AuthUser::new(sender_profile.id);
        let runners: Vec<AuthUser> = runner_profiles.iter().map(|p| AuthUser::new(p.id)).collect();
        let admin = AuthUser::admin(admin_profile.id);

        let mut users = InMemoryUserDirectory::new()
            .with_user(sender_profile)
            .with_user(admin_profile)
            .with_user(offline_sender.clone())
            .with_user(offline_runner.clone());
        for profile in runner_profiles {
            users = users.with_user(profile);
        }

        let mut identity = InMemoryIdentityResolver::new()
            .with_session(SENDER_TOKEN, sender.clone())
            .with_session(ADMIN_TOKEN, admin.clone());
        for (token, runner) in RUNNER_TOKENS.iter().zip(&runners) {
            identity = identity.with_session(*token, runner.clone());
        }

        let mocks = TestDependencies::new()
            .mock_ledger(ledger.with_balance(sender.user_id, SENDER_BALANCE))
            .mock_users(users)
            .mock_identity(identity)
            .mock_categories(
                InMemoryCategoryDirectory::new()
                    .with_category(delivery_category())
                    .with_category(cleaning_category()),
            );
        let deps = mocks.server_deps();

        Self {
            mocks,
            deps,
            sender,
            runners,
            admin,
            offline_sender: offline_sender.id,
            offline_runner: offline_runner.id,
        }
    }

    pub fn runner(&self, index: usize) -> &AuthUser {
        &self.runners[index]
    }

    pub fn router(&self) -> Router {
        build_app(Arc::new(self.deps.clone()), None, Vec::new())
    }

    pub async fn balance(&self, user_id: UserId) -> i64 {
        self.mocks
            .ledger
            .balance(user_id)
            .await
            .expect("in-memory balance")
    }

    pub fn errand(&self, id: ErrandId) -> Errand {
        self.mocks.errands.get(id).expect("errand stored")
    }

    /// Draft and publish a delivery errand for the sender.
    pub async fn published_errand(&self, budget: i64) -> Errand {
        let draft = activities::get_or_create_draft(&self.sender, &self.deps)
            .await
            .expect("draft");
        activities::publish_errand(&self.sender, draft.id, errand_input(budget), &self.deps)
            .await
            .expect("publish")
    }

    /// Notifications go through a background worker; poll until `count`
    /// have reached the sink.
    pub async fn wait_for_notifications(&self, count: usize) {
        for _ in 0..100 {
            if self.mocks.notifications.sent().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Postgres
// =============================================================================

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        pool.close().await;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> Result<&'static Self> {
        SHARED_INFRA.get_or_try_init(Self::init).await
    }
}

pub struct PgHarness {
    pub pool: PgPool,
    pub deps: ServerDeps,
}

impl PgHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await?;
        let pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;
        let deps = ServerDeps::postgres(pool.clone(), 64);
        Ok(Self { pool, deps })
    }
}
