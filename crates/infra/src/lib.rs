mod config;
mod repos;
mod senders;
mod services;
mod system;

pub use config::{Config, ResendConfig, TwilioConfig};
pub use repos::{DeleteResult, IReminderRepo, Repos, StoreError};
pub use senders::{
    EmailSender, IChannelSender, SendError, SendReceipt, Senders, SmsSender, UnconfiguredSender,
    VoiceSender,
};
pub use services::{
    IEmailProvider, ITelephonyProvider, OutgoingEmail, ProviderError, ResendEmailApi, TwilioApi,
};
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::info;

/// Every client the application needs, constructed once at process start
#[derive(Clone)]
pub struct LaterDateContext {
    pub repos: Repos,
    pub senders: Senders,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl LaterDateContext {
    async fn create(params: ContextParams) -> Self {
        let config = Config::new();
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        Self {
            repos,
            senders: Senders::from_config(&config),
            config,
            sys: Arc::new(RealSys {}),
        }
    }

    /// Context backed by the inmemory store, used for local development and tests
    pub fn create_inmemory(config: Config, senders: Senders) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            senders,
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> LaterDateContext {
    let postgres_connection_string = get_psql_connection_string();
    let ctx = LaterDateContext::create(ContextParams {
        postgres_connection_string,
    })
    .await;
    if ctx.config.run_migrations {
        info!("Running migrations ...");
        run_migration()
            .await
            .expect("Migrations to apply to the reminder store");
        info!("Running migrations ... [done]");
    }
    ctx
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&get_psql_connection_string())
        .await
        .map_err(MigrateError::Execute)?;

    sqlx::migrate!().run(&pool).await
}
