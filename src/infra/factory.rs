use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::log::LevelFilter;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::ports::AccountingProvider;
use crate::infra::accounting::http_accounting_provider::{DisabledAccounting, HttpAccountingProvider};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    postgres_assignment_repo::PostgresAssignmentRepo, postgres_booking_repo::PostgresBookingRepo,
    postgres_customer_repo::PostgresCustomerRepo, postgres_message_log_repo::PostgresMessageLogRepo,
    postgres_notification_repo::PostgresNotificationRepo, postgres_reminder_repo::PostgresReminderRepo,
    postgres_staff_repo::PostgresStaffRepo,
    sqlite_assignment_repo::SqliteAssignmentRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_customer_repo::SqliteCustomerRepo, sqlite_message_log_repo::SqliteMessageLogRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_reminder_repo::SqliteReminderRepo,
    sqlite_staff_repo::SqliteStaffRepo,
};
use crate::infra::sms::http_sms_service::HttpSmsService;
use crate::infra::templates::load_templates;
use crate::state::{public_limiter, sms_limiter, AppState};

pub async fn bootstrap_state(config: &Config) -> anyhow::Result<AppState> {
    let database_url = &config.database_url;

    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
        config.mail_from.clone(),
    ));
    let sms_service = Arc::new(HttpSmsService::new(
        config.sms_api_url.clone(),
        config.sms_api_key.clone(),
        config.sms_from_number.clone(),
    ));
    let accounting: Arc<dyn AccountingProvider> = match &config.accounting {
        Some(accounting) => Arc::new(HttpAccountingProvider::new(accounting.clone())),
        None => {
            warn!("Accounting credentials not configured; invoicing disabled");
            Arc::new(DisabledAccounting)
        }
    };
    let templates = Arc::new(load_templates().context("Failed to load email templates")?);
    let limiter = public_limiter(config.public_rate_limit_per_minute);
    let sms_pacer = sms_limiter(config.sms_per_second);

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url.parse().context("Invalid Postgres URL")?;
        let opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .context("Failed to connect to Postgres")?;

        run_postgres_migrations(&pool).await?;

        Ok(AppState {
            config: config.clone(),
            booking_repo: Arc::new(PostgresBookingRepo::new(pool.clone())),
            customer_repo: Arc::new(PostgresCustomerRepo::new(pool.clone())),
            staff_repo: Arc::new(PostgresStaffRepo::new(pool.clone())),
            assignment_repo: Arc::new(PostgresAssignmentRepo::new(pool.clone())),
            reminder_repo: Arc::new(PostgresReminderRepo::new(pool.clone())),
            notification_repo: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            message_log_repo: Arc::new(PostgresMessageLogRepo::new(pool)),
            email_service,
            sms_service,
            accounting,
            templates,
            public_limiter: limiter,
            sms_limiter: sms_pacer,
        })
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .context("Invalid SQLite connection string")?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .context("Failed to connect to SQLite")?;

        run_sqlite_migrations(&pool).await?;

        Ok(AppState {
            config: config.clone(),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            customer_repo: Arc::new(SqliteCustomerRepo::new(pool.clone())),
            staff_repo: Arc::new(SqliteStaffRepo::new(pool.clone())),
            assignment_repo: Arc::new(SqliteAssignmentRepo::new(pool.clone())),
            reminder_repo: Arc::new(SqliteReminderRepo::new(pool.clone())),
            notification_repo: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            message_log_repo: Arc::new(SqliteMessageLogRepo::new(pool)),
            email_service,
            sms_service,
            accounting,
            templates,
            public_limiter: limiter,
            sms_limiter: sms_pacer,
        })
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .context("Failed to run Postgres migrations")
}

async fn run_sqlite_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .context("Failed to run SQLite migrations")
}
