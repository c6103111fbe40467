use chrono_tz::Tz;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AccountingConfig {
    pub api_base: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub realm_id: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub business_timezone: Tz,
    pub company_name: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub mail_from: String,
    pub sms_api_url: String,
    pub sms_api_key: String,
    pub sms_from_number: String,
    pub accounting: Option<AccountingConfig>,
    pub jwt_secret: String,
    pub cron_secret: String,
    pub reminder_hours_before: i64,
    pub notify_timeout_secs: u64,
    pub reminder_batch_size: i64,
    pub reminder_lease_secs: i64,
    pub sms_per_second: u32,
    pub worker_poll_secs: u64,
    pub payment_sync_every: u32,
    pub embedded_worker: bool,
    pub public_rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parsed("PORT", 3000)?,
            business_timezone: parsed("BUSINESS_TIMEZONE", chrono_tz::America::Chicago)?,
            company_name: env::var("COMPANY_NAME").unwrap_or_else(|_| "Sparkle Cleaning".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "bookings@localhost".to_string()),
            sms_api_url: env::var("SMS_API_URL").unwrap_or_else(|_| "https://api.telnyx.com/v2/messages".to_string()),
            sms_api_key: env::var("SMS_API_KEY").unwrap_or_default(),
            sms_from_number: env::var("SMS_FROM_NUMBER").unwrap_or_default(),
            accounting: accounting_from_env()?,
            jwt_secret: required("JWT_SECRET")?,
            cron_secret: required("CRON_SECRET")?,
            reminder_hours_before: parsed("REMINDER_HOURS_BEFORE", 20)?,
            notify_timeout_secs: parsed("NOTIFY_TIMEOUT_SECS", 5)?,
            reminder_batch_size: parsed("REMINDER_BATCH_SIZE", 50)?,
            reminder_lease_secs: parsed("REMINDER_LEASE_SECS", 300)?,
            sms_per_second: parsed("SMS_PER_SECOND", 1)?,
            worker_poll_secs: parsed("WORKER_POLL_SECS", 60)?,
            payment_sync_every: parsed("PAYMENT_SYNC_EVERY", 10)?,
            embedded_worker: parsed("EMBEDDED_WORKER", false)?,
            public_rate_limit_per_minute: parsed("PUBLIC_RATE_LIMIT_PER_MINUTE", 10)?,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

/// The accounting provider is optional, but a partial configuration is an error.
fn accounting_from_env() -> Result<Option<AccountingConfig>, ConfigError> {
    if env::var("ACCOUNTING_CLIENT_ID").is_err() {
        return Ok(None);
    }

    Ok(Some(AccountingConfig {
        api_base: env::var("ACCOUNTING_API_BASE").unwrap_or_else(|_| "https://quickbooks.api.intuit.com".to_string()),
        token_url: env::var("ACCOUNTING_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth.platform.intuit.com/oauth2/v1/tokens/bearer".to_string()),
        client_id: required("ACCOUNTING_CLIENT_ID")?,
        client_secret: required("ACCOUNTING_CLIENT_SECRET")?,
        refresh_token: required("ACCOUNTING_REFRESH_TOKEN")?,
        realm_id: required("ACCOUNTING_REALM_ID")?,
    }))
}
