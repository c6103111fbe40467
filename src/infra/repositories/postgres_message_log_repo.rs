use crate::domain::models::message_log::{EmailLog, SmsLog};
use crate::domain::ports::MessageLogRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMessageLogRepo {
    pool: PgPool,
}

impl PostgresMessageLogRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl MessageLogRepository for PostgresMessageLogRepo {
    async fn log_sms(&self, log: &SmsLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO sms_logs (id, booking_id, recipient, message, status, provider_id, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        )
            .bind(&log.id)
            .bind(&log.booking_id)
            .bind(&log.recipient)
            .bind(&log.message)
            .bind(&log.status)
            .bind(&log.provider_id)
            .bind(&log.error_message)
            .bind(log.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn log_email(&self, log: &EmailLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO email_logs (id, booking_id, recipient, subject, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        )
            .bind(&log.id)
            .bind(&log.booking_id)
            .bind(&log.recipient)
            .bind(&log.subject)
            .bind(&log.status)
            .bind(&log.error_message)
            .bind(log.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_sms(&self, booking_id: Option<&str>, limit: i64) -> Result<Vec<SmsLog>, AppError> {
        sqlx::query_as::<_, SmsLog>(
            "SELECT * FROM sms_logs WHERE ($1::TEXT IS NULL OR booking_id = $2) ORDER BY created_at DESC LIMIT $3"
        )
            .bind(booking_id)
            .bind(booking_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_email(&self, booking_id: Option<&str>, limit: i64) -> Result<Vec<EmailLog>, AppError> {
        sqlx::query_as::<_, EmailLog>(
            "SELECT * FROM email_logs WHERE ($1::TEXT IS NULL OR booking_id = $2) ORDER BY created_at DESC LIMIT $3"
        )
            .bind(booking_id)
            .bind(booking_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
