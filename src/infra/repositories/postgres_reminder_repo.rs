use crate::domain::models::reminder::ScheduledReminder;
use crate::domain::ports::ReminderRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ReminderRepository for PostgresReminderRepo {
    async fn replace_pending(&self, reminder: &ScheduledReminder) -> Result<ScheduledReminder, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM scheduled_reminders WHERE booking_id = $1 AND status = 'pending'")
            .bind(&reminder.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let inserted = sqlx::query_as::<_, ScheduledReminder>(
            "INSERT INTO scheduled_reminders (id, booking_id, phone, send_at, message, status, error_message, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *"
        )
            .bind(&reminder.id)
            .bind(&reminder.booking_id)
            .bind(&reminder.phone)
            .bind(reminder.send_at)
            .bind(&reminder.message)
            .bind(&reminder.status)
            .bind(&reminder.error_message)
            .bind(reminder.created_at)
            .bind(reminder.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn cancel_pending(&self, booking_id: &str, reason: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE scheduled_reminders SET status = 'failed', error_message = $1, updated_at = $2 WHERE booking_id = $3 AND status IN ('pending', 'processing')"
        )
            .bind(reason)
            .bind(Utc::now())
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn claim_due(&self, now: DateTime<Utc>, stale_before: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledReminder>, AppError> {
        sqlx::query_as::<_, ScheduledReminder>(
            r#"
            UPDATE scheduled_reminders
            SET status = 'processing', updated_at = $1
            WHERE id IN (
                SELECT id FROM scheduled_reminders
                WHERE (status = 'pending' AND send_at <= $2)
                   OR (status = 'processing' AND updated_at < $3)
                ORDER BY send_at
                LIMIT $4
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#
        )
            .bind(Utc::now())
            .bind(now)
            .bind(stale_before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_sent(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE scheduled_reminders SET status = 'sent', error_message = NULL, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_failed(&self, id: &str, error_message: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE scheduled_reminders SET status = 'failed', error_message = $1, updated_at = $2 WHERE id = $3")
            .bind(error_message)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_for_booking(&self, booking_id: &str) -> Result<Vec<ScheduledReminder>, AppError> {
        sqlx::query_as::<_, ScheduledReminder>("SELECT * FROM scheduled_reminders WHERE booking_id = $1 ORDER BY created_at")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
