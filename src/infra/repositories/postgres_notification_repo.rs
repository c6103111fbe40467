use crate::domain::models::notification::Notification;
use crate::domain::ports::NotificationRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepo {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, kind, booking_id, customer_id, payload, is_read, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *"
        )
            .bind(&notification.id)
            .bind(&notification.kind)
            .bind(&notification.booking_id)
            .bind(notification.customer_id)
            .bind(&notification.payload)
            .bind(notification.is_read)
            .bind(notification.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, unread_only: bool, limit: i64) -> Result<Vec<Notification>, AppError> {
        let sql = if unread_only {
            "SELECT * FROM notifications WHERE is_read = FALSE ORDER BY created_at DESC LIMIT $1"
        } else {
            "SELECT * FROM notifications ORDER BY created_at DESC LIMIT $1"
        };
        sqlx::query_as::<_, Notification>(sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_read(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE is_read = FALSE")
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn unread_count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE is_read = FALSE")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
