use crate::domain::models::assignment::{AssignedStaff, StaffScheduleEntry};
use crate::domain::ports::AssignmentRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

pub struct PostgresAssignmentRepo {
    pool: PgPool,
}

impl PostgresAssignmentRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

const ASSIGNED_STAFF_SELECT: &str = r#"
    SELECT a.staff_id, s.first_name, s.last_name, s.email, s.phone, a.assignment_role, a.assigned_at
    FROM booking_assignments a
    JOIN staff s ON s.id = a.staff_id
    WHERE a.booking_id = $1
    ORDER BY a.id
"#;

const SCHEDULE_SELECT: &str = r#"
    SELECT a.staff_id, s.first_name || ' ' || s.last_name AS staff_name,
           b.id AS booking_id, b.customer_name, b.appointment_date, b.appointment_time,
           b.duration_minutes, b.status_label, a.assignment_role
    FROM booking_assignments a
    JOIN staff s ON s.id = a.staff_id
    JOIN bookings b ON b.id = a.booking_id
"#;

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepo {
    async fn replace_all(&self, booking_id: &str, staff_ids: &[i64], role: &str) -> Result<Vec<AssignedStaff>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        sqlx::query("DELETE FROM booking_assignments WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for staff_id in staff_ids {
            sqlx::query("INSERT INTO booking_assignments (booking_id, staff_id, assignment_role, assigned_at) VALUES ($1, $2, $3, $4)")
                .bind(booking_id)
                .bind(staff_id)
                .bind(role)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        let assigned = sqlx::query_as::<_, AssignedStaff>(ASSIGNED_STAFF_SELECT)
            .bind(booking_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(assigned)
    }

    async fn remove(&self, booking_id: &str, staff_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM booking_assignments WHERE booking_id = $1 AND staff_id = $2")
            .bind(booking_id)
            .bind(staff_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_booking(&self, booking_id: &str) -> Result<Vec<AssignedStaff>, AppError> {
        sqlx::query_as::<_, AssignedStaff>(ASSIGNED_STAFF_SELECT)
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_staff(&self, staff_id: i64) -> Result<Vec<StaffScheduleEntry>, AppError> {
        let sql = format!(
            "{} WHERE a.staff_id = $1 AND b.status_label != 'cancelled' ORDER BY b.appointment_date, b.appointment_time",
            SCHEDULE_SELECT
        );
        sqlx::query_as::<_, StaffScheduleEntry>(&sql)
            .bind(staff_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StaffScheduleEntry>, AppError> {
        let sql = format!(
            "{} WHERE b.appointment_date >= $1 AND b.appointment_date <= $2 AND b.status_label != 'cancelled' ORDER BY b.appointment_date, b.appointment_time",
            SCHEDULE_SELECT
        );
        sqlx::query_as::<_, StaffScheduleEntry>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
