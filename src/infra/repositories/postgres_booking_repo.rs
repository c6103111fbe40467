use crate::domain::models::{
    booking::{Booking, BookingPatch, PaymentStatus},
    customer::CustomerContact,
    history::{HistoryEntry, StatusHistory},
};
use crate::domain::ports::BookingRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

async fn insert_history(conn: &mut PgConnection, booking_id: &str, entry: &HistoryEntry) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO booking_status_history (booking_id, previous_status, new_status, note, changed_by, created_at) VALUES ($1, $2, $3, $4, $5, $6)"
    )
        .bind(booking_id)
        .bind(&entry.previous_status)
        .bind(&entry.new_status)
        .bind(&entry.note)
        .bind(entry.changed_by)
        .bind(Utc::now())
        .execute(conn)
        .await
        .map_err(AppError::Database)?;
    Ok(())
}

async fn resolve_customer(conn: &mut PgConnection, contact: &CustomerContact) -> Result<Option<i64>, AppError> {
    if contact.is_anonymous() {
        return Ok(None);
    }

    let now = Utc::now();
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM customers WHERE email = $1 OR phone = $2 ORDER BY CASE WHEN email = $3 THEN 0 ELSE 1 END, id LIMIT 1"
    )
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.email)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    if let Some(id) = existing {
        sqlx::query("UPDATE customers SET email = COALESCE(email, $1), phone = COALESCE(phone, $2), updated_at = $3 WHERE id = $4")
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::Database)?;
        return Ok(Some(id));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO customers (first_name, last_name, email, phone, address, city, state, zip, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id"
    )
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.address)
        .bind(&contact.city)
        .bind(&contact.state)
        .bind(&contact.zip)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::Database)?;
    Ok(Some(id))
}

/// Distinguishes a missing booking from one the guarded UPDATE refused to touch.
async fn missing_or_conflict(conn: &mut PgConnection, id: &str, conflict: &str) -> AppError {
    let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_one(conn)
        .await;
    match found {
        Ok(0) => AppError::NotFound(format!("Booking {} not found", id)),
        Ok(_) => AppError::Conflict(conflict.to_string()),
        Err(e) => AppError::Database(e),
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, contact: &CustomerContact, booking: &Booking, history: &HistoryEntry) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let customer_id = resolve_customer(&mut tx, contact).await?;

        let created = sqlx::query_as::<_, Booking>(
            r#"INSERT INTO bookings (
                id, customer_id, customer_name, email, phone, service_type, frequency, property_type,
                bedrooms, bathrooms, appointment_date, appointment_time, duration_minutes,
                address, city, state, zip, estimated_price, final_price, status, status_label,
                payment_status, invoice_id, notes, source, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27) RETURNING *"#
        )
            .bind(&booking.id)
            .bind(customer_id)
            .bind(&booking.customer_name)
            .bind(&booking.email)
            .bind(&booking.phone)
            .bind(&booking.service_type)
            .bind(&booking.frequency)
            .bind(&booking.property_type)
            .bind(booking.bedrooms)
            .bind(booking.bathrooms)
            .bind(booking.appointment_date)
            .bind(booking.appointment_time)
            .bind(booking.duration_minutes)
            .bind(&booking.address)
            .bind(&booking.city)
            .bind(&booking.state)
            .bind(&booking.zip)
            .bind(booking.estimated_price)
            .bind(booking.final_price)
            .bind(&booking.status)
            .bind(&booking.status_label)
            .bind(&booking.payment_status)
            .bind(&booking.invoice_id)
            .bind(&booking.notes)
            .bind(&booking.source)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        insert_history(&mut tx, &created.id, history).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY appointment_date DESC, appointment_time DESC"
        )
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE appointment_date >= $1 AND appointment_date <= $2 AND status_label != 'cancelled' ORDER BY appointment_date, appointment_time"
        )
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn reschedule(&self, id: &str, date: NaiveDate, time: NaiveTime, history: &HistoryEntry) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = sqlx::query_as::<_, Booking>(
            r#"UPDATE bookings
               SET appointment_date = $1, appointment_time = $2, status = 'confirmed', status_label = 'scheduled', updated_at = $3
               WHERE id = $4 AND status != 'cancelled' AND status_label != 'cancelled'
               RETURNING *"#
        )
            .bind(date)
            .bind(time)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let Some(updated) = updated else {
            return Err(missing_or_conflict(&mut tx, id, "Cannot reschedule a cancelled booking").await);
        };

        insert_history(&mut tx, id, history).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn cancel(&self, id: &str, history: &HistoryEntry) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'cancelled', status_label = 'cancelled', updated_at = $1 WHERE id = $2 AND status != 'cancelled' AND status_label != 'cancelled' RETURNING *"
        )
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let Some(cancelled) = cancelled else {
            return Err(missing_or_conflict(&mut tx, id, "Booking is already cancelled").await);
        };

        sqlx::query("DELETE FROM booking_assignments WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        insert_history(&mut tx, id, history).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn apply_patch(&self, id: &str, patch: &BookingPatch, history: Option<&HistoryEntry>) -> Result<Booking, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE bookings SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(v) = &patch.customer_name { qb.push(", customer_name = ").push_bind(v.trim().to_string()); }
        if let Some(v) = &patch.email { qb.push(", email = ").push_bind(v.clone()); }
        if let Some(v) = &patch.phone { qb.push(", phone = ").push_bind(v.clone()); }
        if let Some(v) = &patch.address { qb.push(", address = ").push_bind(v.clone()); }
        if let Some(v) = &patch.city { qb.push(", city = ").push_bind(v.clone()); }
        if let Some(v) = &patch.state { qb.push(", state = ").push_bind(v.clone()); }
        if let Some(v) = &patch.zip { qb.push(", zip = ").push_bind(v.clone()); }
        if let Some(v) = patch.appointment_date { qb.push(", appointment_date = ").push_bind(v); }
        if let Some(v) = patch.appointment_time { qb.push(", appointment_time = ").push_bind(v); }
        if let Some(v) = patch.duration_minutes { qb.push(", duration_minutes = ").push_bind(v); }
        if let Some(v) = patch.estimated_price { qb.push(", estimated_price = ").push_bind(v); }
        if let Some(v) = patch.final_price { qb.push(", final_price = ").push_bind(v); }
        if let Some(v) = patch.status { qb.push(", status = ").push_bind(v.as_str()); }
        if let Some(v) = patch.status_label { qb.push(", status_label = ").push_bind(v.as_str()); }
        if let Some(v) = patch.payment_status { qb.push(", payment_status = ").push_bind(v.as_str()); }
        if let Some(v) = &patch.notes { qb.push(", notes = ").push_bind(v.clone()); }

        qb.push(" WHERE id = ").push_bind(id.to_string());
        if patch.touches_lifecycle() {
            qb.push(" AND status != 'cancelled' AND status_label != 'cancelled'");
        }
        qb.push(" RETURNING *");

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let updated = qb
            .build_query_as::<Booking>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let Some(updated) = updated else {
            return Err(missing_or_conflict(&mut tx, id, "Cannot change the schedule or status of a cancelled booking").await);
        };

        if patch.cancels() {
            sqlx::query("DELETE FROM booking_assignments WHERE booking_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        if let Some(entry) = history {
            insert_history(&mut tx, id, entry).await?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str, history: &HistoryEntry) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let now = Utc::now();

        sqlx::query("DELETE FROM booking_assignments WHERE booking_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query(
            "UPDATE scheduled_reminders SET status = 'failed', error_message = 'Booking deleted', updated_at = $1 WHERE booking_id = $2 AND status = 'pending'"
        )
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Booking {} not found", id)));
        }

        insert_history(&mut tx, id, history).await?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_history(&self, booking_id: &str) -> Result<Vec<StatusHistory>, AppError> {
        sqlx::query_as::<_, StatusHistory>("SELECT * FROM booking_status_history WHERE booking_id = $1 ORDER BY id")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_invoice(&self, id: &str, invoice_id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET invoice_id = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(invoice_id)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn mark_paid(&self, id: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>("UPDATE bookings SET payment_status = $1, updated_at = $2 WHERE id = $3 RETURNING *")
            .bind(PaymentStatus::Paid.as_str())
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn claim_payment_checks(&self, checked_at: DateTime<Utc>, limit: i64) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET payment_checked_at = $1
            WHERE id IN (
                SELECT id FROM bookings
                WHERE invoice_id IS NOT NULL AND payment_status = 'unpaid' AND status_label != 'cancelled'
                ORDER BY payment_checked_at NULLS FIRST, appointment_date
                LIMIT $2
            )
            RETURNING *
            "#
        )
            .bind(checked_at)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
