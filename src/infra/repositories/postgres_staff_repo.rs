use crate::domain::models::staff::{Staff, StaffRole};
use crate::domain::ports::StaffRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct PostgresStaffRepo {
    pool: PgPool,
}

impl PostgresStaffRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffRepository for PostgresStaffRepo {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError> {
        sqlx::query_as::<_, Staff>(
            "INSERT INTO staff (first_name, last_name, email, phone, role, color_tag, is_active, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"
        )
            .bind(&staff.first_name)
            .bind(&staff.last_name)
            .bind(&staff.email)
            .bind(&staff.phone)
            .bind(&staff.role)
            .bind(&staff.color_tag)
            .bind(staff.is_active)
            .bind(staff.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Staff>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM staff WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        qb.build_query_as::<Staff>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Staff>, AppError> {
        let sql = if active_only {
            "SELECT * FROM staff WHERE is_active = TRUE ORDER BY first_name, last_name"
        } else {
            "SELECT * FROM staff ORDER BY first_name, last_name"
        };
        sqlx::query_as::<_, Staff>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active_by_roles(&self, roles: &[StaffRole]) -> Result<Vec<Staff>, AppError> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM staff WHERE is_active = TRUE AND role IN (");
        let mut separated = qb.separated(", ");
        for role in roles {
            separated.push_bind(role.as_str());
        }
        separated.push_unseparated(") ORDER BY id");

        qb.build_query_as::<Staff>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
