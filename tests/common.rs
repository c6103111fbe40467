#![allow(dead_code)]

use cleaning_crm::{
    api::router::create_router,
    config::Config,
    domain::models::{
        auth::Claims,
        booking::{Booking, BookingSubmission},
        invoice::{CreatedInvoice, InvoiceRequest, InvoiceStatus},
        message_log::OutboundEmail,
        staff::{Staff, StaffRole},
    },
    domain::ports::{AccountingProvider, EmailService, SmsService},
    error::AppError,
    infra::repositories::{
        sqlite_assignment_repo::SqliteAssignmentRepo,
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_customer_repo::SqliteCustomerRepo,
        sqlite_message_log_repo::SqliteMessageLogRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
        sqlite_reminder_repo::SqliteReminderRepo,
        sqlite_staff_repo::SqliteStaffRepo,
    },
    infra::templates::load_templates,
    state::{public_limiter, sms_limiter, AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const CRON_SECRET: &str = "test-cron-secret";

#[derive(Default)]
pub struct MockSmsService {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl MockSmsService {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsService for MockSmsService {
    async fn send(&self, to: &str, body: &str) -> Result<String, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Delivery("carrier rejected message".into()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), body.to_string()));
        Ok(format!("msg-{}", sent.len()))
    }
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl MockEmailService {
    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(to, _)| to.clone()).collect()
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Delivery("mail relay unavailable".into()));
        }
        self.sent.lock().unwrap().push((email.to.clone(), email.subject.clone()));
        Ok(())
    }
}

/// Issues sequential invoice ids; their status is whatever the test sets.
#[derive(Default)]
pub struct MockAccounting {
    pub created: AtomicUsize,
    pub statuses: Mutex<HashMap<String, InvoiceStatus>>,
}

impl MockAccounting {
    pub fn set_status(&self, invoice_id: &str, status: InvoiceStatus) {
        self.statuses.lock().unwrap().insert(invoice_id.to_string(), status);
    }
}

#[async_trait]
impl AccountingProvider for MockAccounting {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<CreatedInvoice, AppError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let invoice_id = format!("INV-{}", n);
        self.set_status(&invoice_id, InvoiceStatus::Open);
        Ok(CreatedInvoice { invoice_id, total: request.amount })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, AppError> {
        self.statuses
            .lock()
            .unwrap()
            .get(invoice_id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", invoice_id)))
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub sms: Arc<MockSmsService>,
    pub email: Arc<MockEmailService>,
    pub accounting: Arc<MockAccounting>,
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        port: 0,
        business_timezone: chrono_tz::America::Chicago,
        company_name: "Sparkle Cleaning".to_string(),
        mail_service_url: "http://localhost".to_string(),
        mail_service_token: "token".to_string(),
        mail_from: "bookings@example.com".to_string(),
        sms_api_url: "http://localhost".to_string(),
        sms_api_key: "key".to_string(),
        sms_from_number: "+15550000000".to_string(),
        accounting: None,
        jwt_secret: JWT_SECRET.to_string(),
        cron_secret: CRON_SECRET.to_string(),
        reminder_hours_before: 20,
        notify_timeout_secs: 5,
        reminder_batch_size: 50,
        reminder_lease_secs: 300,
        sms_per_second: 100,
        worker_poll_secs: 60,
        payment_sync_every: 10,
        embedded_worker: false,
        public_rate_limit_per_minute: 1000,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut config = test_config(&db_url);
        customize(&mut config);

        let sms = Arc::new(MockSmsService::default());
        let email = Arc::new(MockEmailService::default());
        let accounting = Arc::new(MockAccounting::default());

        let state = Arc::new(AppState {
            public_limiter: public_limiter(config.public_rate_limit_per_minute),
            sms_limiter: sms_limiter(config.sms_per_second),
            config,
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            customer_repo: Arc::new(SqliteCustomerRepo::new(pool.clone())),
            staff_repo: Arc::new(SqliteStaffRepo::new(pool.clone())),
            assignment_repo: Arc::new(SqliteAssignmentRepo::new(pool.clone())),
            reminder_repo: Arc::new(SqliteReminderRepo::new(pool.clone())),
            notification_repo: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            message_log_repo: Arc::new(SqliteMessageLogRepo::new(pool.clone())),
            email_service: email.clone(),
            sms_service: sms.clone(),
            accounting: accounting.clone(),
            templates: Arc::new(load_templates().expect("templates should parse")),
        });

        let router = create_router(state.clone());

        Self { router, pool, db_filename, state, sms, email, accounting }
    }

    /// Signs an access token the way the auth service does.
    pub fn login_as(&self, staff_id: i64, role: StaffRole) -> AuthHeaders {
        let csrf_token = Uuid::new_v4().simple().to_string();
        let claims = Claims {
            sub: staff_id,
            role,
            csrf_token: csrf_token.clone(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let access_token = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
            .expect("token should encode");
        AuthHeaders { access_token, csrf_token }
    }

    pub async fn admin(&self) -> AuthHeaders {
        let admin = self.seed_staff("Ada", "Admin", StaffRole::Admin, None, Some("ada@example.com")).await;
        self.login_as(admin.id, StaffRole::Admin)
    }

    pub async fn request(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn seed_staff(
        &self,
        first_name: &str,
        last_name: &str,
        role: StaffRole,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Staff {
        let staff = Staff {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            role: role.as_str().to_string(),
            color_tag: "#3b82f6".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.state.staff_repo.create(&staff).await.expect("staff should insert")
    }

    /// Creates a website booking through the lifecycle engine.
    pub async fn create_booking(&self, date: NaiveDate) -> Booking {
        let submission: BookingSubmission = serde_json::from_value(submission_json(date)).unwrap();
        self.state.lifecycle().create_booking(submission).await.expect("booking should commit").value
    }
}

pub fn days_ahead(days: i64) -> NaiveDate {
    (Utc::now() + Duration::days(days)).date_naive()
}

pub fn submission_json(date: NaiveDate) -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "email": "jane@example.com",
        "phone": "(555) 123-4567",
        "address": "12 Main St",
        "city": "Springfield",
        "state": "IL",
        "zip": "62701",
        "service_type": "regular",
        "frequency": "onetime",
        "property_type": "house",
        "bedrooms": 2,
        "bathrooms": 1.5,
        "date": date.format("%Y-%m-%d").to_string(),
        "time": "10:00",
        "notes": "Side door"
    })
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
