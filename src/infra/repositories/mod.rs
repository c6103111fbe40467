pub mod sqlite_booking_repo;
pub mod sqlite_customer_repo;
pub mod sqlite_staff_repo;
pub mod sqlite_assignment_repo;
pub mod sqlite_reminder_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_message_log_repo;

pub mod postgres_booking_repo;
pub mod postgres_customer_repo;
pub mod postgres_staff_repo;
pub mod postgres_assignment_repo;
pub mod postgres_reminder_repo;
pub mod postgres_notification_repo;
pub mod postgres_message_log_repo;
