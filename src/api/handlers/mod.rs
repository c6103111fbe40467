pub mod assignments;
pub mod booking;
pub mod calendar;
pub mod cron;
pub mod health;
pub mod invoices;
pub mod message_logs;
pub mod notifications;
pub mod public;
pub mod staff;
