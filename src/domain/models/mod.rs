pub mod assignment;
pub mod auth;
pub mod booking;
pub mod customer;
pub mod history;
pub mod invoice;
pub mod message_log;
pub mod notification;
pub mod reminder;
pub mod staff;
