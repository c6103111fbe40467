pub mod availability;
pub mod calendar;
pub mod dispatcher;
pub mod effects;
pub mod lifecycle;
pub mod messages;
pub mod payments;
pub mod phone;
pub mod pricing;
pub mod reminders;
