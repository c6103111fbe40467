pub mod accounting;
pub mod email;
pub mod factory;
pub mod repositories;
pub mod sms;
pub mod templates;
