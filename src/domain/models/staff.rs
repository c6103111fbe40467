use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::domain::services::phone::{format_phone_display, normalize_phone};
use crate::error::AppError;

text_enum!(StaffRole {
    Admin => "admin",
    Manager => "manager",
    Staff => "staff",
});

impl StaffRole {
    /// Roles allowed to perform destructive admin actions such as hard delete.
    pub fn is_manager(&self) -> bool {
        matches!(self, StaffRole::Admin | StaffRole::Manager)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Staff {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub color_tag: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Staff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn phone_display(&self) -> Option<String> {
        self.phone.as_deref().map(format_phone_display)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    #[validate(length(min = 4, max = 9, message = "Color tag must be a hex color"))]
    pub color_tag: Option<String>,
}

impl CreateStaffRequest {
    pub fn into_staff(self) -> Result<Staff, AppError> {
        self.validate()?;
        let role: StaffRole = self.role.parse()?;

        let phone = match self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                normalize_phone(raw).ok_or_else(|| AppError::Validation("Phone number must have 10 digits".into()))?,
            ),
            None => None,
        };

        Ok(Staff {
            id: 0,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.map(|e| e.trim().to_ascii_lowercase()),
            phone,
            role: role.as_str().to_string(),
            color_tag: self.color_tag.unwrap_or_else(|| "#3b82f6".to_string()),
            is_active: true,
            created_at: Utc::now(),
        })
    }
}
