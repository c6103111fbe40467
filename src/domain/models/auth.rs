use serde::{Deserialize, Serialize};

use crate::domain::models::staff::StaffRole;

/// Access token claims issued by the external auth service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: StaffRole,
    pub csrf_token: String,
    pub exp: usize,
}

/// The authenticated staff member behind a request.
#[derive(Debug, Clone)]
pub struct Actor {
    pub staff_id: i64,
    pub role: StaffRole,
}
