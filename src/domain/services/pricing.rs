use crate::domain::models::booking::{Frequency, ServiceType};
use crate::error::AppError;

pub fn base_price(service: ServiceType) -> f64 {
    match service {
        ServiceType::Regular => 129.0,
        ServiceType::Deep => 249.0,
        ServiceType::Move => 299.0,
        ServiceType::Onetime => 159.0,
    }
}

pub fn bedroom_multiplier(bedrooms: i32) -> Option<f64> {
    match bedrooms {
        1 => Some(1.0),
        2 => Some(1.3),
        3 => Some(1.6),
        4 => Some(2.0),
        5 => Some(2.5),
        _ => None,
    }
}

pub fn frequency_discount(frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Weekly => 0.15,
        Frequency::Biweekly => 0.10,
        Frequency::Monthly => 0.05,
        Frequency::Onetime => 0.0,
    }
}

/// base × bedroom multiplier × (1 − discount), rounded to cents.
pub fn estimate_price(service: ServiceType, bedrooms: i32, frequency: Frequency) -> Result<f64, AppError> {
    let multiplier = bedroom_multiplier(bedrooms)
        .ok_or_else(|| AppError::Validation("Bedrooms must be between 1 and 5".into()))?;
    let raw = base_price(service) * multiplier * (1.0 - frequency_discount(frequency));
    Ok((raw * 100.0).round() / 100.0)
}
