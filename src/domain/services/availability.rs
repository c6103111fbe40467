use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::domain::models::assignment::StaffScheduleEntry;
use crate::domain::models::booking::StatusLabel;
use crate::domain::models::staff::Staff;

#[derive(Debug, Serialize)]
pub struct StaffAvailability {
    pub staff_id: i64,
    pub name: String,
    pub role: String,
    pub color_tag: String,
    pub phone_display: Option<String>,
    pub available: bool,
    pub conflicting_bookings: Vec<String>,
}

fn minute_of_day(time: NaiveTime) -> i64 {
    (time.hour() * 60 + time.minute()) as i64
}

fn overlaps(a_start: i64, a_len: i64, b_start: i64, b_len: i64) -> bool {
    a_start < b_start + b_len && b_start < a_start + a_len
}

/// Computes availability of each active staff member for one day. `entries` are
/// that day's assignments. Without a requested time any assignment makes the
/// staff member busy; with one, only overlapping windows do.
pub fn staff_availability(
    staff: &[Staff],
    entries: &[StaffScheduleEntry],
    requested: Option<(NaiveTime, i32)>,
) -> Vec<StaffAvailability> {
    staff
        .iter()
        .filter(|s| s.is_active)
        .map(|s| {
            let conflicting_bookings: Vec<String> = entries
                .iter()
                .filter(|e| e.staff_id == s.id && e.status_label != StatusLabel::Cancelled.as_str())
                .filter(|e| match requested {
                    None => true,
                    Some((time, duration)) => overlaps(
                        minute_of_day(e.appointment_time),
                        e.duration_minutes as i64,
                        minute_of_day(time),
                        duration as i64,
                    ),
                })
                .map(|e| e.booking_id.clone())
                .collect();

            StaffAvailability {
                staff_id: s.id,
                name: s.full_name(),
                role: s.role.clone(),
                color_tag: s.color_tag.clone(),
                phone_display: s.phone_display(),
                available: conflicting_bookings.is_empty(),
                conflicting_bookings,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn staff(id: i64, active: bool) -> Staff {
        Staff {
            id,
            first_name: format!("Staff{}", id),
            last_name: "Member".into(),
            email: None,
            phone: Some("5550001111".into()),
            role: "staff".into(),
            color_tag: "#3b82f6".into(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn entry(staff_id: i64, hour: u32, duration: i32) -> StaffScheduleEntry {
        StaffScheduleEntry {
            staff_id,
            staff_name: "x".into(),
            booking_id: format!("BK-{}-{}", staff_id, hour),
            customer_name: "Customer".into(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            duration_minutes: duration,
            status_label: "scheduled".into(),
            assignment_role: "lead".into(),
        }
    }

    #[test]
    fn test_overlapping_window_is_busy() {
        let team = vec![staff(1, true), staff(2, true)];
        let entries = vec![entry(1, 9, 120)];
        let at_ten = Some((NaiveTime::from_hms_opt(10, 0, 0).unwrap(), 60));

        let result = staff_availability(&team, &entries, at_ten);
        assert!(!result[0].available);
        assert_eq!(result[0].conflicting_bookings, vec!["BK-1-9".to_string()]);
        assert!(result[1].available);
    }

    #[test]
    fn test_adjacent_window_is_free() {
        let team = vec![staff(1, true)];
        let entries = vec![entry(1, 9, 120)];
        let at_eleven = Some((NaiveTime::from_hms_opt(11, 0, 0).unwrap(), 60));
        assert!(staff_availability(&team, &entries, at_eleven)[0].available);
    }

    #[test]
    fn test_whole_day_and_inactive() {
        let team = vec![staff(1, true), staff(2, false)];
        let entries = vec![entry(1, 15, 60)];
        let result = staff_availability(&team, &entries, None);
        assert_eq!(result.len(), 1);
        assert!(!result[0].available);
    }
}
