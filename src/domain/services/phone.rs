/// Reduces a free-form US phone number to its 10 digits. An 11-digit number with
/// a leading country code `1` is accepted; anything else is rejected.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

/// `(555) 123-4567`, or the input unchanged when it is not a valid number.
pub fn format_phone_display(phone: &str) -> String {
    match normalize_phone(phone) {
        Some(d) => format!("({}) {}-{}", &d[0..3], &d[3..6], &d[6..]),
        None => phone.to_string(),
    }
}

pub fn to_e164(phone: &str) -> Option<String> {
    normalize_phone(phone).map(|d| format!("+1{}", d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize_phone("(555) 123-4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("+1 555.123.4567").as_deref(), Some("5551234567"));
        assert_eq!(normalize_phone("555-1234"), None);
        assert_eq!(normalize_phone("25551234567"), None);
    }

    #[test]
    fn test_display_and_e164() {
        assert_eq!(format_phone_display("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone_display("n/a"), "n/a");
        assert_eq!(to_e164("555 123 4567").as_deref(), Some("+15551234567"));
        assert_eq!(to_e164("12"), None);
    }
}
