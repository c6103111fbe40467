use tera::Tera;

/// Email templates compiled into the binary.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("customer_confirmation.html", include_str!("../templates/customer_confirmation.html")),
        ("admin_alert.html", include_str!("../templates/admin_alert.html")),
        ("staff_assignment.html", include_str!("../templates/staff_assignment.html")),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_load() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"customer_confirmation.html"));
        assert!(names.contains(&"admin_alert.html"));
        assert!(names.contains(&"staff_assignment.html"));
    }
}
