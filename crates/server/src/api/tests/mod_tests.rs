use super::*;
use chrono::TimeZone;
use shared::error::ErrorCode;

fn order(name: &str, telegram: &str, city: &str) -> IncomingOrder {
    IncomingOrder {
        name: Some(name.into()),
        telegram: Some(telegram.into()),
        city: Some(city.into()),
        timestamp: None,
    }
}

fn lead(name: &str, phone: &str, email: &str) -> IncomingLead {
    IncomingLead {
        name: Some(name.into()),
        phone: Some(phone.into()),
        email: Some(email.into()),
        timestamp: None,
    }
}

#[test]
fn order_fields_are_trimmed() {
    let checked = check_order(&order(" Anna ", " @anna99", "Minsk ")).expect("valid");
    assert_eq!(
        checked,
        CheckedOrder {
            name: "Anna".into(),
            telegram: "@anna99".into(),
            city: "Minsk".into(),
        }
    );
}

#[test]
fn absent_order_fields_are_required() {
    let err = check_order(&IncomingOrder::default()).expect_err("empty");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.message, "all fields are required");
    assert!(!err.success);
}

#[test]
fn order_rules_apply_in_order() {
    assert_eq!(
        check_order(&order("A", "anna99", "Minsk"))
            .expect_err("short")
            .message,
        "name is too short"
    );
    assert_eq!(
        check_order(&order("Anna", "anna99", "Minsk"))
            .expect_err("no at")
            .message,
        "telegram must start with @"
    );
}

#[test]
fn name_length_counts_characters_not_bytes() {
    assert!(check_order(&order("Юл", "@yul", "Minsk")).is_ok());
    assert!(check_order(&order("Ю", "@yul", "Minsk")).is_err());
}

#[test]
fn lead_rules() {
    assert!(check_lead(&lead("Ivan", "+375291112233", "ivan@example.com")).is_ok());
    assert_eq!(
        check_lead(&lead("Ivan", "", "ivan@example.com"))
            .expect_err("missing")
            .message,
        "name, phone and email are required"
    );
    assert_eq!(
        check_lead(&lead("I", "1", "ivan@example.com"))
            .expect_err("short")
            .message,
        "name is too short"
    );
    for email in ["ivan.example.com", "ivan@example"] {
        assert_eq!(
            check_lead(&lead("Ivan", "1", email))
                .expect_err("email")
                .message,
            "invalid email"
        );
    }
}

#[test]
fn display_time_formats_client_timestamps() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(
        display_time(Some("2024-05-01T10:15:42.123Z"), now),
        "01.05.2024 10:15"
    );
    assert_eq!(
        display_time(Some("2024-05-01T13:15:00+03:00"), now),
        "01.05.2024 13:15"
    );
    assert_eq!(
        display_time(Some("2024-05-01T10:15:00"), now),
        "01.05.2024 10:15"
    );
}

#[test]
fn display_time_falls_back_to_now() {
    let now = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 0).unwrap();
    assert_eq!(display_time(None, now), "02.01.2030 03:04");
    assert_eq!(display_time(Some("yesterday"), now), "02.01.2030 03:04");
}
