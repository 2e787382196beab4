use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub fn submit_order_route() -> &'static str {
    "/api/submit-order"
}

pub fn submit_lead_route() -> &'static str {
    "/api/submit-lead"
}

pub fn health_route() -> &'static str {
    "/health"
}

/// Body of `POST /api/submit-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub name: String,
    pub telegram: String,
    pub city: String,
    pub timestamp: String,
}

/// Body of `POST /api/submit-lead`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub telegram_sent: bool,
}

/// The part of a rejection body the form cares about. Anything else the
/// backend sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub telegram_configured: bool,
}

/// Millisecond-precision UTC timestamp with a `Z` suffix,
/// e.g. `2024-05-01T10:15:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn order_request_uses_wire_field_names() {
        let order = OrderRequest {
            name: "Anna".into(),
            telegram: "@anna99".into(),
            city: "Minsk".into(),
            timestamp: "2024-05-01T10:15:00.000Z".into(),
        };
        let value = serde_json::to_value(&order).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Anna",
                "telegram": "@anna99",
                "city": "Minsk",
                "timestamp": "2024-05-01T10:15:00.000Z",
            })
        );
    }

    #[test]
    fn error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"success":false}"#).expect("json");
        assert_eq!(body.message, None);
    }

    #[test]
    fn iso_timestamp_matches_browser_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-05-01T10:15:00.000Z");
    }
}
