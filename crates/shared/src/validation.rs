use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::protocol::{iso_timestamp, OrderRequest};

/// Raw contents of the order form's three inputs, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFields {
    pub name: String,
    pub telegram: String,
    pub city: String,
}

impl OrderFields {
    pub fn new(
        name: impl Into<String>,
        telegram: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            telegram: telegram.into(),
            city: city.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.telegram.is_empty() && self.city.is_empty()
    }
}

/// Checks run before anything leaves the client. The first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill all fields")]
    MissingFields,
    #[error("telegram must start with @")]
    BadTelegramFormat,
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing fields",
            Self::BadTelegramFormat => "bad telegram format",
        }
    }
}

/// Trimmed order fields that passed [`ValidationError`] checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidOrder {
    name: String,
    telegram: String,
    city: String,
}

impl ValidOrder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn telegram(&self) -> &str {
        &self.telegram
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn into_request(self, submitted_at: DateTime<Utc>) -> OrderRequest {
        OrderRequest {
            name: self.name,
            telegram: self.telegram,
            city: self.city,
            timestamp: iso_timestamp(submitted_at),
        }
    }
}

impl TryFrom<&OrderFields> for ValidOrder {
    type Error = ValidationError;

    fn try_from(fields: &OrderFields) -> Result<Self, Self::Error> {
        let name = fields.name.trim();
        let telegram = fields.telegram.trim();
        let city = fields.city.trim();

        if name.is_empty() || telegram.is_empty() || city.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if !telegram.starts_with('@') {
            return Err(ValidationError::BadTelegramFormat);
        }

        Ok(Self {
            name: name.to_string(),
            telegram: telegram.to_string(),
            city: city.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn trims_before_checking() {
        let order = ValidOrder::try_from(&OrderFields::new("  Anna ", " @anna99", "Minsk\n"))
            .expect("valid");
        assert_eq!(order.name(), "Anna");
        assert_eq!(order.telegram(), "@anna99");
        assert_eq!(order.city(), "Minsk");
    }

    #[test]
    fn whitespace_only_field_counts_as_missing() {
        for fields in [
            OrderFields::new("   ", "@anna99", "Minsk"),
            OrderFields::new("Anna", "\t", "Minsk"),
            OrderFields::new("Anna", "@anna99", ""),
        ] {
            assert_eq!(
                ValidOrder::try_from(&fields),
                Err(ValidationError::MissingFields)
            );
        }
    }

    #[test]
    fn missing_fields_wins_over_bad_telegram() {
        let fields = OrderFields::new("", "anna99", "Minsk");
        assert_eq!(
            ValidOrder::try_from(&fields),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn telegram_must_lead_with_at_sign_after_trimming() {
        let fields = OrderFields::new("Anna", "anna@99", "Minsk");
        assert_eq!(
            ValidOrder::try_from(&fields),
            Err(ValidationError::BadTelegramFormat)
        );
        assert!(ValidOrder::try_from(&OrderFields::new("Anna", "  @a", "Minsk")).is_ok());
    }

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            ValidationError::MissingFields.to_string(),
            "please fill all fields"
        );
        assert_eq!(
            ValidationError::BadTelegramFormat.to_string(),
            "telegram must start with @"
        );
        assert_eq!(ValidationError::BadTelegramFormat.kind(), "bad telegram format");
    }

    #[test]
    fn into_request_stamps_submission_time() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap();
        let request = ValidOrder::try_from(&OrderFields::new("Anna", "@anna99", "Minsk"))
            .expect("valid")
            .into_request(at);
        assert_eq!(request.timestamp, "2024-05-01T10:15:00.000Z");
        assert_eq!(request.city, "Minsk");
    }
}
