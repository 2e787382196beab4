use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use shared::{
    error::ApiError,
    protocol::{HealthResponse, SubmitResponse},
};
use tracing::{debug, info, warn};

use crate::{
    app_state::AppState,
    notify::{lead_message, order_message},
};

const NO_DATA: &str = "no data";
const ORDER_FIELDS_REQUIRED: &str = "all fields are required";
const LEAD_FIELDS_REQUIRED: &str = "name, phone and email are required";
const NAME_TOO_SHORT: &str = "name is too short";
const TELEGRAM_NEEDS_AT: &str = "telegram must start with @";
const INVALID_EMAIL: &str = "invalid email";
const ORDER_ACCEPTED: &str = "order submitted";
const LEAD_ACCEPTED: &str = "thanks, you are on the list";

const MIN_NAME_CHARS: usize = 2;
const DISPLAY_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Order body as received. Every field is optional on the wire; absent and
/// `null` values are treated as empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct IncomingOrder {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IncomingLead {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CheckedOrder {
    pub name: String,
    pub telegram: String,
    pub city: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CheckedLead {
    pub name: String,
    pub phone: String,
    pub email: String,
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

pub fn check_order(order: &IncomingOrder) -> Result<CheckedOrder, ApiError> {
    let name = trimmed(&order.name);
    let telegram = trimmed(&order.telegram);
    let city = trimmed(&order.city);

    if name.is_empty() || telegram.is_empty() || city.is_empty() {
        return Err(ApiError::validation(ORDER_FIELDS_REQUIRED));
    }
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ApiError::validation(NAME_TOO_SHORT));
    }
    if !telegram.starts_with('@') {
        return Err(ApiError::validation(TELEGRAM_NEEDS_AT));
    }

    Ok(CheckedOrder {
        name,
        telegram,
        city,
    })
}

pub fn check_lead(lead: &IncomingLead) -> Result<CheckedLead, ApiError> {
    let name = trimmed(&lead.name);
    let phone = trimmed(&lead.phone);
    let email = trimmed(&lead.email);

    if name.is_empty() || phone.is_empty() || email.is_empty() {
        return Err(ApiError::validation(LEAD_FIELDS_REQUIRED));
    }
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ApiError::validation(NAME_TOO_SHORT));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(ApiError::validation(INVALID_EMAIL));
    }

    Ok(CheckedLead { name, phone, email })
}

/// Renders the client's submission time for the notification. Offsets are
/// kept as sent; anything unparsable falls back to `now`.
pub fn display_time(raw: Option<&str>, now: DateTime<Utc>) -> String {
    let raw = raw.map(str::trim).unwrap_or_default();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.format(DISPLAY_TIME_FORMAT).to_string();
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return at.format(DISPLAY_TIME_FORMAT).to_string();
    }
    now.format(DISPLAY_TIME_FORMAT).to_string()
}

fn bad_request(error: ApiError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(error))
}

/// Accepts only a non-empty JSON object; anything else is "no data".
fn body_or_no_data<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, (StatusCode, Json<ApiError>)> {
    let no_data = || bad_request(ApiError::validation(NO_DATA));

    let Json(body) = payload.map_err(|rejection| {
        debug!(%rejection, "request body rejected");
        no_data()
    })?;
    let fields = match body {
        Value::Object(fields) if !fields.is_empty() => fields,
        _ => {
            debug!("request body is not a non-empty object");
            return Err(no_data());
        }
    };
    serde_json::from_value(Value::Object(fields)).map_err(|error| {
        debug!(%error, "request body fields are not strings");
        no_data()
    })
}

async fn deliver(state: &AppState, text: &str) -> bool {
    match state.notifier.send(text).await {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "telegram notification not sent");
            false
        }
    }
}

pub async fn submit_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let incoming: IncomingOrder = body_or_no_data(payload)?;
    let order = check_order(&incoming).map_err(bad_request)?;
    let time = display_time(incoming.timestamp.as_deref(), Utc::now());

    let telegram_sent = deliver(
        &state,
        &order_message(&order.name, &order.telegram, &order.city, &time),
    )
    .await;
    info!(
        name = %order.name,
        telegram = %order.telegram,
        city = %order.city,
        %time,
        telegram_sent,
        "new order"
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: ORDER_ACCEPTED.into(),
        telegram_sent,
    }))
}

pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<SubmitResponse> {
    let incoming: IncomingLead = body_or_no_data(payload)?;
    let lead = check_lead(&incoming).map_err(bad_request)?;
    let time = display_time(incoming.timestamp.as_deref(), Utc::now());

    let telegram_sent = deliver(
        &state,
        &lead_message(&lead.name, &lead.phone, &lead.email, &time),
    )
    .await;
    info!(name = %lead.name, phone = %lead.phone, email = %lead.email, %time, telegram_sent, "new lead");

    Ok(Json(SubmitResponse {
        success: true,
        message: LEAD_ACCEPTED.into(),
        telegram_sent,
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        telegram_configured: state.notifier.is_configured(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
