use std::sync::Arc;

use super::*;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct Recorded {
    content_type: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    reply: &'static str,
    tx: Arc<Mutex<Option<oneshot::Sender<Recorded>>>>,
}

async fn handle_order(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(Recorded { content_type, body });
    }
    (state.status, state.reply)
}

async fn spawn_order_server(
    status: StatusCode,
    reply: &'static str,
) -> (String, oneshot::Receiver<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        status,
        reply,
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/api/submit-order", post(handle_order))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

fn anna_order() -> OrderRequest {
    OrderRequest {
        name: "Anna".into(),
        telegram: "@anna99".into(),
        city: "Minsk".into(),
        timestamp: "2024-05-01T10:15:00.000Z".into(),
    }
}

#[test]
fn endpoint_is_joined_onto_the_base_url() {
    let transport = HttpOrderTransport::new("http://localhost:5001").expect("transport");
    assert_eq!(
        transport.endpoint().as_str(),
        "http://localhost:5001/api/submit-order"
    );

    let nested = HttpOrderTransport::new("https://shop.example/landing/").expect("transport");
    assert_eq!(
        nested.endpoint().as_str(),
        "https://shop.example/api/submit-order"
    );
}

#[test]
fn malformed_base_url_is_rejected() {
    assert!(matches!(
        HttpOrderTransport::new("not a url"),
        Err(TransportError::Endpoint(_))
    ));
}

#[tokio::test]
async fn posts_json_with_wire_field_names() {
    let (base, recorded) = spawn_order_server(StatusCode::OK, r#"{"success":true}"#).await;
    let transport = HttpOrderTransport::new(&base).expect("transport");

    let outcome = transport.submit_order(&anna_order()).await.expect("outcome");
    assert_eq!(outcome, SubmitOutcome::Accepted);

    let recorded = recorded.await.expect("request recorded");
    assert_eq!(recorded.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        recorded.body,
        serde_json::json!({
            "name": "Anna",
            "telegram": "@anna99",
            "city": "Minsk",
            "timestamp": "2024-05-01T10:15:00.000Z",
        })
    );
}

#[tokio::test]
async fn any_2xx_is_accepted_without_reading_the_body() {
    let (base, _recorded) = spawn_order_server(StatusCode::CREATED, "not json").await;
    let transport = HttpOrderTransport::new(&base).expect("transport");
    let outcome = transport.submit_order(&anna_order()).await.expect("outcome");
    assert_eq!(outcome, SubmitOutcome::Accepted);
}

#[tokio::test]
async fn rejection_carries_the_backend_message() {
    let (base, _recorded) = spawn_order_server(
        StatusCode::BAD_REQUEST,
        r#"{"success":false,"message":"city not served"}"#,
    )
    .await;
    let transport = HttpOrderTransport::new(&base).expect("transport");
    let outcome = transport.submit_order(&anna_order()).await.expect("outcome");
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            status: 400,
            message: Some("city not served".into()),
        }
    );
}

#[tokio::test]
async fn rejection_with_unparsable_body_has_no_message() {
    let (base, _recorded) =
        spawn_order_server(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").await;
    let transport = HttpOrderTransport::new(&base).expect("transport");
    let outcome = transport.submit_order(&anna_order()).await.expect("outcome");
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            status: 500,
            message: None,
        }
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport = HttpOrderTransport::new(&format!("http://{addr}")).expect("transport");
    let err = transport
        .submit_order(&anna_order())
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn missing_transport_always_fails() {
    let err = MissingOrderTransport
        .submit_order(&anna_order())
        .await
        .expect_err("unavailable");
    assert!(matches!(err, TransportError::Unavailable(_)));
}
