use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{
    admin, auth, contacts, crisis, discover, forums, matching, payments, professionals, ratings,
    recordings, sessions, users, wallet,
};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(users::router())
                .merge(discover::router())
                .merge(matching::router())
                .merge(sessions::router())
                .merge(ratings::router())
                .merge(wallet::router())
                .merge(payments::router())
                .merge(contacts::router())
                .merge(professionals::router())
                .merge(crisis::router())
                .merge(forums::router())
                .merge(recordings::router())
                .merge(admin::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{auth::jwt::JwtKeys, users::repo_types::Role};

    fn app() -> (Router, JwtKeys) {
        let state = AppState::fake();
        let keys = JwtKeys::from(&state.config.jwt);
        (build_app(state), keys)
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn error_of(res: axum::response::Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        v["error"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app();
        let res = app
            .oneshot(request(Method::GET, "/api/v1/health", None, None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_bearer_token() {
        for uri in [
            "/api/v1/me",
            "/api/v1/sessions",
            "/api/v1/wallet",
            "/api/v1/emergency-contacts",
            "/api/v1/crisis/intervention",
            "/api/v1/session-recordings",
            "/api/v1/forums/posts",
        ] {
            let (app, _) = app();
            let res = app.oneshot(request(Method::GET, uri, None, None)).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (app, _) = app();
        let res = app
            .oneshot(request(Method::GET, "/api/v1/wallet", Some("not-a-jwt"), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(res).await, "Invalid or expired token");
    }

    #[tokio::test]
    async fn refresh_token_cannot_call_the_api() {
        let (app, keys) = app();
        let token = keys.sign_refresh(Uuid::new_v4(), Role::TimeSeeker).unwrap();
        let res = app
            .oneshot(request(Method::GET, "/api/v1/sessions", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(res).await, "Access token required");
    }

    #[tokio::test]
    async fn admin_routes_refuse_non_staff_tokens() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4(), Role::TimeGiver).unwrap();
        let res = app
            .oneshot(request(Method::GET, "/api/v1/admin/dashboard", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_rejects_malformed_email() {
        let (app, _) = app();
        let body = json!({ "email": "nobody", "password": "longenough123" });
        let res = app
            .oneshot(request(Method::POST, "/api/v1/auth/register", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(res).await, "Invalid email");
    }

    #[tokio::test]
    async fn booking_validates_before_lookup() {
        let (app, keys) = app();
        let me = Uuid::new_v4();
        let token = keys.sign_access(me, Role::TimeSeeker).unwrap();
        let body = json!({
            "giverId": me,
            "sessionType": "OPEN_TALK",
            "duration": 30,
            "scheduledFor": "2030-01-01T10:00:00Z"
        });
        let res = app
            .oneshot(request(Method::POST, "/api/v1/sessions", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(res).await, "Cannot book a session with yourself");
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4(), Role::TimeSeeker).unwrap();
        let body = json!({ "sessionId": Uuid::new_v4(), "rating": 7 });
        let res = app
            .oneshot(request(Method::POST, "/api/v1/ratings", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn crisis_report_needs_a_description() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4(), Role::TimeSeeker).unwrap();
        let body = json!({ "severity": "HIGH", "type": "PANIC_ATTACK", "description": "  " });
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/v1/crisis/intervention",
                Some(&token),
                Some(body),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(res).await, "Description is required");
    }

    #[tokio::test]
    async fn forged_payment_signature_is_rejected() {
        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4(), Role::TimeSeeker).unwrap();
        let body = json!({
            "razorpayOrderId": "order_1",
            "razorpayPaymentId": "pay_1",
            "razorpaySignature": "deadbeef",
            "sessionId": Uuid::new_v4()
        });
        let res = app
            .oneshot(request(Method::POST, "/api/v1/payments/verify", Some(&token), Some(body)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn order_amount_above_the_limit_is_rejected() {
        use crate::payments::services::MAX_ORDER_AMOUNT;

        let (app, keys) = app();
        let token = keys.sign_access(Uuid::new_v4(), Role::TimeSeeker).unwrap();
        for amount in [MAX_ORDER_AMOUNT + 1, i64::MAX] {
            let body = json!({ "sessionId": Uuid::new_v4(), "amount": amount });
            let res = app
                .clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/payments/create-order",
                    Some(&token),
                    Some(body),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_of(res).await, "Amount exceeds the order limit");
        }
    }
}
