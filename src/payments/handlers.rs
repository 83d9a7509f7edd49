use axum::{extract::State, routing::post, Json, Router};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{
        CreateOrderRequest, CreateOrderResponse, RefundRequest, RefundResponse,
        VerifyPaymentRequest, VerifyPaymentResponse,
    },
    gateway::{to_rupees, GatewayError},
    services::{
        calculate_earnings, check_order_amount, check_settlement, verify_signature, VerifyError,
    },
};
use crate::{
    admin,
    auth::extractors::{AdminUser, AuthUser},
    error::{ApiError, ApiResult},
    sessions::{self, repo_types::PaymentStatus},
    state::AppState,
    wallet::{
        repo as wallet_repo,
        repo_types::{NewTransaction, TransactionStatus, TransactionType},
    },
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/payments/create-order", post(create_order))
        .route("/payments/verify", post(verify_payment))
        .route("/payments/refund", post(refund_payment))
}

fn upstream(msg: &'static str) -> impl FnOnce(GatewayError) -> ApiError {
    move |e| {
        error!(error = %e, "{msg}");
        ApiError::Upstream(msg.to_string())
    }
}

#[instrument(skip(state, body))]
pub async fn create_order(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    check_order_amount(body.amount).map_err(ApiError::bad_request)?;

    let session = sessions::repo::find_by_id(&state.db, body.session_id)
        .await?
        .filter(|s| s.seeker_id == caller.id && s.payment_status == PaymentStatus::Pending)
        .ok_or_else(|| ApiError::not_found("Session not found or already paid"))?;

    let earnings = calculate_earnings(body.amount, state.config.platform_fee_percent)
        .ok_or_else(|| ApiError::bad_request("Amount exceeds the order limit"))?;
    let order = state
        .payments
        .create_order(
            body.amount,
            &format!("session_{}", session.id),
            json!({
                "sessionId": session.id,
                "seekerId": session.seeker_id,
                "giverId": session.giver_id,
            }),
        )
        .await
        .map_err(upstream("Failed to create payment order"))?;

    sessions::repo::set_pricing(
        &state.db,
        session.id,
        &order.id,
        body.amount,
        earnings.platform_fee,
        earnings.giver_earnings,
    )
    .await?;

    info!(
        session_id = %session.id,
        order_id = %order.id,
        amount = body.amount,
        platform_fee = earnings.platform_fee,
        "payment order created"
    );
    Ok(Json(CreateOrderResponse {
        order,
        key_id: state.payments.key_id().to_string(),
        session_id: session.id,
        earnings,
    }))
}

#[instrument(skip(state, body))]
pub async fn verify_payment(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<VerifyPaymentRequest>,
) -> ApiResult<Json<VerifyPaymentResponse>> {
    if !verify_signature(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
        &state.config.razorpay.key_secret,
    ) {
        warn!(
            user_id = %caller.id,
            order_id = %body.razorpay_order_id,
            "payment signature mismatch"
        );
        return Err(ApiError::bad_request("Invalid payment signature"));
    }

    let session = sessions::repo::find_by_id(&state.db, body.session_id)
        .await?
        .filter(|s| s.seeker_id == caller.id)
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    let mut payment = state
        .payments
        .fetch_payment(&body.razorpay_payment_id)
        .await
        .map_err(upstream("Failed to fetch payment"))?;
    check_settlement(
        session.payment_status,
        session.order_id.as_deref(),
        &payment,
        session.amount,
    )
    .map_err(|e| match e {
        VerifyError::AlreadySettled => ApiError::conflict(e.to_string()),
        VerifyError::Mismatch => {
            warn!(session_id = %session.id, payment_id = %payment.id, "payment mismatch");
            ApiError::bad_request(e.to_string())
        }
    })?;
    if payment.needs_capture() {
        payment = state
            .payments
            .capture_payment(&payment.id, session.amount)
            .await
            .map_err(upstream("Failed to capture payment"))?;
    }

    let mut tx = state.db.begin().await?;
    let settled = sessions::repo::set_payment_tx(
        &mut tx,
        session.id,
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        &payment.id,
    )
    .await?;
    if !settled {
        return Err(ApiError::conflict("Session payment is already settled"));
    }

    let transaction = wallet_repo::insert_transaction_tx(
        &mut tx,
        &NewTransaction {
            user_id: session.seeker_id,
            session_id: Some(session.id),
            kind: TransactionType::SessionPayment,
            amount: session.amount,
            status: TransactionStatus::Completed,
            payment_method: payment.method.as_deref(),
            payment_id: Some(payment.id.as_str()),
            description: format!("Payment for {} minute session", session.duration),
            metadata: Some(json!({
                "orderId": body.razorpay_order_id,
                "gatewayStatus": payment.status,
            })),
        },
    )
    .await?;

    wallet_repo::credit_earnings_tx(&mut tx, session.giver_id, session.giver_earnings).await?;
    wallet_repo::insert_transaction_tx(
        &mut tx,
        &NewTransaction {
            user_id: session.giver_id,
            session_id: Some(session.id),
            kind: TransactionType::EarningsCredit,
            amount: session.giver_earnings,
            status: TransactionStatus::Completed,
            payment_method: None,
            payment_id: Some(payment.id.as_str()),
            description: "Session earnings".to_string(),
            metadata: Some(json!({ "platformFee": session.platform_fee })),
        },
    )
    .await?;
    tx.commit().await?;

    info!(
        session_id = %session.id,
        payment_id = %payment.id,
        amount = session.amount,
        giver_earnings = session.giver_earnings,
        "payment verified"
    );
    Ok(Json(VerifyPaymentResponse {
        success: true,
        session_id: session.id,
        payment_id: payment.id,
        transaction,
    }))
}

#[instrument(skip(state, body))]
pub async fn refund_payment(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<RefundRequest>,
) -> ApiResult<Json<RefundResponse>> {
    admin.require_admin()?;
    if matches!(body.amount, Some(a) if a <= 0) {
        return Err(ApiError::bad_request("Amount must be positive"));
    }

    let session = sessions::repo::find_by_id(&state.db, body.session_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    let payment_id = match (&session.payment_status, &session.payment_id) {
        (PaymentStatus::Paid, Some(id)) => id.clone(),
        _ => return Err(ApiError::bad_request("Session has no captured payment")),
    };
    if matches!(body.amount, Some(a) if a > session.amount) {
        return Err(ApiError::bad_request("Refund exceeds the session amount"));
    }

    let refund = state
        .payments
        .refund_payment(&payment_id, body.amount)
        .await
        .map_err(upstream("Failed to refund payment"))?;
    let refunded = body.amount.unwrap_or(session.amount);

    let mut tx = state.db.begin().await?;
    let refunded_now = sessions::repo::set_payment_tx(
        &mut tx,
        session.id,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
        &payment_id,
    )
    .await?;
    if !refunded_now {
        return Err(ApiError::conflict("Session payment is already refunded"));
    }
    let transaction = wallet_repo::insert_transaction_tx(
        &mut tx,
        &NewTransaction {
            user_id: session.seeker_id,
            session_id: Some(session.id),
            kind: TransactionType::Refund,
            amount: refunded,
            status: TransactionStatus::Completed,
            payment_method: None,
            payment_id: Some(payment_id.as_str()),
            description: "Session refund".to_string(),
            metadata: Some(json!({
                "refundId": refund.id,
                "gatewayAmount": to_rupees(refund.amount),
            })),
        },
    )
    .await?;
    tx.commit().await?;

    admin::repo::log_admin_action(
        &state.db,
        admin.id,
        "REFUND_PAYMENT",
        "session",
        Some(session.id),
        &format!("Refunded ₹{refunded} for session {}", session.id),
        json!({ "refundId": refund.id, "paymentId": payment_id }),
    )
    .await?;

    info!(session_id = %session.id, refund_id = %refund.id, amount = refunded, "payment refunded");
    Ok(Json(RefundResponse {
        success: true,
        refund_id: refund.id,
        amount: refunded,
        transaction,
    }))
}
