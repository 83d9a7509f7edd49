use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::{
    dto::{WalletResponse, WithdrawRequest, WithdrawResponse},
    repo,
    repo_types::{Balances, NewTransaction, TransactionStatus, TransactionType},
    services::{check_withdrawal, WithdrawalError, RECENT_TRANSACTIONS},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/wallet", get(get_wallet))
        .route("/wallet/withdraw", post(withdraw))
}

#[instrument(skip(state))]
pub async fn get_wallet(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<WalletResponse>> {
    let wallet = repo::find_wallet(&state.db, caller.id).await?;
    let transactions = repo::recent_transactions(&state.db, caller.id, RECENT_TRANSACTIONS).await?;
    Ok(Json(WalletResponse {
        balances: wallet.as_ref().map(Balances::from).unwrap_or_default(),
        transactions,
    }))
}

#[instrument(skip(state, body))]
pub async fn withdraw(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<WithdrawRequest>,
) -> ApiResult<Json<WithdrawResponse>> {
    if body.amount <= 0 {
        return Err(ApiError::bad_request(WithdrawalError::NonPositive.to_string()));
    }
    let balance = repo::find_wallet(&state.db, caller.id)
        .await?
        .map_or(0, |w| w.balance);
    check_withdrawal(balance, body.amount).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mut tx = state.db.begin().await?;
    let transaction = repo::insert_transaction_tx(
        &mut tx,
        &NewTransaction {
            user_id: caller.id,
            session_id: None,
            kind: TransactionType::Withdrawal,
            amount: -body.amount,
            status: TransactionStatus::Pending,
            payment_method: Some("bank_transfer"),
            payment_id: None,
            description: format!("Withdrawal of ₹{}", body.amount),
            metadata: Some(json!({ "bankDetails": body.bank_details })),
        },
    )
    .await?;

    let Some(wallet) = repo::debit_withdrawal_tx(&mut tx, caller.id, body.amount).await? else {
        warn!(user_id = %caller.id, amount = body.amount, "balance changed during withdrawal");
        return Err(ApiError::bad_request(
            WithdrawalError::InsufficientBalance.to_string(),
        ));
    };
    tx.commit().await?;

    info!(
        user_id = %caller.id,
        amount = body.amount,
        transaction_id = %transaction.id,
        "withdrawal requested"
    );
    Ok(Json(WithdrawResponse {
        success: true,
        transaction,
        wallet,
        message: "Withdrawal request submitted successfully",
    }))
}
