use serde::{Deserialize, Serialize};

use super::repo_types::{Balances, Transaction, Wallet};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    #[serde(flatten)]
    pub balances: Balances,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub amount: i64,
    pub bank_details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub success: bool,
    pub transaction: Transaction,
    pub wallet: Wallet,
    pub message: &'static str,
}
