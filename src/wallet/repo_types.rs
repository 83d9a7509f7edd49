use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    SessionPayment,
    EarningsCredit,
    Withdrawal,
    Refund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

/// Balances shown for a user that has no wallet row yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub balance: i64,
    pub total_earned: i64,
    pub total_withdrawn: i64,
}

impl From<&Wallet> for Balances {
    fn from(w: &Wallet) -> Self {
        Self {
            balance: w.balance,
            total_earned: w.total_earned,
            total_withdrawn: w.total_withdrawn,
        }
    }
}

/// A signed ledger entry: credits positive, debits negative.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Option<Uuid>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewTransaction<'a> {
    pub user_id: Uuid,
    pub session_id: Option<Uuid>,
    pub kind: TransactionType,
    pub amount: i64,
    pub status: TransactionStatus,
    pub payment_method: Option<&'a str>,
    pub payment_id: Option<&'a str>,
    pub description: String,
    pub metadata: Option<serde_json::Value>,
}
