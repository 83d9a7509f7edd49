use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction as DbTx};
use uuid::Uuid;

use super::repo_types::{NewTransaction, Transaction, Wallet};

const WALLET_COLUMNS: &str =
    "id, user_id, balance, total_earned, total_withdrawn, last_updated";

const TRANSACTION_COLUMNS: &str = r#"
    id, user_id, session_id, type, amount, status, payment_method,
    payment_id, description, metadata, created_at
"#;

pub async fn find_wallet(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Wallet>> {
    let sql = format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1");
    let wallet = sqlx::query_as::<_, Wallet>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("find wallet")?;
    Ok(wallet)
}

pub async fn recent_transactions(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> anyhow::Result<Vec<Transaction>> {
    let sql = format!(
        r#"
        SELECT {TRANSACTION_COLUMNS}
          FROM transactions
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2
        "#
    );
    let rows = sqlx::query_as::<_, Transaction>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("recent transactions")?;
    Ok(rows)
}

pub async fn insert_transaction_tx(
    tx: &mut DbTx<'_, Postgres>,
    new: &NewTransaction<'_>,
) -> anyhow::Result<Transaction> {
    let sql = format!(
        r#"
        INSERT INTO transactions
            (user_id, session_id, type, amount, status, payment_method, payment_id, description, metadata)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {TRANSACTION_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, Transaction>(&sql)
        .bind(new.user_id)
        .bind(new.session_id)
        .bind(new.kind)
        .bind(new.amount)
        .bind(new.status)
        .bind(new.payment_method)
        .bind(new.payment_id)
        .bind(&new.description)
        .bind(&new.metadata)
        .fetch_one(&mut **tx)
        .await
        .context("insert transaction")?;
    Ok(row)
}

/// Creates the wallet on first credit; otherwise adds to it in place.
pub async fn credit_earnings_tx(
    tx: &mut DbTx<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
) -> anyhow::Result<Wallet> {
    let sql = format!(
        r#"
        INSERT INTO wallets (user_id, balance, total_earned)
        VALUES ($1, $2, $2)
        ON CONFLICT (user_id) DO UPDATE SET
            balance      = wallets.balance + EXCLUDED.balance,
            total_earned = wallets.total_earned + EXCLUDED.total_earned,
            last_updated = now()
        RETURNING {WALLET_COLUMNS}
        "#
    );
    let wallet = sqlx::query_as::<_, Wallet>(&sql)
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut **tx)
        .await
        .context("credit wallet")?;
    Ok(wallet)
}

/// Debits a withdrawal; `None` when the balance no longer covers it.
pub async fn debit_withdrawal_tx(
    tx: &mut DbTx<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
) -> anyhow::Result<Option<Wallet>> {
    let sql = format!(
        r#"
        UPDATE wallets SET
            balance         = balance - $2,
            total_withdrawn = total_withdrawn + $2,
            last_updated    = now()
        WHERE user_id = $1 AND balance >= $2
        RETURNING {WALLET_COLUMNS}
        "#
    );
    let wallet = sqlx::query_as::<_, Wallet>(&sql)
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await
        .context("debit wallet")?;
    Ok(wallet)
}

/// Gross amount of completed session payments.
pub async fn completed_revenue(db: &PgPool) -> anyhow::Result<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT SUM(amount)::BIGINT
          FROM transactions
         WHERE status = 'COMPLETED' AND type = 'SESSION_PAYMENT'
        "#,
    )
    .fetch_one(db)
    .await
    .context("completed revenue")?;
    Ok(total.unwrap_or(0))
}
