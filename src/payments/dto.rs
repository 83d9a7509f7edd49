use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{gateway::GatewayOrder, services::Earnings};
use crate::wallet::repo_types::Transaction;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub session_id: Uuid,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order: GatewayOrder,
    pub key_id: String,
    pub session_id: Uuid,
    #[serde(flatten)]
    pub earnings: Earnings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpay_order_id")]
    pub razorpay_order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub razorpay_payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub razorpay_signature: String,
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub session_id: Uuid,
    pub payment_id: String,
    pub transaction: Transaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub session_id: Uuid,
    pub amount: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub success: bool,
    pub refund_id: String,
    pub amount: i64,
    pub transaction: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_checkout_field_names() {
        let body: VerifyPaymentRequest = serde_json::from_value(serde_json::json!({
            "razorpay_order_id": "order_1",
            "razorpay_payment_id": "pay_1",
            "razorpay_signature": "abc",
            "sessionId": Uuid::nil(),
        }))
        .unwrap();
        assert_eq!(body.razorpay_order_id, "order_1");
        assert_eq!(body.razorpay_payment_id, "pay_1");
    }
}
