//! Payment provider seam.
//!
//! Handlers talk to [`PaymentGateway`]; production wires in [`RazorpayGateway`].
//! Amounts cross this boundary in rupees and are converted to paise on the wire.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Paise.
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
    /// Paise.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub method: Option<String>,
}

impl GatewayPayment {
    /// Authorized payments must be captured before the funds settle.
    pub fn needs_capture(&self) -> bool {
        self.status == "authorized"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRefund {
    pub id: String,
    pub payment_id: String,
    /// Paise.
    pub amount: i64,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("gateway responded {status}: {body}")]
    Api { status: u16, body: String },

    #[error("amount {0} does not fit in paise")]
    Amount(i64),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key handed to the checkout widget.
    fn key_id(&self) -> &str;

    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        notes: serde_json::Value,
    ) -> Result<GatewayOrder, GatewayError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;

    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
    ) -> Result<GatewayPayment, GatewayError>;

    /// Full refund when `amount` is `None`.
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<i64>,
    ) -> Result<GatewayRefund, GatewayError>;
}

pub fn to_paise(rupees: i64) -> Result<i64, GatewayError> {
    rupees.checked_mul(100).ok_or(GatewayError::Amount(rupees))
}

pub fn to_rupees(paise: i64) -> i64 {
    paise / 100
}

pub struct RazorpayGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(cfg: &crate::config::RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            key_id: cfg.key_id.clone(),
            key_secret: cfg.key_secret.clone(),
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let resp = req
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<T>().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        notes: serde_json::Value,
    ) -> Result<GatewayOrder, GatewayError> {
        let paise = to_paise(amount)?;
        let body = json!({
            "amount": paise,
            "currency": CURRENCY,
            "receipt": receipt,
            "notes": notes,
        });
        self.send(self.client.post(self.url("orders")).json(&body))
            .await
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        self.send(self.client.get(self.url(&format!("payments/{payment_id}"))))
            .await
    }

    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
    ) -> Result<GatewayPayment, GatewayError> {
        let paise = to_paise(amount)?;
        let body = json!({ "amount": paise, "currency": CURRENCY });
        self.send(
            self.client
                .post(self.url(&format!("payments/{payment_id}/capture")))
                .json(&body),
        )
        .await
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<i64>,
    ) -> Result<GatewayRefund, GatewayError> {
        let body = match amount {
            Some(rupees) => {
                let paise = to_paise(rupees)?;
                json!({ "amount": paise })
            }
            None => json!({}),
        };
        self.send(
            self.client
                .post(self.url(&format!("payments/{payment_id}/refund")))
                .json(&body),
        )
        .await
    }
}

/// In-memory gateway that approves everything.
#[cfg(test)]
pub struct FakeGateway;

#[cfg(test)]
#[async_trait]
impl PaymentGateway for FakeGateway {
    fn key_id(&self) -> &str {
        "rzp_test_fake"
    }

    async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        _notes: serde_json::Value,
    ) -> Result<GatewayOrder, GatewayError> {
        Ok(GatewayOrder {
            id: format!("order_{receipt}"),
            amount: to_paise(amount)?,
            currency: CURRENCY.into(),
            receipt: Some(receipt.into()),
            status: "created".into(),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        Ok(GatewayPayment {
            id: payment_id.into(),
            order_id: None,
            amount: 0,
            currency: CURRENCY.into(),
            status: "authorized".into(),
            method: Some("upi".into()),
        })
    }

    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
    ) -> Result<GatewayPayment, GatewayError> {
        Ok(GatewayPayment {
            id: payment_id.into(),
            order_id: None,
            amount: to_paise(amount)?,
            currency: CURRENCY.into(),
            status: "captured".into(),
            method: Some("upi".into()),
        })
    }

    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Option<i64>,
    ) -> Result<GatewayRefund, GatewayError> {
        Ok(GatewayRefund {
            id: format!("rfnd_{payment_id}"),
            payment_id: payment_id.into(),
            amount: amount.map(to_paise).transpose()?.unwrap_or_default(),
            status: "processed".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_rupees_and_paise() {
        assert_eq!(to_paise(249).unwrap(), 24_900);
        assert_eq!(to_rupees(24_900), 249);
    }

    #[test]
    fn paise_conversion_refuses_overflow() {
        assert!(matches!(
            to_paise(i64::MAX / 10),
            Err(GatewayError::Amount(_))
        ));
        assert!(to_paise(i64::MAX / 100).is_ok());
    }

    #[test]
    fn only_authorized_payments_need_capture() {
        let mut p = GatewayPayment {
            id: "pay_1".into(),
            order_id: Some("order_1".into()),
            amount: 9_900,
            currency: CURRENCY.into(),
            status: "authorized".into(),
            method: None,
        };
        assert!(p.needs_capture());
        p.status = "captured".into();
        assert!(!p.needs_capture());
    }

    #[test]
    fn parses_razorpay_payment_payload() {
        let raw = r#"{
            "id": "pay_29QQoUBi66xm2f",
            "entity": "payment",
            "amount": 24900,
            "currency": "INR",
            "status": "captured",
            "order_id": "order_9A33XWu170gUtm",
            "method": "card",
            "captured": true
        }"#;
        let p: GatewayPayment = serde_json::from_str(raw).unwrap();
        assert_eq!(p.order_id.as_deref(), Some("order_9A33XWu170gUtm"));
        assert_eq!(to_rupees(p.amount), 249);
    }

    #[tokio::test]
    async fn fake_gateway_echoes_amounts_in_paise() {
        let gw = FakeGateway;
        let order = gw.create_order(99, "session_x", json!({})).await.unwrap();
        assert_eq!(order.amount, 9_900);
        assert_eq!(order.currency, "INR");
    }
}
