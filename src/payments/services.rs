use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::gateway::{to_paise, GatewayPayment};
use crate::sessions::repo_types::PaymentStatus;

/// Largest single order in rupees.
pub const MAX_ORDER_AMOUNT: i64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    pub platform_fee: i64,
    pub giver_earnings: i64,
}

/// Splits `amount` into the platform's rounded cut and the giver's remainder.
/// `None` when the amount is too large to split.
pub fn calculate_earnings(amount: i64, fee_percent: u8) -> Option<Earnings> {
    let scaled = amount.checked_mul(i64::from(fee_percent))?;
    // half-up rounding, symmetric for negative amounts
    let platform_fee = scaled.checked_abs()?.checked_add(50)? / 100 * scaled.signum();
    Some(Earnings {
        platform_fee,
        giver_earnings: amount - platform_fee,
    })
}

pub fn check_order_amount(amount: i64) -> Result<(), &'static str> {
    if amount <= 0 {
        return Err("Amount must be positive");
    }
    if amount > MAX_ORDER_AMOUNT {
        return Err("Amount exceeds the order limit");
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("Session payment is already settled")]
    AlreadySettled,

    #[error("Payment does not match this session")]
    Mismatch,
}

/// A payment settles a session only once, and only when the gateway
/// reports it against the session's own order for the full amount.
pub fn check_settlement(
    status: PaymentStatus,
    session_order: Option<&str>,
    payment: &GatewayPayment,
    amount: i64,
) -> Result<(), VerifyError> {
    if status != PaymentStatus::Pending {
        return Err(VerifyError::AlreadySettled);
    }
    match (session_order, payment.order_id.as_deref()) {
        (Some(ours), Some(theirs)) if ours == theirs => {}
        _ => return Err(VerifyError::Mismatch),
    }
    match to_paise(amount) {
        Ok(paise) if paise == payment.amount => Ok(()),
        _ => Err(VerifyError::Mismatch),
    }
}

/// Hex HMAC-SHA256 over `order_id|payment_id`.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a checkout signature in constant time.
pub fn verify_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let expected = sign(order_id, payment_id, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_default_fee() {
        assert_eq!(
            calculate_earnings(249, 20),
            Some(Earnings {
                platform_fee: 50,
                giver_earnings: 199
            })
        );
        assert_eq!(
            calculate_earnings(1000, 20),
            Some(Earnings {
                platform_fee: 200,
                giver_earnings: 800
            })
        );
    }

    #[test]
    fn rounds_half_up() {
        // 99 * 20% = 19.8
        assert_eq!(calculate_earnings(99, 20).unwrap().platform_fee, 20);
        // 5 * 10% = 0.5
        assert_eq!(calculate_earnings(5, 10).unwrap().platform_fee, 1);
        // 4 * 10% = 0.4
        assert_eq!(calculate_earnings(4, 10).unwrap().platform_fee, 0);
    }

    #[test]
    fn fee_and_earnings_always_sum_to_amount() {
        for amount in [0, 1, 99, 249, 399, 12_345] {
            for pct in [0, 15, 20, 33, 100] {
                let e = calculate_earnings(amount, pct).unwrap();
                assert_eq!(e.platform_fee + e.giver_earnings, amount);
            }
        }
    }

    #[test]
    fn huge_amounts_do_not_overflow() {
        assert_eq!(calculate_earnings(i64::MAX / 10, 20), None);
        let top = calculate_earnings(MAX_ORDER_AMOUNT, 100).unwrap();
        assert_eq!(top.platform_fee, MAX_ORDER_AMOUNT);
        assert_eq!(top.giver_earnings, 0);
    }

    #[test]
    fn order_amount_bounds() {
        assert!(check_order_amount(1).is_ok());
        assert!(check_order_amount(MAX_ORDER_AMOUNT).is_ok());
        assert!(check_order_amount(MAX_ORDER_AMOUNT + 1).is_err());
        assert!(check_order_amount(0).is_err());
        assert!(check_order_amount(i64::MAX).is_err());
    }

    fn captured(order_id: &str, paise: i64) -> GatewayPayment {
        GatewayPayment {
            id: "pay_1".into(),
            order_id: Some(order_id.into()),
            amount: paise,
            currency: "INR".into(),
            status: "captured".into(),
            method: None,
        }
    }

    #[test]
    fn settles_pending_session_with_matching_payment() {
        let p = captured("order_1", 24_900);
        assert_eq!(check_settlement(PaymentStatus::Pending, Some("order_1"), &p, 249), Ok(()));
    }

    #[test]
    fn refunded_or_paid_sessions_cannot_settle_again() {
        let p = captured("order_1", 24_900);
        for status in [PaymentStatus::Paid, PaymentStatus::Refunded, PaymentStatus::Failed] {
            assert_eq!(
                check_settlement(status, Some("order_1"), &p, 249),
                Err(VerifyError::AlreadySettled)
            );
        }
    }

    #[test]
    fn payment_for_another_order_or_amount_is_refused() {
        let p = captured("order_1", 24_900);
        assert_eq!(
            check_settlement(PaymentStatus::Pending, Some("order_2"), &p, 249),
            Err(VerifyError::Mismatch)
        );
        assert_eq!(
            check_settlement(PaymentStatus::Pending, Some("order_1"), &p, 399),
            Err(VerifyError::Mismatch)
        );
        let mut orphan = p.clone();
        orphan.order_id = None;
        assert_eq!(
            check_settlement(PaymentStatus::Pending, Some("order_1"), &orphan, 249),
            Err(VerifyError::Mismatch)
        );
        // no order was ever created for the session
        assert_eq!(
            check_settlement(PaymentStatus::Pending, None, &p, 249),
            Err(VerifyError::Mismatch)
        );
    }

    #[test]
    fn signs_as_lowercase_hex_sha256() {
        let sig = sign("order_1", "pay_1", "secret");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        assert!(verify_signature("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn rejects_tampered_inputs() {
        let sig = sign("order_1", "pay_1", "secret");
        assert!(!verify_signature("order_2", "pay_1", &sig, "secret"));
        assert!(!verify_signature("order_1", "pay_2", &sig, "secret"));
        assert!(!verify_signature("order_1", "pay_1", &sig, "other"));
        assert!(!verify_signature("order_1", "pay_1", &sig[..63], "secret"));
        assert!(!verify_signature("order_1", "pay_1", "", "secret"));
    }

    #[test]
    fn separator_is_part_of_the_message() {
        assert_ne!(sign("ab", "c", "k"), sign("a", "bc", "k"));
    }
}
