pub const MIN_WITHDRAWAL: i64 = 100;
pub const RECENT_TRANSACTIONS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WithdrawalError {
    #[error("Invalid amount")]
    NonPositive,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Minimum withdrawal amount is ₹{MIN_WITHDRAWAL}")]
    BelowMinimum,
}

/// Checks a withdrawal of `amount` against the current `balance`.
pub fn check_withdrawal(balance: i64, amount: i64) -> Result<(), WithdrawalError> {
    if amount <= 0 {
        return Err(WithdrawalError::NonPositive);
    }
    if balance < amount {
        return Err(WithdrawalError::InsufficientBalance);
    }
    if amount < MIN_WITHDRAWAL {
        return Err(WithdrawalError::BelowMinimum);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_negative() {
        assert_eq!(check_withdrawal(1_000, 0), Err(WithdrawalError::NonPositive));
        assert_eq!(check_withdrawal(1_000, -5), Err(WithdrawalError::NonPositive));
    }

    #[test]
    fn balance_is_checked_before_minimum() {
        assert_eq!(
            check_withdrawal(50, 80),
            Err(WithdrawalError::InsufficientBalance)
        );
        assert_eq!(check_withdrawal(500, 80), Err(WithdrawalError::BelowMinimum));
    }

    #[test]
    fn allows_exact_balance() {
        assert_eq!(check_withdrawal(250, 250), Ok(()));
        assert_eq!(check_withdrawal(250, MIN_WITHDRAWAL), Ok(()));
    }

    #[test]
    fn minimum_message_names_the_amount() {
        assert_eq!(
            WithdrawalError::BelowMinimum.to_string(),
            "Minimum withdrawal amount is ₹100"
        );
    }
}
