//! Errors raised by account operations.

use thiserror::Error;

/// Reasons an account operation is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// Deposits and withdrawals must move a positive amount.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),
    /// A withdrawal would overdraw the account.
    #[error("cannot withdraw {requested} from a balance of {balance}")]
    InsufficientFunds {
        /// Balance at the time of the request.
        balance: i64,
        /// Amount that was requested.
        requested: i64,
    },
    /// The account no longer accepts withdrawals.
    #[error("account is frozen")]
    Frozen,
}
