//! The account under test.

use crate::AccountError;

/// A single-currency account holding a whole number of cents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    balance: i64,
    frozen: bool,
}

impl Account {
    /// Opens an account holding `balance`.
    #[must_use]
    pub const fn with_balance(balance: i64) -> Self {
        Self {
            balance,
            frozen: false,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.balance
    }

    /// Whether withdrawals are blocked.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Adds `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NonPositiveAmount`] unless `amount` is
    /// positive.
    pub const fn deposit(&mut self, amount: i64) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::NonPositiveAmount(amount));
        }
        self.balance += amount;
        Ok(())
    }

    /// Removes `amount` from the balance.
    ///
    /// # Errors
    ///
    /// Fails when the amount is not positive, the account is frozen or the
    /// balance does not cover the amount.
    pub const fn withdraw(&mut self, amount: i64) -> Result<(), AccountError> {
        if amount <= 0 {
            return Err(AccountError::NonPositiveAmount(amount));
        }
        if self.frozen {
            return Err(AccountError::Frozen);
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Blocks further withdrawals.
    pub const fn freeze(&mut self) {
        self.frozen = true;
    }
}
