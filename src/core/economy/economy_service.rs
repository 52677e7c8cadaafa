// Economy core: currency amounts, stake checks and balance movements.
//
// Balances live on the user record in the external store. Every movement is a
// single signed increment; deductions are negative increments.

use crate::core::profiles::{Counter, StoreError, UserRecord, UserStore};
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Missing amount")]
    Missing,

    #[error("`{0}` is not a valid amount")]
    Invalid(String),
}

/// Why a stake or transfer amount was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    #[error("Invalid bet")]
    Invalid,

    #[error("You have insufficient balance of :dollar: {balance}")]
    Insufficient { balance: i64 },
}

// ============================================================================
// AMOUNT PARSING
// ============================================================================

/// Parse a user-typed currency amount against the user's current balance.
///
/// `a`/`all` is the whole balance, `h`/`half` is half of it rounded up, and
/// anything else must be a non-negative whole number.
pub fn parse_currency_amount(balance: i64, raw: Option<&str>) -> Result<i64, AmountError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return Err(AmountError::Missing);
    };

    match raw.to_ascii_lowercase().as_str() {
        "a" | "all" => Ok(balance),
        "h" | "half" => Ok(balance.div_euclid(2) + balance.rem_euclid(2)),
        _ => raw
            .parse::<i64>()
            .ok()
            .filter(|amount| *amount >= 0)
            .ok_or_else(|| AmountError::Invalid(raw.to_string())),
    }
}

/// Validate a wager. Checked in order: unparseable, more than the balance,
/// zero. Nothing is written to the store before this passes.
pub fn check_stake(balance: i64, amount: Option<i64>) -> Result<i64, BetError> {
    let amount = amount.ok_or(BetError::Invalid)?;
    if amount > balance {
        return Err(BetError::Insufficient { balance });
    }
    if amount == 0 {
        return Err(BetError::Invalid);
    }
    Ok(amount)
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct EconomyService {
    store: Arc<dyn UserStore>,
    /// Account that may spend more than it holds and is never debited.
    exempt_user: Option<u64>,
}

impl EconomyService {
    pub fn new(store: Arc<dyn UserStore>, exempt_user: Option<u64>) -> Self {
        Self { store, exempt_user }
    }

    pub fn is_exempt(&self, user_id: u64) -> bool {
        self.exempt_user == Some(user_id)
    }

    /// Check a transfer amount against the sender's record.
    pub fn check_transfer(&self, sender: &UserRecord, amount: i64) -> Result<i64, BetError> {
        if amount <= 0 {
            return Err(BetError::Invalid);
        }
        if !self.is_exempt(sender.id) && amount > sender.balance {
            return Err(BetError::Insufficient {
                balance: sender.balance,
            });
        }
        Ok(amount)
    }

    /// Move `amount` from one user to another: one decrement for the sender
    /// (skipped for the exempt account) and one increment for the recipient.
    pub async fn transfer(&self, from: u64, to: u64, amount: i64) -> Result<(), StoreError> {
        if !self.is_exempt(from) {
            self.store
                .increment(from, Counter::Balance, -amount)
                .await?;
            tracing::info!(user_id = from, "Deducted {} from balance", amount);
        }
        self.store.increment(to, Counter::Balance, amount).await?;
        tracing::info!(user_id = to, "Added {} to balance", amount);
        Ok(())
    }

    /// Apply a signed balance change. A zero delta makes no store call.
    pub async fn credit(&self, user_id: u64, delta: i64) -> Result<(), StoreError> {
        if delta == 0 {
            return Ok(());
        }
        self.store
            .increment(user_id, Counter::Balance, delta)
            .await
            .map_err(|e| {
                tracing::error!(user_id, "Failed to change balance by {}: {}", delta, e);
                e
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingStore, StoreOp};

    #[test]
    fn amounts_accept_keywords_and_whole_numbers() {
        assert_eq!(parse_currency_amount(500, Some("all")), Ok(500));
        assert_eq!(parse_currency_amount(500, Some("A")), Ok(500));
        assert_eq!(parse_currency_amount(501, Some("half")), Ok(251));
        assert_eq!(parse_currency_amount(500, Some("h")), Ok(250));
        assert_eq!(parse_currency_amount(500, Some("42")), Ok(42));
        assert_eq!(parse_currency_amount(500, Some("0")), Ok(0));
    }

    #[test]
    fn amounts_reject_negatives_and_garbage() {
        assert_eq!(
            parse_currency_amount(500, Some("-5")),
            Err(AmountError::Invalid("-5".into()))
        );
        assert_eq!(
            parse_currency_amount(500, Some("lots")),
            Err(AmountError::Invalid("lots".into()))
        );
        assert_eq!(parse_currency_amount(500, None), Err(AmountError::Missing));
    }

    #[test]
    fn stakes_are_checked_in_order() {
        assert_eq!(check_stake(100, None), Err(BetError::Invalid));
        assert_eq!(
            check_stake(100, Some(101)),
            Err(BetError::Insufficient { balance: 100 })
        );
        assert_eq!(check_stake(100, Some(0)), Err(BetError::Invalid));
        assert_eq!(check_stake(100, Some(100)), Ok(100));
        // An empty wallet betting nothing is told the bet is invalid.
        assert_eq!(check_stake(0, Some(0)), Err(BetError::Invalid));
    }

    #[test]
    fn transfers_respect_the_exempt_account() {
        let store = Arc::new(RecordingStore::default());
        let economy = EconomyService::new(store, Some(7));
        let mut poor = UserRecord::new(1);
        poor.balance = 10;
        let mut exempt = UserRecord::new(7);
        exempt.balance = 0;

        assert_eq!(
            economy.check_transfer(&poor, 11),
            Err(BetError::Insufficient { balance: 10 })
        );
        assert_eq!(economy.check_transfer(&poor, 0), Err(BetError::Invalid));
        assert_eq!(economy.check_transfer(&poor, 10), Ok(10));
        assert_eq!(economy.check_transfer(&exempt, 5_000), Ok(5_000));
    }

    #[tokio::test]
    async fn transfer_is_one_decrement_and_one_increment() {
        let store = Arc::new(RecordingStore::default());
        let economy = EconomyService::new(store.clone(), None);

        economy.transfer(1, 2, 500).await.unwrap();

        assert_eq!(
            store.mutations(),
            [
                StoreOp::Increment(1, Counter::Balance, -500),
                StoreOp::Increment(2, Counter::Balance, 500),
            ]
        );
    }

    #[tokio::test]
    async fn exempt_sender_is_never_debited() {
        let store = Arc::new(RecordingStore::default());
        let economy = EconomyService::new(store.clone(), Some(1));

        economy.transfer(1, 2, 500).await.unwrap();

        assert_eq!(
            store.mutations(),
            [StoreOp::Increment(2, Counter::Balance, 500)]
        );
    }

    #[tokio::test]
    async fn zero_credit_makes_no_store_call() {
        let store = Arc::new(RecordingStore::default());
        let economy = EconomyService::new(store.clone(), None);

        economy.credit(1, 0).await.unwrap();
        economy.credit(1, -20).await.unwrap();

        assert_eq!(
            store.mutations(),
            [StoreOp::Increment(1, Counter::Balance, -20)]
        );
    }
}
