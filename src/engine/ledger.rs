use std::collections::HashMap;

use crate::errors::{Error, Result};

/// Per-asset free-balance table.
///
/// The engine broadcasts the full balance set every round; the ledger has
/// no memory of assets that were present before a broadcast and absent
/// from it.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    stacks: HashMap<String, f64>,
}

impl BalanceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire ledger with the `,`-joined `asset:amount`
    /// entries of `batch`.
    ///
    /// Full replace, not a merge: assets missing from the batch are gone
    /// afterwards. The previous ledger survives a parse failure.
    pub fn replace_balances(&mut self, batch: &str) -> Result<()> {
        let mut stacks = HashMap::new();
        for entry in batch.split(',') {
            let (asset, amount) = entry
                .split_once(':')
                .ok_or_else(|| Error::MalformedInput(format!("invalid stack entry '{entry}'")))?;
            let amount = amount
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|amount| amount.is_finite())
                .ok_or_else(|| Error::MalformedInput(format!("invalid stack amount '{amount}' for {asset}")))?;
            stacks.insert(asset.trim().to_string(), amount);
        }
        self.stacks = stacks;
        Ok(())
    }

    /// Current free balance for `asset`, or `None` if the asset has never
    /// been recorded.
    pub fn balance_of(&self, asset: &str) -> Option<f64> {
        self.stacks.get(asset).copied()
    }

    /// Decreases the stored balance by `amount`.
    ///
    /// Does not floor at zero: the order engine checks sufficiency before
    /// calling this.
    pub(crate) fn debit(&mut self, asset: &str, amount: f64) {
        *self.stacks.entry(asset.to_string()).or_insert(0.0) -= amount;
    }
}

#[cfg(test)]
#[test]
fn replace_round_trips_every_value() {
    let mut ledger = BalanceLedger::new();
    ledger.replace_balances("BTC:0.00000000,ETH:0.00000000,USDT:1000.00").unwrap();

    assert_eq!(ledger.balance_of("BTC"), Some(0.0));
    assert_eq!(ledger.balance_of("ETH"), Some(0.0));
    assert_eq!(ledger.balance_of("USDT"), Some(1000.0));
}

#[cfg(test)]
#[test]
fn replace_drops_assets_missing_from_the_batch() {
    let mut ledger = BalanceLedger::new();
    ledger.replace_balances("BTC:1.5,USDT:1000.00").unwrap();
    ledger.replace_balances("USDT:250.00").unwrap();

    assert_eq!(ledger.balance_of("BTC"), None);
    assert_eq!(ledger.balance_of("USDT"), Some(250.0));
}

#[cfg(test)]
#[test]
fn never_recorded_asset_is_absent() {
    let ledger = BalanceLedger::new();
    assert_eq!(ledger.balance_of("USDT"), None);
}

#[cfg(test)]
#[test]
fn malformed_batch_keeps_the_previous_ledger() {
    let mut ledger = BalanceLedger::new();
    ledger.replace_balances("USDT:1000.00").unwrap();

    let result = ledger.replace_balances("USDT:abc");
    assert!(matches!(result, Err(Error::MalformedInput(_))));
    assert_eq!(ledger.balance_of("USDT"), Some(1000.0));

    let result = ledger.replace_balances("USDT");
    assert!(matches!(result, Err(Error::MalformedInput(_))));
    assert_eq!(ledger.balance_of("USDT"), Some(1000.0));
}

#[cfg(test)]
#[test]
fn debit_does_not_floor_at_zero() {
    let mut ledger = BalanceLedger::new();
    ledger.replace_balances("USDT:100.0").unwrap();
    ledger.debit("USDT", 150.0);

    assert_eq!(ledger.balance_of("USDT"), Some(-50.0));
}
