#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A tradeable two-asset market, identified by a composite string key.
///
/// The identifier is `QUOTE_BASE`: the component before the separator is
/// the quote asset, the one after is the base asset. `USDT_BTC` trades
/// BTC priced in USDT. Order pricing depends on this convention, so the
/// split is derived once at registration and never recomputed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    id: String,
    symbol: String,
    base_asset: String,
    quote_asset: String,
}

impl Market {
    fn parse(id: &str) -> Result<Self> {
        let (quote, base) = id
            .split_once('_')
            .ok_or_else(|| Error::MalformedInput(format!("market id '{id}' has no '_' separator")))?;
        Ok(Self {
            id: id.to_string(),
            symbol: format!("{base}/{quote}"),
            base_asset: base.to_string(),
            quote_asset: quote.to_string(),
        })
    }

    /// Pair identifier as the engine spells it.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display symbol, `BASE/QUOTE`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The asset being traded.
    pub fn base_asset(&self) -> &str {
        &self.base_asset
    }

    /// The asset the market is priced in; funds a buy.
    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }
}

/// Registry of known markets, keyed by pair identifier.
#[derive(Debug, Default)]
pub struct MarketRegistry {
    markets: Vec<Market>,
}

impl MarketRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` if it has not been seen before. Re-registering a
    /// known pair is a no-op.
    pub fn register(&mut self, id: &str) -> Result<()> {
        if self.get(id).is_none() {
            self.markets.push(Market::parse(id)?);
        }
        Ok(())
    }

    /// Looks a market up by pair identifier.
    pub fn get(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|market| market.id == id)
    }

    /// All registered markets, in first-seen order.
    pub fn markets(&self) -> std::slice::Iter<'_, Market> {
        self.markets.iter()
    }
}

#[cfg(test)]
#[test]
fn quote_comes_before_the_separator() {
    let mut registry = MarketRegistry::new();
    registry.register("USDT_BTC").unwrap();

    let market = registry.get("USDT_BTC").unwrap();
    assert_eq!(market.quote_asset(), "USDT");
    assert_eq!(market.base_asset(), "BTC");
    assert_eq!(market.symbol(), "BTC/USDT");
}

#[cfg(test)]
#[test]
fn btc_eth_has_eth_as_base() {
    let mut registry = MarketRegistry::new();
    registry.register("BTC_ETH").unwrap();

    let market = registry.get("BTC_ETH").unwrap();
    assert_eq!(market.quote_asset(), "BTC");
    assert_eq!(market.base_asset(), "ETH");
}

#[cfg(test)]
#[test]
fn duplicate_registration_is_deduplicated() {
    let mut registry = MarketRegistry::new();
    registry.register("USDT_BTC").unwrap();
    registry.register("USDT_BTC").unwrap();

    assert_eq!(registry.markets().count(), 1);
}

#[cfg(test)]
#[test]
fn id_without_separator_is_malformed() {
    let mut registry = MarketRegistry::new();
    let result = registry.register("USDTBTC");
    assert!(matches!(result, Err(Error::MalformedInput(_))));
}
