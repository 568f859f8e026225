use std::fmt;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Side of an order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    /// Acquire base asset, funded from the quote balance.
    Buy,
    /// Release base asset, funded from the base balance.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order kinds the simulated venue supports.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Fills immediately and completely at the last known close.
    Market,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
        }
    }
}

/// Status an accepted order can report.
///
/// The venue settles on the next round, so a freshly accepted order is
/// `Open` until the following balance broadcast reflects it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Accepted, awaiting the next round's settlement.
    Open,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
        }
    }
}

/// An accepted trade awaiting the next protocol flush.
///
/// Exists only between order construction and the flush that serializes
/// it; `Display` is the wire form `<side> <pair> <amount>`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    side: OrderSide,
    market_id: String,
    amount: f64,
}

impl From<(OrderSide, String, f64)> for PendingOrder {
    fn from((side, market_id, amount): (OrderSide, String, f64)) -> Self {
        Self {
            side,
            market_id,
            amount,
        }
    }
}

impl fmt::Display for PendingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.side, self.market_id, self.amount)
    }
}

impl PendingOrder {
    /// Side of the order.
    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// Pair identifier the order targets.
    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    /// Amount in base units.
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Confirmation record returned to the caller of a successful order.
///
/// Purely informational and never persisted. The venue fills market
/// orders immediately and completely, hence `filled == amount` and
/// `remaining == 0`; cost and fee are not reported by the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    /// Timestamp of the last candle known when the order was accepted.
    pub time: DateTime<Utc>,
    /// Sequential id, process-lifetime scoped, starting at 1.
    pub order_id: u32,
    /// Kind of order the venue executed.
    pub kind: OrderKind,
    /// Side of the order.
    pub side: OrderSide,
    /// Price the order was filled at (the last known close).
    pub price: f64,
    /// Requested amount, base units.
    pub amount: f64,
    /// Total cost; the engine does not report it.
    pub cost: Option<f64>,
    /// Amount filled; always the full requested amount.
    pub filled: f64,
    /// Amount left unfilled; always zero.
    pub remaining: f64,
    /// Reported status.
    pub status: OrderStatus,
    /// Display symbol of the market, `BASE/QUOTE`.
    pub symbol: String,
    /// Fee charged; the engine does not report it.
    pub fee: Option<f64>,
}

#[cfg(test)]
#[test]
fn sides_display_as_wire_tokens() {
    assert_eq!(OrderSide::Buy.to_string(), "buy");
    assert_eq!(OrderSide::Sell.to_string(), "sell");
}

#[cfg(test)]
#[test]
fn pending_order_displays_the_wire_form() {
    let order = PendingOrder::from((OrderSide::Sell, "USDT_BTC".to_string(), 333.0));
    assert_eq!(order.to_string(), "sell USDT_BTC 333");

    let order = PendingOrder::from((OrderSide::Buy, "USDT_BTC".to_string(), 0.05));
    assert_eq!(order.to_string(), "buy USDT_BTC 0.05");
}
