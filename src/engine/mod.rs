//! Exchange-data proxy: the bot's local view of the simulated venue.
//!
//! This module provides the market-state components:
//! - `CandleStore`: per-pair OHLCV history and last-known prices.
//! - `BalanceLedger`: per-asset free balances, replaced each round.
//! - `MarketRegistry`: pair identifier to base/quote decomposition.
//! - `Exchange`: composes the three, owns the pending-order queue, and
//!   carries the order engine (`place_order`) and the wire flush.

mod candle;
mod ledger;
mod market;
mod order;

use std::collections::{VecDeque, vec_deque::Iter};
use std::io::Write;

use tracing::debug;

use crate::errors::{Error, Result};

pub use candle::*;
pub use ledger::*;
pub use market::*;
pub use order::*;

/// The bot's owned view of the venue.
///
/// Constructed once at process start and passed down explicitly; the
/// strategy reads market state through it and places orders through it.
/// All mutation happens while handling one input line, so no interior
/// locking exists anywhere.
#[derive(Debug, Default)]
pub struct Exchange {
    candles: CandleStore,
    ledger: BalanceLedger,
    markets: MarketRegistry,
    orders: VecDeque<PendingOrder>,
    order_count: u32,
}

impl Exchange {
    /// Creates an empty exchange view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Candle history and last-known prices.
    pub fn candles(&self) -> &CandleStore {
        &self.candles
    }

    /// Per-asset free balances.
    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /// Known markets.
    pub fn markets(&self) -> &MarketRegistry {
        &self.markets
    }

    /// Returns an iterator over the pending orders.
    pub fn orders(&self) -> Iter<'_, PendingOrder> {
        self.orders.iter()
    }

    /// Installs the candle wire format for future batches.
    pub fn set_candle_format(&mut self, format: CandleFormat) {
        self.candles.set_format(format);
    }

    /// Ingests a `next_candles` batch.
    ///
    /// Pairs seen for the first time are registered as markets, so the
    /// registry is always populated for any pair the strategy can price.
    pub fn record_candles(&mut self, batch: &str) -> Result<()> {
        let touched = self.candles.record_batch(batch)?;
        for pair in &touched {
            self.markets.register(pair)?;
        }
        debug!(markets = touched.len(), "recorded candle batch");
        Ok(())
    }

    /// Ingests a `stacks` broadcast (full balance replace).
    pub fn replace_balances(&mut self, batch: &str) -> Result<()> {
        self.ledger.replace_balances(batch)
    }

    /// Validates, prices, and records one market order.
    ///
    /// A buy is funded from the quote balance and requires
    /// `amount * last_close`; a sell is funded from the base balance and
    /// requires `amount` itself. The check and the debit are atomic: a
    /// rejected order leaves the ledger untouched.
    ///
    /// The currency gained by the trade is NOT credited here. The venue
    /// settles one round later, and the updated balance arrives with the
    /// next `stacks` broadcast.
    pub fn place_order(&mut self, market_id: &str, amount: f64, side: OrderSide) -> Result<OrderReceipt> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::MalformedInput(format!("order amount {amount} is not a positive number")));
        }

        let (currency, base, symbol) = {
            let market = self
                .markets
                .get(market_id)
                .ok_or_else(|| Error::UnknownMarket(market_id.to_string()))?;
            let currency = match side {
                OrderSide::Buy => market.quote_asset(),
                OrderSide::Sell => market.base_asset(),
            };
            (currency.to_string(), market.base_asset().to_string(), market.symbol().to_string())
        };

        let close = self.candles.last_price(market_id)?;
        let required = match side {
            OrderSide::Buy => amount * close,
            OrderSide::Sell => amount,
        };

        let available = self.ledger.balance_of(&currency).unwrap_or(0.0);
        if available < required {
            return Err(Error::InsufficientFunds {
                side,
                market: market_id.to_string(),
                base,
                amount,
                required,
                currency,
                available,
            });
        }

        let time = self
            .candles
            .last_date()
            .ok_or_else(|| Error::NoData(market_id.to_string()))?;

        self.ledger.debit(&currency, required);
        self.orders.push_back(PendingOrder::from((side, market_id.to_string(), amount)));
        self.order_count += 1;

        Ok(OrderReceipt {
            time,
            order_id: self.order_count,
            kind: OrderKind::Market,
            side,
            price: close,
            amount,
            cost: None,
            filled: amount,
            remaining: 0.0,
            status: OrderStatus::Open,
            symbol,
            fee: None,
        })
    }

    /// Serializes and emits all pending orders, then clears them.
    ///
    /// Writes one newline-terminated line to `out`: the orders as
    /// `<side> <pair> <amount>` joined by `;`, or the literal no-op token
    /// `pass` when nothing is pending. The queue is cleared only after
    /// the write lands; the `Ok` return is the completion signal, and a
    /// failed write leaves the queue intact.
    pub fn flush_orders<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let command = if self.orders.is_empty() {
            String::from("pass")
        } else {
            self.orders.iter().map(ToString::to_string).collect::<Vec<_>>().join(";")
        };

        writeln!(out, "{command}")?;
        out.flush()?;
        self.orders.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use crate::errors::Error;

    // The three-market snapshot the engine hands out on round one.
    fn get_exchange() -> Exchange {
        let mut exchange = Exchange::new();
        exchange
            .record_candles(
                "BTC_ETH,1516753800,0.090995,0.09040017,0.09060023,0.09069601,39.15071531;\
                 USDT_ETH,1516753800,976.99644142,955.99999998,974.87665079,960.00160798,316622.92602686;\
                 USDT_BTC,1516753800,10806.92999962,10501,10748.4213653,10575.00000019,1618333.6451304",
            )
            .unwrap();
        exchange.replace_balances("BTC:0.00000000,ETH:0.00000000,USDT:1000.00").unwrap();
        exchange
    }

    // Round close pinned at 10000 to make the pricing arithmetic exact.
    fn get_round_exchange() -> Exchange {
        let mut exchange = Exchange::new();
        exchange
            .record_candles("USDT_BTC,1516753800,10100,9900,9950,10000,120.5")
            .unwrap();
        exchange.replace_balances("BTC:0.00,USDT:1000.00").unwrap();
        exchange
    }

    #[test]
    fn candle_batches_register_markets() {
        let exchange = get_exchange();
        assert_eq!(exchange.markets().markets().count(), 3);

        let market = exchange.markets().get("USDT_BTC").unwrap();
        assert_eq!(market.quote_asset(), "USDT");
        assert_eq!(market.base_asset(), "BTC");
    }

    #[test]
    fn buy_requires_amount_times_close_of_the_quote_currency() {
        let mut exchange = get_round_exchange();

        let receipt = exchange.place_order("USDT_BTC", 0.05, OrderSide::Buy).unwrap();
        assert_eq!(receipt.order_id, 1);
        assert_eq!(receipt.kind, OrderKind::Market);
        assert_eq!(receipt.status, OrderStatus::Open);
        assert_eq!(receipt.price, 10000.0);
        assert_eq!(receipt.amount, 0.05);
        assert_eq!(receipt.filled, 0.05);
        assert_eq!(receipt.remaining, 0.0);
        assert_eq!(receipt.symbol, "BTC/USDT");
        assert_eq!(receipt.cost, None);
        assert_eq!(receipt.fee, None);
        assert_eq!(receipt.time.timestamp_millis(), 1516753800000);

        // 0.05 BTC at close 10000 costs 500 USDT.
        assert_eq!(exchange.ledger().balance_of("USDT"), Some(500.0));

        let result = exchange.place_order("USDT_BTC", 0.06, OrderSide::Buy);
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        assert_eq!(exchange.ledger().balance_of("USDT"), Some(500.0));
    }

    #[test]
    fn sell_requires_exactly_the_amount_of_base_currency() {
        let mut exchange = get_round_exchange();
        exchange.replace_balances("BTC:0.30,USDT:0.00").unwrap();

        exchange.place_order("USDT_BTC", 0.30, OrderSide::Sell).unwrap();
        assert_eq!(exchange.ledger().balance_of("BTC"), Some(0.0));
    }

    #[test]
    fn selling_base_you_do_not_have_is_rejected() {
        let mut exchange = get_exchange();

        let result = exchange.place_order("USDT_BTC", 1.0, OrderSide::Sell);
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        assert_eq!(exchange.ledger().balance_of("BTC"), Some(0.0));
    }

    #[test]
    fn rejection_never_partially_debits() {
        let mut exchange = get_exchange();

        let result = exchange.place_order("BTC_ETH", 2.0, OrderSide::Buy);
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));

        assert_eq!(exchange.ledger().balance_of("BTC"), Some(0.0));
        assert_eq!(exchange.ledger().balance_of("ETH"), Some(0.0));
        assert_eq!(exchange.ledger().balance_of("USDT"), Some(1000.0));
        assert_eq!(exchange.orders().count(), 0);
    }

    #[test]
    fn spending_the_stack_blocks_further_orders() {
        let mut exchange = get_exchange();

        exchange.place_order("USDT_BTC", 0.09, OrderSide::Buy).unwrap();
        let left = exchange.ledger().balance_of("USDT").unwrap();
        assert!((left - 48.25).abs() < 1e-6);

        let result = exchange.place_order("USDT_BTC", 1000.0, OrderSide::Sell);
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
    }

    #[test]
    fn gained_currency_is_not_credited_until_the_next_broadcast() {
        let mut exchange = get_round_exchange();

        exchange.place_order("USDT_BTC", 0.05, OrderSide::Buy).unwrap();
        // The bought BTC settles next round; only the USDT debit shows.
        assert_eq!(exchange.ledger().balance_of("BTC"), Some(0.0));
        assert_eq!(exchange.ledger().balance_of("USDT"), Some(500.0));
    }

    #[test]
    fn order_ids_are_sequential_from_one() {
        let mut exchange = get_round_exchange();
        exchange.replace_balances("BTC:1.00,USDT:1000.00").unwrap();

        let first = exchange.place_order("USDT_BTC", 0.01, OrderSide::Buy).unwrap();
        let second = exchange.place_order("USDT_BTC", 0.20, OrderSide::Sell).unwrap();
        let third = exchange.place_order("USDT_BTC", 0.01, OrderSide::Buy).unwrap();

        assert_eq!(first.order_id, 1);
        assert_eq!(second.order_id, 2);
        assert_eq!(third.order_id, 3);
    }

    #[test]
    fn unknown_market_is_rejected() {
        let mut exchange = get_exchange();
        let result = exchange.place_order("EUR_DOGE", 1.0, OrderSide::Buy);
        assert!(matches!(result, Err(Error::UnknownMarket(_))));
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let mut exchange = get_exchange();
        let result = exchange.place_order("USDT_BTC", -1.0, OrderSide::Buy);
        assert!(matches!(result, Err(Error::MalformedInput(_))));
        assert_eq!(exchange.ledger().balance_of("USDT"), Some(1000.0));
    }

    #[test]
    fn flush_serializes_the_queue_and_clears_it() {
        let mut exchange = Exchange::new();
        exchange.orders.push_back(PendingOrder::from((OrderSide::Sell, "USDT_BTC".to_string(), 333.0)));
        exchange.orders.push_back(PendingOrder::from((OrderSide::Buy, "BTC_ETH".to_string(), 333.0)));

        let mut out = Vec::new();
        exchange.flush_orders(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "sell USDT_BTC 333;buy BTC_ETH 333\n");
        assert_eq!(exchange.orders().count(), 0);

        let mut out = Vec::new();
        exchange.flush_orders(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
    }

    #[test]
    fn flush_with_no_orders_is_pass() {
        let mut exchange = Exchange::new();
        let mut out = Vec::new();
        exchange.flush_orders(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
    }

    #[test]
    fn placed_orders_flush_in_order() {
        let mut exchange = get_round_exchange();
        exchange.replace_balances("BTC:1.00,USDT:1000.00").unwrap();

        exchange.place_order("USDT_BTC", 0.05, OrderSide::Buy).unwrap();
        exchange.place_order("USDT_BTC", 0.25, OrderSide::Sell).unwrap();

        let mut out = Vec::new();
        exchange.flush_orders(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "buy USDT_BTC 0.05;sell USDT_BTC 0.25\n");
    }
}
