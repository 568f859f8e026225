//! Line-loop dispatcher: wires the engine protocol to the exchange view
//! and the strategy.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::engine::Exchange;
use crate::errors::{Error, Result};
use crate::protocol::{Command, GameSettings};
use crate::strategy::{StepContext, Strategy};

/// The bot process: exchange state, game settings, and the strategy.
///
/// Owns every mutable structure; nothing is global. The engine drives it
/// strictly turn-by-turn over line input, so all state changes happen
/// inside [`Bot::handle_line`] before the next line is read.
pub struct Bot<S> {
    exchange: Exchange,
    settings: GameSettings,
    strategy: S,
}

impl<S: Strategy> Bot<S> {
    /// Creates a bot with an empty exchange view.
    pub fn new(strategy: S) -> Self {
        Self {
            exchange: Exchange::new(),
            settings: GameSettings::default(),
            strategy,
        }
    }

    /// The exchange view.
    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    /// Game settings received so far.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Dispatches one engine line; any response goes to `out`.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        match Command::parse(line)? {
            Command::Settings { key, value } => self.apply_setting(&key, &value),
            Command::NextCandles { batch } => self.exchange.record_candles(&batch),
            Command::Stacks { batch } => self.exchange.replace_balances(&batch),
            Command::UnknownUpdate { scope, key } => {
                if scope == "game" {
                    warn!("Cannot parse game data input with key {key}");
                } else {
                    debug!("ignoring update for scope {scope}");
                }
                Ok(())
            }
            Command::Order { timebank } => self.act(timebank, out),
            Command::UnknownAction { kind } => {
                debug!("ignoring action {kind}");
                Ok(())
            }
        }
    }

    fn apply_setting(&mut self, key: &str, value: &str) -> Result<()> {
        if key == "candle_format" {
            self.exchange.set_candle_format(value.into());
            return Ok(());
        }
        self.settings.apply(key, value)
    }

    /// One decision turn. The strategy may fail; the engine still gets an
    /// answer (whatever was queued before the failure, or `pass`),
    /// otherwise it would sit waiting for output until the timebank runs
    /// dry.
    fn act<W: Write>(&mut self, timebank: i64, out: &mut W) -> Result<()> {
        let ctx = StepContext {
            exchange: &mut self.exchange,
            settings: &self.settings,
            timebank,
        };
        if let Err(err) = self.strategy.step(ctx) {
            warn!("strategy error: {err}");
        }
        self.exchange.flush_orders(out)
    }

    /// Drives the bot over `input` until the stream ends.
    ///
    /// Blank lines are skipped. Per-line failures other than I/O are
    /// logged to standard error and the loop continues; I/O failures are
    /// fatal. A closed input stream ends the run cleanly, which the
    /// binary turns into exit code 0.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.handle_line(line.trim(), &mut out) {
                Ok(()) => {}
                Err(err @ Error::Io(_)) => return Err(err),
                Err(err) => warn!("{err}"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OrderSide;
    use crate::strategy::PassStrategy;

    const SESSION: &str = "\
settings candle_format pair,date,high,low,open,close,volume
settings timebank 10000
settings your_bot player0
update game next_candles USDT_BTC,1516753800,10100,9900,9950,10000,120.5
update game stacks BTC:0.00,USDT:1000.00
action order 10000
";

    struct BuyOnce;

    impl Strategy for BuyOnce {
        fn step(&mut self, ctx: StepContext<'_>) -> Result<()> {
            ctx.exchange.place_order("USDT_BTC", 0.05, OrderSide::Buy)?;
            Ok(())
        }
    }

    struct Overspend;

    impl Strategy for Overspend {
        fn step(&mut self, ctx: StepContext<'_>) -> Result<()> {
            ctx.exchange.place_order("USDT_BTC", 1000.0, OrderSide::Buy)?;
            Ok(())
        }
    }

    #[test]
    fn a_full_session_with_the_starter_strategy_passes() {
        let mut bot = Bot::new(PassStrategy);
        let mut out = Vec::new();
        bot.run(SESSION.as_bytes(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
        assert_eq!(bot.settings().timebank, Some(10000));
        assert_eq!(bot.settings().your_bot.as_deref(), Some("player0"));
        assert!(bot.exchange().markets().get("USDT_BTC").is_some());
        assert_eq!(bot.exchange().ledger().balance_of("USDT"), Some(1000.0));
    }

    #[test]
    fn a_trading_strategy_answers_with_its_orders() {
        let mut bot = Bot::new(BuyOnce);
        let mut out = Vec::new();
        bot.run(SESSION.as_bytes(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "buy USDT_BTC 0.05\n");
        assert_eq!(bot.exchange().ledger().balance_of("USDT"), Some(500.0));
    }

    #[test]
    fn a_failing_strategy_still_answers_the_turn() {
        let mut bot = Bot::new(Overspend);
        let mut out = Vec::new();
        bot.run(SESSION.as_bytes(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
        assert_eq!(bot.exchange().ledger().balance_of("USDT"), Some(1000.0));
    }

    #[test]
    fn unknown_commands_do_not_stop_the_loop() {
        let input = "\
move up 2
update game stacks BTC:0.00,USDT:1000.00
action order 500
";
        let mut bot = Bot::new(PassStrategy);
        let mut out = Vec::new();
        bot.run(input.as_bytes(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
        assert_eq!(bot.exchange().ledger().balance_of("USDT"), Some(1000.0));
    }

    #[test]
    fn blank_lines_and_eof_end_cleanly() {
        let mut bot = Bot::new(PassStrategy);
        let mut out = Vec::new();
        bot.run("\n   \n".as_bytes(), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
