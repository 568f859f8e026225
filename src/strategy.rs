//! Strategy seam: the policy that decides what to trade each turn.

use crate::engine::Exchange;
use crate::errors::Result;
use crate::protocol::GameSettings;

/// Everything a strategy may look at, and act on, during one turn.
pub struct StepContext<'a> {
    /// Mutable exchange view: candles, balances, markets, order engine.
    pub exchange: &'a mut Exchange,
    /// Game configuration received so far.
    pub settings: &'a GameSettings,
    /// Remaining think time for this turn, milliseconds.
    pub timebank: i64,
}

/// A trading policy, called once per `action order` turn.
///
/// Implementations inspect the exchange view and place orders through
/// [`Exchange::place_order`]; whatever is queued when the step returns is
/// flushed to the engine. A step error is logged and the turn is still
/// answered with whatever was queued before the failure.
pub trait Strategy {
    /// Decides this turn's orders.
    fn step(&mut self, ctx: StepContext<'_>) -> Result<()>;
}

/// The starter policy: trades nothing, so every turn answers `pass`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassStrategy;

impl Strategy for PassStrategy {
    fn step(&mut self, _ctx: StepContext<'_>) -> Result<()> {
        Ok(())
    }
}
