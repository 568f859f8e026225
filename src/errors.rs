use crate::engine::OrderSide;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy. Every variant is local to the single input line or
/// order attempt being processed; there is no global failure state and no
/// automatic retry anywhere.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A wire-protocol field failed required coercion (e.g. a non-numeric
    /// candle field). Aborts the batch it appeared in, nothing more.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An order was attempted against a pair with no recorded candles.
    /// Fatal to that order attempt only.
    #[error("no candle data recorded for market {0}")]
    NoData(String),

    /// An order referenced a pair identifier that was never registered.
    #[error("unknown market {0}")]
    UnknownMarket(String),

    /// The ledger cannot cover the order. Raised before any mutation, so
    /// a rejected order leaves every balance untouched.
    #[error(
        "not enough funds: you want to {side} {amount} {base} requiring {required} {currency} on {market} but you have only {available} {currency}"
    )]
    InsufficientFunds {
        /// Side of the rejected order.
        side: OrderSide,
        /// Pair identifier the order targeted.
        market: String,
        /// Base asset of that pair.
        base: String,
        /// Amount the caller asked for, in base units.
        amount: f64,
        /// Amount the order would have needed, in the funding currency.
        required: f64,
        /// The funding currency (quote for a buy, base for a sell).
        currency: String,
        /// Free balance actually available in that currency.
        available: f64,
    },

    /// The engine sent a command this bot does not understand. The
    /// display text is the exact line the protocol prescribes for
    /// standard error.
    #[error("Unable to execute command: {name}, with data: {data}")]
    UnknownCommand {
        /// First token of the line.
        name: String,
        /// Remainder of the line, verbatim.
        data: String,
    },

    /// I/O error occurred. The only fatal class in the run loop.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
