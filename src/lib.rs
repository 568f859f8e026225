//! # Trading bot client for a turn-based market simulation
//!
//! The game engine drives the bot over standard input with a
//! line-oriented protocol and expects one order line (or `pass`) on
//! standard output per `action order` turn. This crate keeps a typed
//! local view of the venue and builds orders against it.
//!
//! ## Core Components
//! | Component          | Description                                                            |
//! |--------------------|------------------------------------------------------------------------|
//! | **`CandleStore`**  | Per-pair OHLCV history in the engine's configurable wire format.       |
//! | **`BalanceLedger`**| Per-asset free balances, fully replaced on each `stacks` broadcast.    |
//! | **`MarketRegistry`**| Pair identifier to base/quote decomposition (quote-first convention). |
//! | **`Exchange`**     | Composes the three, validates and prices orders, queues and flushes them. |
//! | **`Command`**      | The wire protocol as a tagged union, dispatched exhaustively.          |
//! | **`Bot`**          | The line loop: settings, updates, and decision turns.                  |
//! | **`Strategy`**     | The pluggable policy called once per turn.                             |
//!
//! ## Placing an order against the last known price
//! ```rust
//! use tradebot_rs::prelude::*;
//!
//! let mut exchange = Exchange::new();
//! exchange
//!     .record_candles("USDT_BTC,1516753800,10100,9900,9950,10000,120.5")
//!     .unwrap();
//! exchange.replace_balances("BTC:0.00,USDT:1000.00").unwrap();
//!
//! let receipt = exchange.place_order("USDT_BTC", 0.05, OrderSide::Buy).unwrap();
//! assert_eq!(receipt.order_id, 1);
//! assert_eq!(receipt.price, 10000.0);
//!
//! let mut out = Vec::new();
//! exchange.flush_orders(&mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "buy USDT_BTC 0.05\n");
//! ```
//!
//! ## Running the whole bot over a stream
//! ```rust
//! use tradebot_rs::prelude::*;
//!
//! let input = b"action order 10000\n";
//! let mut out = Vec::new();
//!
//! let mut bot = Bot::new(PassStrategy);
//! bot.run(&input[..], &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "pass\n");
//! ```
//!
//! ## Error Handling
//! Every failure is local to the line or order attempt it came from:
//! malformed input aborts its batch, an order against an unpriced pair or
//! an underfunded balance is rejected before any mutation, and an
//! unrecognized command is logged to standard error while the loop keeps
//! reading. Nothing retries.
#![warn(missing_docs)]

/// The line-loop dispatcher.
pub mod bot;

/// Exchange-data proxy: candles, balances, markets, and the order engine.
pub mod engine;

/// Error types for the crate.
pub mod errors;

/// Wire-protocol commands and game settings.
pub mod protocol;

/// Strategy seam and the bundled starter policy.
pub mod strategy;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::bot::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::protocol::*;
    pub use crate::strategy::*;
}
