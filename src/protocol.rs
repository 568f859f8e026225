//! Engine wire protocol: typed commands and game settings.
//!
//! The engine speaks a line-oriented protocol, space-separated tokens
//! with the command name first. Parsing turns each line into a [`Command`]
//! variant so dispatch is a single exhaustive match instead of string
//! routing.

use std::collections::HashMap;

use crate::errors::{Error, Result};

/// One parsed engine input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `settings <key> <value>`
    Settings {
        /// Setting name.
        key: String,
        /// Raw value; interpretation depends on the key.
        value: String,
    },
    /// `update game next_candles <batch>`
    NextCandles {
        /// `;`-joined candle groups.
        batch: String,
    },
    /// `update game stacks <batch>`
    Stacks {
        /// `,`-joined `asset:amount` entries.
        batch: String,
    },
    /// `update` carrying a scope or key this bot does not track.
    UnknownUpdate {
        /// Update scope (`game`, `player`, ...).
        scope: String,
        /// The key within that scope.
        key: String,
    },
    /// `action order <timebank>`: one strategy decision cycle.
    Order {
        /// Remaining think time, milliseconds.
        timebank: i64,
    },
    /// `action` other than `order`.
    UnknownAction {
        /// The action kind the engine asked for.
        kind: String,
    },
}

impl Command {
    /// Parses one engine line.
    ///
    /// An unrecognized top-level command is [`Error::UnknownCommand`],
    /// whose display text is the exact line the protocol prescribes for
    /// standard error; the caller logs it and keeps reading.
    pub fn parse(line: &str) -> Result<Self> {
        let mut tokens = line.trim().splitn(2, ' ');
        let name = tokens.next().unwrap_or_default();
        let rest = tokens.next().unwrap_or_default();

        match name {
            "settings" => {
                let (key, value) = rest
                    .split_once(' ')
                    .ok_or_else(|| Error::MalformedInput(format!("settings line '{line}' needs a key and a value")))?;
                Ok(Self::Settings {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            "update" => {
                let mut parts = rest.splitn(3, ' ');
                let scope = parts.next().unwrap_or_default();
                let key = parts.next().unwrap_or_default();
                let value = parts.next().unwrap_or_default();
                match (scope, key) {
                    ("game", "next_candles") => Ok(Self::NextCandles { batch: value.to_string() }),
                    ("game", "stacks") => Ok(Self::Stacks { batch: value.to_string() }),
                    _ => Ok(Self::UnknownUpdate {
                        scope: scope.to_string(),
                        key: key.to_string(),
                    }),
                }
            }
            "action" => {
                let mut parts = rest.splitn(2, ' ');
                let kind = parts.next().unwrap_or_default();
                if kind == "order" {
                    let timebank = parts.next().unwrap_or_default();
                    let timebank = timebank
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| Error::MalformedInput(format!("invalid timebank '{timebank}'")))?;
                    Ok(Self::Order { timebank })
                } else {
                    Ok(Self::UnknownAction { kind: kind.to_string() })
                }
            }
            _ => Err(Error::UnknownCommand {
                name: name.to_string(),
                data: rest.to_string(),
            }),
        }
    }
}

/// Engine-provided game configuration, filled by `settings` lines.
///
/// Numeric keys are coerced on arrival; anything the bot does not know by
/// name is kept verbatim in `extras`. The `candle_format` key never lands
/// here, it configures the candle store directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSettings {
    /// Total think time available at game start, milliseconds.
    pub timebank: Option<i64>,
    /// Think time added per move, milliseconds.
    pub time_per_move: Option<i64>,
    /// Seconds covered by one candle.
    pub candle_interval: Option<i64>,
    /// Number of candles the whole game spans.
    pub candles_total: Option<i64>,
    /// Number of candles handed over before the first action.
    pub candles_given: Option<i64>,
    /// Starting stack in the quote currency.
    pub initial_stack: Option<i64>,
    /// Fee percentage the venue charges per transaction.
    pub transaction_fee_percent: f64,
    /// Engine-reported player names, verbatim.
    pub player_names: Option<String>,
    /// This bot's name as the engine knows it.
    pub your_bot: Option<String>,
    /// Any other settings keys, stored verbatim.
    pub extras: HashMap<String, String>,
}

impl GameSettings {
    /// Applies one `settings` key/value.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "timebank" => self.timebank = Some(parse_int(key, value)?),
            "time_per_move" => self.time_per_move = Some(parse_int(key, value)?),
            "candle_interval" => self.candle_interval = Some(parse_int(key, value)?),
            "candles_total" => self.candles_total = Some(parse_int(key, value)?),
            "candles_given" => self.candles_given = Some(parse_int(key, value)?),
            "initial_stack" => self.initial_stack = Some(parse_int(key, value)?),
            "transaction_fee_percent" => self.transaction_fee_percent = parse_float(key, value)?,
            "player_names" => self.player_names = Some(value.to_string()),
            "your_bot" => self.your_bot = Some(value.to_string()),
            _ => {
                self.extras.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::MalformedInput(format!("setting {key} expects an integer, got '{value}'")))
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::MalformedInput(format!("setting {key} expects a number, got '{value}'")))
}
