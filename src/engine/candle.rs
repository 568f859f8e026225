use std::collections::HashMap;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// One OHLCV observation for a market over a fixed time interval.
///
/// Candles are append-only: once recorded they are never mutated. The
/// engine sends the interval timestamp in seconds since the epoch; it is
/// stored with millisecond precision, so `date().timestamp_millis()` is
/// the wire value times 1000.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    date: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<(DateTime<Utc>, f64, f64, f64, f64, f64)> for Candle {
    fn from((date, open, high, low, close, volume): (DateTime<Utc>, f64, f64, f64, f64, f64)) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl Candle {
    /// Interval timestamp.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Opening price.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Highest price of the interval.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Lowest price of the interval.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Traded volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }
}

/// One field slot in the candle wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleField {
    /// Pair identifier.
    Pair,
    /// Interval timestamp, seconds since the epoch on the wire.
    Date,
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Traded volume.
    Volume,
    /// A field this bot does not track; its value is skipped.
    Ignored,
}

impl From<&str> for CandleField {
    fn from(name: &str) -> Self {
        match name {
            "pair" => Self::Pair,
            "date" => Self::Date,
            "open" => Self::Open,
            "high" => Self::High,
            "low" => Self::Low,
            "close" => Self::Close,
            "volume" => Self::Volume,
            _ => Self::Ignored,
        }
    }
}

/// Field order used to parse candle groups, configured by the
/// `candle_format` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleFormat(Vec<CandleField>);

impl Default for CandleFormat {
    /// The order the engine uses when no `candle_format` was sent.
    fn default() -> Self {
        use CandleField::*;
        Self(vec![Pair, Date, High, Low, Open, Close, Volume])
    }
}

impl From<&str> for CandleFormat {
    fn from(value: &str) -> Self {
        Self(value.split(',').map(|name| CandleField::from(name.trim())).collect())
    }
}

/// Per-market candle history plus the parsing configuration and the
/// process-wide last-seen timestamp cursor.
#[derive(Debug, Default)]
pub struct CandleStore {
    format: CandleFormat,
    candles: HashMap<String, Vec<Candle>>,
    last_date: Option<DateTime<Utc>>,
}

impl CandleStore {
    /// Creates an empty store with the default wire format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the field order used for future batches.
    pub fn set_format(&mut self, format: CandleFormat) {
        self.format = format;
    }

    /// Parses a `;`-joined batch of `,`-joined candle groups and appends
    /// one candle per group, in input order.
    ///
    /// The whole batch is parsed before anything is stored, so a
    /// malformed group leaves the store untouched. On success the
    /// last-seen timestamp cursor follows the appended candles and the
    /// pair identifiers touched by the batch are returned, first-seen
    /// order, deduplicated.
    pub fn record_batch(&mut self, batch: &str) -> Result<Vec<String>> {
        let mut parsed = Vec::new();
        for group in batch.split(';') {
            parsed.push(self.parse_group(group)?);
        }

        let mut touched: Vec<String> = Vec::new();
        for (pair, candle) in parsed {
            self.last_date = Some(candle.date());
            self.candles.entry(pair.clone()).or_default().push(candle);
            if !touched.contains(&pair) {
                touched.push(pair);
            }
        }
        Ok(touched)
    }

    fn parse_group(&self, group: &str) -> Result<(String, Candle)> {
        let mut pair = None;
        let mut date = None;
        let mut open = None;
        let mut high = None;
        let mut low = None;
        let mut close = None;
        let mut volume = None;

        for (field, value) in self.format.0.iter().zip(group.split(',')) {
            match field {
                CandleField::Pair => pair = Some(value.to_string()),
                CandleField::Date => date = Some(parse_date(value)?),
                CandleField::Open => open = Some(parse_price(value, "open")?),
                CandleField::High => high = Some(parse_price(value, "high")?),
                CandleField::Low => low = Some(parse_price(value, "low")?),
                CandleField::Close => close = Some(parse_price(value, "close")?),
                CandleField::Volume => volume = Some(parse_volume(value)?),
                CandleField::Ignored => {}
            }
        }

        let missing = |field: &str| Error::MalformedInput(format!("candle group '{group}' is missing the {field} field"));
        let pair = pair.ok_or_else(|| missing("pair"))?;
        let date = date.ok_or_else(|| missing("date"))?;
        let open = open.ok_or_else(|| missing("open"))?;
        let high = high.ok_or_else(|| missing("high"))?;
        let low = low.ok_or_else(|| missing("low"))?;
        let close = close.ok_or_else(|| missing("close"))?;
        let volume = volume.ok_or_else(|| missing("volume"))?;

        Ok((pair, Candle::from((date, open, high, low, close, volume))))
    }

    /// Candle sequence for a market, oldest first.
    pub fn candles(&self, market_id: &str) -> Option<&[Candle]> {
        self.candles.get(market_id).map(Vec::as_slice)
    }

    /// Close of the most recently appended candle for the market.
    pub fn last_price(&self, market_id: &str) -> Result<f64> {
        self.candles
            .get(market_id)
            .and_then(|candles| candles.last())
            .map(Candle::close)
            .ok_or_else(|| Error::NoData(market_id.to_string()))
    }

    /// Timestamp of the most recently ingested candle across all markets.
    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.last_date
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    let seconds = value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::MalformedInput(format!("invalid candle date '{value}'")))?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::MalformedInput(format!("candle date '{value}' is out of range")))
}

fn parse_price(value: &str, field: &str) -> Result<f64> {
    let price = value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::MalformedInput(format!("invalid candle {field} '{value}'")))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::MalformedInput(format!("candle {field} '{value}' is not a positive number")));
    }
    Ok(price)
}

fn parse_volume(value: &str) -> Result<f64> {
    let volume = value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::MalformedInput(format!("invalid candle volume '{value}'")))?;
    if !volume.is_finite() || volume < 0.0 {
        return Err(Error::MalformedInput(format!("candle volume '{value}' is negative")));
    }
    Ok(volume)
}
