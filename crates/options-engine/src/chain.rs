//! Options chain normalization.
//!
//! Raw rows from a [`ChainSource`] are coerced, priced at their implied
//! volatility and sorted by strike.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::black_scholes::{black_scholes_greeks, black_scholes_price, DAYS_PER_YEAR};
use crate::coerce::{coerce_f64, coerce_u64};
use crate::implied_vol::{implied_volatility_with_fallback, DEFAULT_FALLBACK_VOL};
use crate::numeric::round_to;
use crate::source::{ChainSource, RawChainSlice, RawOptionsChain, RawQuote};
use crate::telemetry;
use crate::types::{BSInputs, Greeks, OptionType};
use crate::Result;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
pub const DEFAULT_MAX_EXPIRATIONS: usize = 6;
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub risk_free_rate: f64,
    /// Volatility reported when none can be implied
    pub fallback_volatility: f64,
    /// Only the first N expirations listed by the source are processed
    pub max_expirations: usize,
    pub days_per_year: f64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            fallback_volatility: DEFAULT_FALLBACK_VOL,
            max_expirations: DEFAULT_MAX_EXPIRATIONS,
            days_per_year: DAYS_PER_YEAR,
        }
    }
}

/// A single contract after valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionQuote {
    pub strike: f64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
    pub theoretical_price: f64,
    pub greeks: Greeks,
    pub in_the_money: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationChain {
    pub calls: Vec<OptionQuote>,
    pub puts: Vec<OptionQuote>,
    pub time_to_expiration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsChain {
    pub symbol: String,
    pub current_price: f64,
    pub expiration_dates: Vec<String>,
    pub chains: BTreeMap<String, ExpirationChain>,
}

/// Years from `now` until midnight of `expiration`, counting whole days
/// (rounded down) as the upstream service does.
pub fn time_to_expiration(expiration: NaiveDate, now: NaiveDateTime, days_per_year: f64) -> Option<f64> {
    let expiry = expiration.and_hms_opt(0, 0, 0)?;
    let days = (expiry - now).num_seconds().div_euclid(86_400);
    Some(days as f64 / days_per_year)
}

pub fn parse_expiration(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), EXPIRATION_FORMAT).ok()
}

/// Normalize one raw row into a priced quote.
///
/// Rows whose strike coerces to zero or below are dropped instead of being
/// emitted with a zero strike and fallback IV; every other malformed field
/// takes its default. Untraded rows (last price not positive) and expired
/// slices keep the fallback IV, zero Greeks and a zero theoretical price.
pub fn normalize_quote(
    raw: &RawQuote,
    option_type: OptionType,
    spot: f64,
    time_to_expiration: f64,
    settings: &ChainSettings,
) -> Option<OptionQuote> {
    let strike = coerce_f64(&raw.strike, 0.0);
    if strike <= 0.0 {
        debug!(strike = ?raw.strike, "Skipping row without a usable strike");
        return None;
    }

    let last_price = coerce_f64(&raw.last_price, 0.0);

    let (implied_volatility, theoretical_price, greeks) = if last_price > 0.0 && time_to_expiration > 0.0 {
        let input = BSInputs::new(
            spot,
            strike,
            time_to_expiration,
            settings.risk_free_rate,
            0.0,
            option_type,
        );
        let iv = implied_volatility_with_fallback(last_price, input, settings.fallback_volatility);
        let priced = input.with_vol(iv);
        (iv, black_scholes_price(priced), black_scholes_greeks(priced))
    } else {
        (settings.fallback_volatility, 0.0, Greeks::zero())
    };

    counter!(telemetry::CHAIN_ROWS, "kind" => option_type.as_str()).increment(1);

    Some(OptionQuote {
        strike,
        last_price,
        bid: coerce_f64(&raw.bid, 0.0),
        ask: coerce_f64(&raw.ask, 0.0),
        volume: coerce_u64(&raw.volume, 0),
        open_interest: coerce_u64(&raw.open_interest, 0),
        implied_volatility,
        theoretical_price: round_to(theoretical_price, 2),
        greeks,
        in_the_money: option_type.in_the_money(spot, strike),
    })
}

fn normalize_side(rows: &[RawQuote], option_type: OptionType, spot: f64, time: f64, settings: &ChainSettings) -> Vec<OptionQuote> {
    let mut quotes: Vec<OptionQuote> = rows
        .iter()
        .filter_map(|row| normalize_quote(row, option_type, spot, time, settings))
        .collect();
    quotes.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    quotes
}

pub fn normalize_expiration(
    slice: &RawChainSlice,
    spot: f64,
    time_to_expiration: f64,
    settings: &ChainSettings,
) -> ExpirationChain {
    ExpirationChain {
        calls: normalize_side(&slice.calls, OptionType::Call, spot, time_to_expiration, settings),
        puts: normalize_side(&slice.puts, OptionType::Put, spot, time_to_expiration, settings),
        time_to_expiration,
    }
}

/// Normalize an already-fetched chain.
///
/// Returns `None` when the source listed no expirations or no usable spot
/// price. Expirations with no slice or an unparseable date are skipped.
pub fn normalize_chain(raw: &RawOptionsChain, now: NaiveDateTime, settings: &ChainSettings) -> Option<OptionsChain> {
    if raw.expiration_dates.is_empty() {
        info!(symbol = %raw.symbol, "No expirations available");
        return None;
    }

    let spot = coerce_f64(&raw.current_price, 0.0);
    if spot <= 0.0 {
        warn!(symbol = %raw.symbol, current_price = ?raw.current_price, "No usable spot price");
        return None;
    }

    let mut chains = BTreeMap::new();
    for date in raw.expiration_dates.iter().take(settings.max_expirations) {
        let Some(slice) = raw.chains.get(date) else {
            warn!(symbol = %raw.symbol, expiration = %date, "Expiration missing from chain, skipping");
            counter!(telemetry::CHAIN_EXPIRATIONS_SKIPPED).increment(1);
            continue;
        };
        let Some(time) = parse_expiration(date)
            .and_then(|expiry| time_to_expiration(expiry, now, settings.days_per_year))
        else {
            warn!(symbol = %raw.symbol, expiration = %date, "Unparseable expiration date, skipping");
            counter!(telemetry::CHAIN_EXPIRATIONS_SKIPPED).increment(1);
            continue;
        };

        chains.insert(date.clone(), normalize_expiration(slice, spot, time, settings));
    }

    Some(OptionsChain {
        symbol: raw.symbol.clone(),
        current_price: spot,
        expiration_dates: raw.expiration_dates.clone(),
        chains,
    })
}

/// Pull spot, expirations and up to `max_expirations` slices from `source`.
///
/// A failed slice is logged and left out; spot and expiration lookups
/// propagate their errors.
#[instrument(skip(source))]
pub async fn fetch_raw_chain(source: &dyn ChainSource, symbol: &str, max_expirations: usize) -> Result<RawOptionsChain> {
    let spot = source.spot_price(symbol).await?;
    let expiration_dates = source.expirations(symbol).await?;

    let mut chains = std::collections::HashMap::new();
    for date in expiration_dates.iter().take(max_expirations) {
        match source.chain(symbol, date).await {
            Ok(slice) => {
                chains.insert(date.clone(), slice);
            }
            Err(e) => {
                warn!(symbol, expiration = %date, error = %e, "Error fetching expiration, skipping");
                counter!(telemetry::CHAIN_EXPIRATIONS_SKIPPED).increment(1);
            }
        }
    }

    Ok(RawOptionsChain {
        symbol: symbol.to_uppercase(),
        current_price: Value::from(spot),
        expiration_dates,
        chains,
    })
}

/// Fetch and normalize a chain in one step.
pub async fn load_chain(
    source: &dyn ChainSource,
    symbol: &str,
    now: NaiveDateTime,
    settings: &ChainSettings,
) -> Result<Option<OptionsChain>> {
    let raw = fetch_raw_chain(source, symbol, settings.max_expirations).await?;
    Ok(normalize_chain(&raw, now, settings))
}
