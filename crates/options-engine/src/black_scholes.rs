use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use crate::types::{BSInputs, Greeks, OptionType};

pub const DAYS_PER_YEAR: f64 = 365.0;
pub const GREEKS_DECIMALS: i32 = 4;

pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

pub fn d1_d2(input: &BSInputs) -> (f64, f64) {
    let s = input.spot;
    let k = input.strike;
    let t = input.time;
    let v = input.vol;
    let r = input.rate;

    let vol_sqrt_t = v * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * v * v) * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    (d1, d2)
}

pub fn intrinsic_value(spot: f64, strike: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => (spot - strike).max(0.0),
        OptionType::Put => (strike - spot).max(0.0),
    }
}

/// European option value; intrinsic value once `time <= 0`.
pub fn black_scholes_price(input: BSInputs) -> f64 {
    if input.is_expired() {
        return intrinsic_value(input.spot, input.strike, input.option_type);
    }

    let (d1, d2) = d1_d2(&input);
    let s = input.spot;
    let k = input.strike;
    let t = input.time;
    let r = input.rate;

    let price = match input.option_type {
        OptionType::Call => s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2),
        OptionType::Put => k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1),
    };

    price.max(0.0)
}

/// Delta/gamma/theta/vega/rho rounded to four decimals.
///
/// Expired contracts only carry delta: 1 for an in-the-money call, -1 for an
/// in-the-money put.
pub fn black_scholes_greeks(input: BSInputs) -> Greeks {
    if input.is_expired() {
        let delta = match input.option_type {
            OptionType::Call if input.spot > input.strike => 1.0,
            OptionType::Put if input.spot < input.strike => -1.0,
            _ => 0.0,
        };
        return Greeks {
            delta,
            ..Greeks::zero()
        };
    }

    let (d1, d2) = d1_d2(&input);
    let s = input.spot;
    let k = input.strike;
    let t = input.time;
    let v = input.vol;
    let r = input.rate;

    let pdf = norm_pdf(d1);
    let sqrt_t = t.sqrt();
    let discount = (-r * t).exp();

    let delta = match input.option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => norm_cdf(d1) - 1.0,
    };

    let gamma = pdf / (s * v * sqrt_t);

    let vega = s * pdf * sqrt_t / 100.0;

    let decay = -(s * pdf * v) / (2.0 * sqrt_t);
    let theta = match input.option_type {
        OptionType::Call => (decay - r * k * discount * norm_cdf(d2)) / DAYS_PER_YEAR,
        OptionType::Put => (decay + r * k * discount * norm_cdf(-d2)) / DAYS_PER_YEAR,
    };

    let rho = match input.option_type {
        OptionType::Call => k * t * discount * norm_cdf(d2) / 100.0,
        OptionType::Put => -k * t * discount * norm_cdf(-d2) / 100.0,
    };

    Greeks {
        delta,
        gamma,
        theta,
        vega,
        rho,
    }
    .rounded(GREEKS_DECIMALS)
}
