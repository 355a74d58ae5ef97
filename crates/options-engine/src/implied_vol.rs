//! Implied volatility by bracketed root-finding on the Black-Scholes price.

use metrics::counter;
use tracing::debug;

use crate::black_scholes::black_scholes_price;
use crate::numeric::round_to;
use crate::telemetry;
use crate::types::BSInputs;

pub const MIN_VOL: f64 = 0.001;
pub const MAX_VOL: f64 = 5.0;
pub const VOL_TOLERANCE: f64 = 1e-6;
pub const MAX_ITERATIONS: usize = 100;
pub const DEFAULT_FALLBACK_VOL: f64 = 0.20;
pub const IV_DECIMALS: i32 = 4;

/// Brent's method on `[lower, upper]`.
///
/// Returns `None` when the endpoints do not bracket a sign change or the
/// bracket has not shrunk below `tolerance` after `max_iterations` steps.
pub fn brent_root<F>(f: F, lower: f64, upper: f64, tolerance: f64, max_iterations: usize) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lower, upper);
    let (mut fa, mut fb) = (f(a), f(b));

    if !fa.is_finite() || !fb.is_finite() || fa * fb > 0.0 {
        return None;
    }
    if fa == 0.0 {
        return Some(a);
    }
    if fb == 0.0 {
        return Some(b);
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iterations {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * tolerance;
        let midpoint = 0.5 * (c - b);
        if midpoint.abs() <= tol || fb == 0.0 {
            return Some(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Secant or inverse quadratic interpolation
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * midpoint * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * midpoint * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * midpoint * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = midpoint;
                e = d;
            }
        } else {
            d = midpoint;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(midpoint) };
        fb = f(b);
        if !fb.is_finite() {
            return None;
        }
    }

    None
}

/// Raw solve over `[MIN_VOL, MAX_VOL]`, `None` when no root is bracketed or
/// the solver does not converge. `input.vol` is ignored.
pub fn solve_implied_volatility(market_price: f64, input: BSInputs) -> Option<f64> {
    if input.is_expired() {
        return None;
    }

    brent_root(
        |vol| black_scholes_price(input.with_vol(vol)) - market_price,
        MIN_VOL,
        MAX_VOL,
        VOL_TOLERANCE,
        MAX_ITERATIONS,
    )
}

/// Implied volatility rounded to four decimals, falling back to 20%.
pub fn implied_volatility(market_price: f64, input: BSInputs) -> f64 {
    implied_volatility_with_fallback(market_price, input, DEFAULT_FALLBACK_VOL)
}

/// Implied volatility rounded to four decimals.
///
/// Expired contracts yield 0.0; an unsolvable price yields `fallback`.
pub fn implied_volatility_with_fallback(market_price: f64, input: BSInputs, fallback: f64) -> f64 {
    if input.is_expired() {
        counter!(telemetry::IV_SOLVES, "outcome" => "expired").increment(1);
        return 0.0;
    }

    match solve_implied_volatility(market_price, input) {
        Some(vol) => {
            counter!(telemetry::IV_SOLVES, "outcome" => "converged").increment(1);
            round_to(vol, IV_DECIMALS)
        }
        None => {
            counter!(telemetry::IV_SOLVES, "outcome" => "fallback").increment(1);
            debug!(
                market_price,
                spot = input.spot,
                strike = input.strike,
                option_type = input.option_type.as_str(),
                fallback,
                "Implied volatility not bracketed, using fallback"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;

    fn inputs(option_type: OptionType) -> BSInputs {
        BSInputs::new(100.0, 100.0, 1.0, 0.05, 0.0, option_type)
    }

    #[test]
    fn test_brent_finds_sqrt_two() {
        let root = brent_root(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 100).unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_brent_requires_bracket() {
        assert_eq!(brent_root(|x| x * x + 1.0, -1.0, 1.0, 1e-9, 100), None);
    }

    #[test]
    fn test_brent_endpoint_root() {
        assert_eq!(brent_root(|x| x - 1.0, 1.0, 3.0, 1e-9, 100), Some(1.0));
    }

    #[test]
    fn test_implied_vol_roundtrip() {
        for option_type in [OptionType::Call, OptionType::Put] {
            for &vol in &[0.05, 0.1, 0.2, 0.35, 0.5, 0.8, 1.2, 1.9] {
                let price = black_scholes_price(inputs(option_type).with_vol(vol));
                let recovered = implied_volatility(price, inputs(option_type));
                assert!(
                    (recovered - vol).abs() < 1e-4,
                    "{:?} σ={} recovered {}",
                    option_type,
                    vol,
                    recovered
                );
            }
        }
    }

    #[test]
    fn test_implied_vol_off_the_money() {
        let input = BSInputs::new(100.0, 120.0, 0.5, 0.03, 0.0, OptionType::Call);
        let price = black_scholes_price(input.with_vol(0.42));
        let recovered = implied_volatility(price, input);
        assert!((recovered - 0.42).abs() < 1e-4);
    }

    #[test]
    fn test_expired_contract_has_zero_iv() {
        let input = BSInputs::new(100.0, 100.0, 0.0, 0.05, 0.0, OptionType::Call);
        assert_eq!(implied_volatility(3.0, input), 0.0);
        assert_eq!(solve_implied_volatility(3.0, input), None);
    }

    #[test]
    fn test_price_below_intrinsic_falls_back() {
        // A call trading below its discounted intrinsic value has no solution
        let input = BSInputs::new(150.0, 100.0, 1.0, 0.05, 0.0, OptionType::Call);
        assert_eq!(solve_implied_volatility(1.0, input), None);
        assert_eq!(implied_volatility(1.0, input), DEFAULT_FALLBACK_VOL);
    }

    #[test]
    fn test_price_above_spot_falls_back() {
        let input = inputs(OptionType::Call);
        assert_eq!(implied_volatility(250.0, input), DEFAULT_FALLBACK_VOL);
        assert_eq!(implied_volatility_with_fallback(250.0, input, 0.35), 0.35);
    }

    #[test]
    fn test_result_is_rounded() {
        let input = inputs(OptionType::Put);
        let price = black_scholes_price(input.with_vol(0.123456));
        let recovered = implied_volatility(price, input);
        assert_eq!(recovered, 0.1235);
    }
}
