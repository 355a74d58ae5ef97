//! Shared pricing types

use crate::numeric::round_to;
use serde::{Deserialize, Serialize};

/// Option class (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }

    /// Whether a contract of this class is in the money at `spot`
    pub fn in_the_money(&self, spot: f64, strike: f64) -> bool {
        match self {
            OptionType::Call => spot > strike,
            OptionType::Put => spot < strike,
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(format!("unknown option type: {}", s)),
        }
    }
}

/// Inputs for Black-Scholes pricing
#[derive(Debug, Clone, Copy)]
pub struct BSInputs {
    /// Spot price of the underlying
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to expiry (in years, may be <= 0 for expired contracts)
    pub time: f64,
    /// Volatility (as decimal, e.g., 0.2 = 20%)
    pub vol: f64,
    /// Continuously compounded risk-free rate
    pub rate: f64,
    /// Option type
    pub option_type: OptionType,
}

impl BSInputs {
    pub fn new(
        spot: f64,
        strike: f64,
        time: f64,
        rate: f64,
        vol: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time,
            vol,
            rate,
            option_type,
        }
    }

    pub fn with_vol(self, vol: f64) -> Self {
        Self { vol, ..self }
    }

    pub fn is_expired(&self) -> bool {
        self.time <= 0.0
    }
}

/// Option Greeks
///
/// Theta is per calendar day, vega and rho per one percentage point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: ∂V/∂S (rate of change with spot)
    pub delta: f64,
    /// Gamma: ∂²V/∂S² (curvature of delta)
    pub gamma: f64,
    /// Theta: ∂V/∂t (time decay per day)
    pub theta: f64,
    /// Vega: ∂V/∂σ (per 1% volatility)
    pub vega: f64,
    /// Rho: ∂V/∂r (per 1% rate)
    pub rho: f64,
}

impl Greeks {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn rounded(self, decimals: i32) -> Self {
        Self {
            delta: round_to(self.delta, decimals),
            gamma: round_to(self.gamma, decimals),
            theta: round_to(self.theta, decimals),
            vega: round_to(self.vega, decimals),
            rho: round_to(self.rho, decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_parse() {
        assert_eq!("call".parse::<OptionType>(), Ok(OptionType::Call));
        assert_eq!("PUT".parse::<OptionType>(), Ok(OptionType::Put));
        assert!("straddle".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_in_the_money() {
        assert!(OptionType::Call.in_the_money(110.0, 100.0));
        assert!(!OptionType::Call.in_the_money(100.0, 100.0));
        assert!(OptionType::Put.in_the_money(90.0, 100.0));
        assert!(!OptionType::Put.in_the_money(110.0, 100.0));
    }

    #[test]
    fn test_option_type_serde() {
        let json = serde_json::to_string(&OptionType::Put).unwrap();
        assert_eq!(json, "\"put\"");
    }
}
