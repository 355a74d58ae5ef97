//! Multi-leg strategy payoff and risk summary at expiration.

use metrics::counter;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::black_scholes::intrinsic_value;
use crate::error::EngineError;
use crate::numeric::{linspace, round_to};
use crate::telemetry;
use crate::types::OptionType;
use crate::Result;

pub const CONTRACT_MULTIPLIER: u32 = 100;
pub const DEFAULT_SWEEP_LOW: f64 = 0.7;
pub const DEFAULT_SWEEP_HIGH: f64 = 1.3;
pub const DEFAULT_SWEEP_POINTS: usize = 100;
pub const DEFAULT_DIAGRAM_STEP: f64 = 0.01;
pub const MIN_SWEEP_POINTS: usize = 2;
pub const MAX_DIAGRAM_POINTS: usize = 10_001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    Call,
    Put,
    Stock,
}

impl LegKind {
    pub fn option_type(&self) -> Option<OptionType> {
        match self {
            LegKind::Call => Some(OptionType::Call),
            LegKind::Put => Some(OptionType::Put),
            LegKind::Stock => None,
        }
    }
}

fn default_contracts() -> u32 {
    1
}

/// One position in a strategy.
///
/// Strike and premium stay `None` in template skeletons and on stock legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyLeg {
    pub action: LegAction,
    #[serde(rename = "type")]
    pub kind: LegKind,
    #[serde(default)]
    pub strike: Option<f64>,
    #[serde(default)]
    pub premium: Option<f64>,
    #[serde(default = "default_contracts")]
    pub contracts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u32>,
}

impl StrategyLeg {
    pub fn option(action: LegAction, option_type: OptionType, strike: f64, premium: f64, contracts: u32) -> Self {
        let kind = match option_type {
            OptionType::Call => LegKind::Call,
            OptionType::Put => LegKind::Put,
        };
        Self {
            action,
            kind,
            strike: Some(strike),
            premium: Some(premium),
            contracts,
            shares: None,
        }
    }

    pub fn stock(shares: u32) -> Self {
        Self {
            action: LegAction::Hold,
            kind: LegKind::Stock,
            strike: None,
            premium: None,
            contracts: default_contracts(),
            shares: Some(shares),
        }
    }

    /// Option legs contribute to payoff; held stock does not.
    pub fn is_option(&self) -> bool {
        self.action != LegAction::Hold && self.kind != LegKind::Stock
    }

    fn direction(&self) -> f64 {
        match self.action {
            LegAction::Sell => 1.0,
            LegAction::Buy | LegAction::Hold => -1.0,
        }
    }

    pub fn validate(&self, index: usize) -> Result<()> {
        if !self.is_option() {
            return Ok(());
        }
        match self.strike {
            Some(strike) if strike.is_finite() && strike > 0.0 => {}
            Some(_) => return Err(EngineError::invalid_leg(index, "strike must be positive")),
            None => return Err(EngineError::invalid_leg(index, "strike is required")),
        }
        match self.premium {
            Some(premium) if premium.is_finite() => {}
            Some(_) => return Err(EngineError::invalid_leg(index, "premium must be finite")),
            None => return Err(EngineError::invalid_leg(index, "premium is required")),
        }
        if self.contracts == 0 {
            return Err(EngineError::invalid_leg(index, "contracts must be at least 1"));
        }
        Ok(())
    }

    /// Profit or loss of this leg at expiration with the underlying at `spot`
    pub fn payoff_at(&self, spot: f64, multiplier: f64) -> f64 {
        let (Some(option_type), Some(strike), Some(premium)) = (self.kind.option_type(), self.strike, self.premium) else {
            return 0.0;
        };
        if !self.is_option() {
            return 0.0;
        }

        let intrinsic = intrinsic_value(spot, strike, option_type);
        let per_share = match self.action {
            LegAction::Buy => intrinsic - premium,
            LegAction::Sell => premium - intrinsic,
            LegAction::Hold => 0.0,
        };
        per_share * f64::from(self.contracts) * multiplier
    }
}

pub fn validate_legs(legs: &[StrategyLeg]) -> Result<()> {
    legs.iter().enumerate().try_for_each(|(i, leg)| leg.validate(i))
}

/// A max-profit / max-loss figure, serialized as a number or `"Unlimited"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayoffBound {
    Finite(f64),
    Unlimited,
}

impl PayoffBound {
    pub fn value(&self) -> Option<f64> {
        match self {
            PayoffBound::Finite(v) => Some(*v),
            PayoffBound::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, PayoffBound::Unlimited)
    }
}

impl Serialize for PayoffBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PayoffBound::Finite(v) => serializer.serialize_f64(*v),
            PayoffBound::Unlimited => serializer.serialize_str("Unlimited"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysis {
    pub max_profit: PayoffBound,
    pub max_loss: PayoffBound,
    pub breakevens: Vec<f64>,
    pub net_premium: f64,
    pub spot_range: Vec<f64>,
    pub payoffs: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffDiagram {
    pub current_price: f64,
    pub spot_range: Vec<f64>,
    pub payoffs: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategySettings {
    /// Lower sweep bound as a fraction of the current price
    pub sweep_low: f64,
    /// Upper sweep bound as a fraction of the current price
    pub sweep_high: f64,
    pub sweep_points: usize,
    /// Diagram sampling step as a fraction of the current price
    pub diagram_step: f64,
    pub contract_multiplier: u32,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            sweep_low: DEFAULT_SWEEP_LOW,
            sweep_high: DEFAULT_SWEEP_HIGH,
            sweep_points: DEFAULT_SWEEP_POINTS,
            diagram_step: DEFAULT_DIAGRAM_STEP,
            contract_multiplier: CONTRACT_MULTIPLIER,
        }
    }
}

/// Total payoff of all option legs at each spot, `multiplier` shares per contract
pub fn payoff_with_multiplier(legs: &[StrategyLeg], spots: &[f64], multiplier: u32) -> Vec<f64> {
    let multiplier = f64::from(multiplier);
    spots
        .iter()
        .map(|&spot| legs.iter().map(|leg| leg.payoff_at(spot, multiplier)).sum())
        .collect()
}

pub fn payoff(legs: &[StrategyLeg], spots: &[f64]) -> Vec<f64> {
    payoff_with_multiplier(legs, spots, CONTRACT_MULTIPLIER)
}

/// Spots where the sampled payoff crosses zero, linearly interpolated
pub fn find_breakevens(spots: &[f64], payoffs: &[f64]) -> Vec<f64> {
    spots
        .windows(2)
        .zip(payoffs.windows(2))
        .filter(|(_, p)| (p[0] <= 0.0 && p[1] > 0.0) || (p[0] >= 0.0 && p[1] < 0.0))
        .map(|(s, p)| round_to(s[0] + (s[1] - s[0]) * (-p[0] / (p[1] - p[0])), 2))
        .collect()
}

/// Premium received (positive) or paid (negative) per share across option legs
pub fn net_premium(legs: &[StrategyLeg]) -> f64 {
    legs.iter()
        .filter(|leg| leg.is_option())
        .map(|leg| leg.premium.unwrap_or(0.0) * f64::from(leg.contracts) * leg.direction())
        .sum()
}

/// Payoff slope per unit of spot once the spot is above every strike.
///
/// Only calls contribute: long calls add, short calls subtract.
pub fn upside_slope(legs: &[StrategyLeg]) -> f64 {
    legs.iter()
        .filter(|leg| leg.is_option() && leg.kind == LegKind::Call)
        .map(|leg| -leg.direction() * f64::from(leg.contracts))
        .sum()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyAnalyzer {
    settings: StrategySettings,
}

impl StrategyAnalyzer {
    pub fn new(settings: StrategySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    /// Analysis sweep; always samples at least both ends of the range
    pub fn sweep(&self, current_price: f64) -> Vec<f64> {
        linspace(
            current_price * self.settings.sweep_low,
            current_price * self.settings.sweep_high,
            self.settings.sweep_points.max(MIN_SWEEP_POINTS),
        )
    }

    /// Sweep at `diagram_step` granularity of the current price.
    ///
    /// A zero, negative or non-finite step degrades to the two end points;
    /// very small steps are capped at `MAX_DIAGRAM_POINTS`.
    pub fn diagram_sweep(&self, current_price: f64) -> Vec<f64> {
        let span = self.settings.sweep_high - self.settings.sweep_low;
        let intervals = span / self.settings.diagram_step;
        let points = if intervals.is_finite() && intervals >= 1.0 {
            (intervals.round() as usize).min(MAX_DIAGRAM_POINTS - 1) + 1
        } else {
            MIN_SWEEP_POINTS
        };
        linspace(
            current_price * self.settings.sweep_low,
            current_price * self.settings.sweep_high,
            points,
        )
    }

    pub fn analyze(&self, legs: &[StrategyLeg], current_price: f64) -> StrategyAnalysis {
        counter!(telemetry::STRATEGY_ANALYSES).increment(1);

        let spot_range = self.sweep(current_price);
        let payoffs = payoff_with_multiplier(legs, &spot_range, self.settings.contract_multiplier);

        let sampled_max = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let sampled_min = payoffs.iter().copied().fold(f64::INFINITY, f64::min);

        // Calls keep paying (or costing) above the sweep; puts are capped at zero spot
        let slope = upside_slope(legs);
        let max_profit = if slope > 0.0 || !sampled_max.is_finite() {
            PayoffBound::Unlimited
        } else {
            PayoffBound::Finite(round_to(sampled_max, 2))
        };
        let max_loss = if slope < 0.0 || !sampled_min.is_finite() {
            PayoffBound::Unlimited
        } else {
            PayoffBound::Finite(round_to(sampled_min, 2))
        };

        let breakevens = find_breakevens(&spot_range, &payoffs);
        debug!(legs = legs.len(), current_price, ?breakevens, "Strategy analyzed");

        StrategyAnalysis {
            max_profit,
            max_loss,
            breakevens,
            net_premium: round_to(net_premium(legs), 2),
            spot_range,
            payoffs,
        }
    }

    pub fn payoff_diagram(&self, legs: &[StrategyLeg], current_price: f64) -> PayoffDiagram {
        let spot_range = self.diagram_sweep(current_price);
        let payoffs = payoff_with_multiplier(legs, &spot_range, self.settings.contract_multiplier);
        PayoffDiagram {
            current_price,
            spot_range,
            payoffs,
        }
    }
}

/// Analyze with the default 0.7×–1.3× sweep of 100 points
pub fn analyze_strategy(legs: &[StrategyLeg], current_price: f64) -> StrategyAnalysis {
    StrategyAnalyzer::default().analyze(legs, current_price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn bull_call_spread() -> Vec<StrategyLeg> {
        vec![
            StrategyLeg::option(LegAction::Buy, OptionType::Call, 95.0, 5.0, 1),
            StrategyLeg::option(LegAction::Sell, OptionType::Call, 105.0, 2.0, 1),
        ]
    }

    #[test]
    fn test_bull_call_spread_summary() {
        let analysis = analyze_strategy(&bull_call_spread(), 100.0);

        assert_eq!(analysis.max_profit, PayoffBound::Finite(700.0));
        assert_eq!(analysis.max_loss, PayoffBound::Finite(-300.0));
        assert_eq!(analysis.breakevens, vec![98.0]);
        assert_eq!(analysis.net_premium, -3.0);
        assert_eq!(analysis.spot_range.len(), 100);
        assert_eq!(analysis.payoffs.len(), 100);
    }

    #[test]
    fn test_long_straddle_minimum_at_strike() {
        let legs = vec![
            StrategyLeg::option(LegAction::Buy, OptionType::Call, 100.0, 4.0, 1),
            StrategyLeg::option(LegAction::Buy, OptionType::Put, 100.0, 3.5, 1),
        ];
        let spots = [80.0, 90.0, 99.0, 100.0, 101.0, 110.0, 125.0];
        let payoffs = payoff(&legs, &spots);

        for (spot, value) in spots.iter().zip(&payoffs) {
            let expected = ((spot - 100.0f64).max(0.0) + (100.0 - spot).max(0.0) - 7.5) * 100.0;
            assert!((value - expected).abs() < 1e-9);
        }
        let min = payoffs.iter().copied().fold(f64::INFINITY, f64::min);
        assert!((min - (-750.0)).abs() < 1e-9);
        assert!((payoffs[3] - (-750.0)).abs() < 1e-9);
    }

    #[test]
    fn test_long_straddle_two_breakevens() {
        let legs = vec![
            StrategyLeg::option(LegAction::Buy, OptionType::Call, 100.0, 4.0, 1),
            StrategyLeg::option(LegAction::Buy, OptionType::Put, 100.0, 3.5, 1),
        ];
        let analysis = analyze_strategy(&legs, 100.0);
        assert_eq!(analysis.breakevens.len(), 2);
        assert!((analysis.breakevens[0] - 92.5).abs() < 1e-9);
        assert!((analysis.breakevens[1] - 107.5).abs() < 1e-9);
        assert!(analysis.max_profit.is_unlimited());
        assert_eq!(analysis.net_premium, -7.5);
    }

    #[test]
    fn test_naked_short_call_loss_unlimited() {
        let legs = vec![StrategyLeg::option(LegAction::Sell, OptionType::Call, 100.0, 3.0, 2)];
        let analysis = analyze_strategy(&legs, 100.0);
        assert!(analysis.max_loss.is_unlimited());
        assert_eq!(analysis.max_profit, PayoffBound::Finite(600.0));
        assert_eq!(analysis.net_premium, 6.0);
    }

    #[test]
    fn test_long_put_is_bounded() {
        let legs = vec![StrategyLeg::option(LegAction::Buy, OptionType::Put, 100.0, 2.0, 1)];
        let analysis = analyze_strategy(&legs, 100.0);
        assert_eq!(analysis.max_profit, PayoffBound::Finite(2800.0));
        assert_eq!(analysis.max_loss, PayoffBound::Finite(-200.0));
        assert_eq!(analysis.breakevens, vec![98.0]);
    }

    #[test]
    fn test_stock_legs_ignored() {
        let covered_call = vec![
            StrategyLeg::option(LegAction::Sell, OptionType::Call, 110.0, 2.0, 1),
            StrategyLeg::stock(100),
        ];
        let spots = [90.0, 120.0];
        let with_stock = payoff(&covered_call, &spots);
        let without_stock = payoff(&covered_call[..1], &spots);
        assert_eq!(with_stock, without_stock);
        assert_eq!(net_premium(&covered_call), 2.0);
    }

    #[test]
    fn test_contracts_scale_payoff() {
        let one = payoff(&[StrategyLeg::option(LegAction::Buy, OptionType::Call, 100.0, 1.0, 1)], &[110.0]);
        let three = payoff(&[StrategyLeg::option(LegAction::Buy, OptionType::Call, 100.0, 1.0, 3)], &[110.0]);
        assert_eq!(one, vec![900.0]);
        assert_eq!(three, vec![2700.0]);
    }

    #[test]
    fn test_breakeven_interpolation() {
        let spots = [1.0, 2.0, 3.0, 4.0];
        let payoffs = [-10.0, -5.0, 5.0, 10.0];
        assert_eq!(find_breakevens(&spots, &payoffs), vec![2.5]);

        // Touching zero then going negative counts once
        let payoffs = [5.0, 0.0, -5.0, -10.0];
        assert_eq!(find_breakevens(&spots, &payoffs), vec![2.0]);
    }

    #[test]
    fn test_payoff_diagram_one_percent_steps() {
        let analyzer = StrategyAnalyzer::default();
        let diagram = analyzer.payoff_diagram(&bull_call_spread(), 200.0);
        assert_eq!(diagram.spot_range.len(), 61);
        assert!((diagram.spot_range[1] - diagram.spot_range[0] - 2.0).abs() < 1e-9);
        assert_eq!(diagram.spot_range[0], 140.0);
        assert_eq!(diagram.spot_range[60], 260.0);
    }

    #[test]
    fn test_degenerate_diagram_step_uses_end_points() {
        for step in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            let analyzer = StrategyAnalyzer::new(StrategySettings {
                diagram_step: step,
                ..StrategySettings::default()
            });
            let diagram = analyzer.payoff_diagram(&bull_call_spread(), 100.0);
            assert_eq!(diagram.spot_range, vec![70.0, 130.0]);
            assert_eq!(diagram.payoffs.len(), 2);
        }
    }

    #[test]
    fn test_tiny_diagram_step_is_capped() {
        let analyzer = StrategyAnalyzer::new(StrategySettings {
            diagram_step: 1e-12,
            ..StrategySettings::default()
        });
        assert_eq!(analyzer.diagram_sweep(100.0).len(), MAX_DIAGRAM_POINTS);
    }

    #[test]
    fn test_short_sweep_still_bounds_long_put() {
        let legs = vec![StrategyLeg::option(LegAction::Buy, OptionType::Put, 100.0, 2.0, 1)];
        for sweep_points in [0, 1] {
            let analyzer = StrategyAnalyzer::new(StrategySettings {
                sweep_points,
                ..StrategySettings::default()
            });
            let analysis = analyzer.analyze(&legs, 100.0);
            assert_eq!(analysis.spot_range.len(), MIN_SWEEP_POINTS);
            assert_eq!(analysis.max_profit, PayoffBound::Finite(2800.0));
            assert_eq!(analysis.max_loss, PayoffBound::Finite(-200.0));
        }
    }

    #[test]
    fn test_custom_multiplier() {
        let analyzer = StrategyAnalyzer::new(StrategySettings {
            contract_multiplier: 10,
            ..StrategySettings::default()
        });
        let analysis = analyzer.analyze(&bull_call_spread(), 100.0);
        assert_eq!(analysis.max_profit, PayoffBound::Finite(70.0));
    }

    #[test]
    fn test_leg_validation() {
        assert!(validate_legs(&bull_call_spread()).is_ok());
        assert!(validate_legs(&[StrategyLeg::stock(100)]).is_ok());

        let missing: StrategyLeg = serde_json::from_value(json!({"action": "buy", "type": "call", "premium": 1.0})).unwrap();
        assert_matches!(
            validate_legs(&[StrategyLeg::stock(100), missing]),
            Err(EngineError::InvalidLeg { index: 1, .. })
        );

        let zero = StrategyLeg::option(LegAction::Sell, OptionType::Put, 90.0, 1.0, 0);
        assert_matches!(zero.validate(0), Err(EngineError::InvalidLeg { .. }));
    }

    #[test]
    fn test_leg_deserialize_defaults() {
        let leg: StrategyLeg = serde_json::from_value(json!({
            "action": "sell", "type": "put", "strike": 95.0, "premium": 1.25
        }))
        .unwrap();
        assert_eq!(leg.contracts, 1);
        assert_eq!(leg.kind, LegKind::Put);
        assert!(leg.is_option());
    }

    #[test]
    fn test_unlimited_serializes_as_label() {
        let analysis = analyze_strategy(
            &[StrategyLeg::option(LegAction::Buy, OptionType::Call, 100.0, 3.0, 1)],
            100.0,
        );
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["maxProfit"], "Unlimited");
        assert_eq!(json["maxLoss"], json!(-300.0));
        assert!(json["spotRange"].is_array());
    }
}
