//! Catalog of canonical strategy shapes.
//!
//! Option legs carry no strike or premium; callers fill them in from a chain.

use serde::Serialize;

use crate::strategy::{LegAction, LegKind, StrategyLeg};

pub const SHARES_PER_STOCK_LEG: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct StrategyTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub legs: Vec<StrategyLeg>,
}

fn skeleton(action: LegAction, kind: LegKind) -> StrategyLeg {
    StrategyLeg {
        action,
        kind,
        strike: None,
        premium: None,
        contracts: 1,
        shares: None,
    }
}

pub fn strategy_templates() -> Vec<StrategyTemplate> {
    use LegAction::{Buy, Sell};
    use LegKind::{Call, Put};

    vec![
        StrategyTemplate {
            id: "long_call",
            name: "Long Call",
            description: "Bullish strategy with unlimited upside potential",
            legs: vec![skeleton(Buy, Call)],
        },
        StrategyTemplate {
            id: "long_put",
            name: "Long Put",
            description: "Bearish strategy with limited risk",
            legs: vec![skeleton(Buy, Put)],
        },
        StrategyTemplate {
            id: "covered_call",
            name: "Covered Call",
            description: "Generate income from stock holdings",
            legs: vec![skeleton(Sell, Call), StrategyLeg::stock(SHARES_PER_STOCK_LEG)],
        },
        StrategyTemplate {
            id: "protective_put",
            name: "Protective Put",
            description: "Protect stock holdings from downside",
            legs: vec![skeleton(Buy, Put), StrategyLeg::stock(SHARES_PER_STOCK_LEG)],
        },
        StrategyTemplate {
            id: "bull_call_spread",
            name: "Bull Call Spread",
            description: "Limited risk, limited reward bullish strategy",
            legs: vec![skeleton(Buy, Call), skeleton(Sell, Call)],
        },
        StrategyTemplate {
            id: "bear_put_spread",
            name: "Bear Put Spread",
            description: "Limited risk, limited reward bearish strategy",
            legs: vec![skeleton(Buy, Put), skeleton(Sell, Put)],
        },
        StrategyTemplate {
            id: "long_straddle",
            name: "Long Straddle",
            description: "Profit from high volatility in either direction",
            legs: vec![skeleton(Buy, Call), skeleton(Buy, Put)],
        },
        StrategyTemplate {
            id: "iron_condor",
            name: "Iron Condor",
            description: "Profit from low volatility with limited risk",
            legs: vec![
                skeleton(Sell, Put),
                skeleton(Buy, Put),
                skeleton(Sell, Call),
                skeleton(Buy, Call),
            ],
        },
    ]
}

pub fn template(id: &str) -> Option<StrategyTemplate> {
    strategy_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_strategies() {
        let ids: Vec<&str> = strategy_templates().iter().map(|t| t.id).collect();
        assert_eq!(
            ids,
            vec![
                "long_call",
                "long_put",
                "covered_call",
                "protective_put",
                "bull_call_spread",
                "bear_put_spread",
                "long_straddle",
                "iron_condor"
            ]
        );
    }

    #[test]
    fn test_option_legs_are_placeholders() {
        for template in strategy_templates() {
            for leg in template.legs.iter().filter(|l| l.is_option()) {
                assert!(leg.strike.is_none() && leg.premium.is_none());
                assert_eq!(leg.contracts, 1);
            }
        }
    }

    #[test]
    fn test_covered_call_holds_stock() {
        let covered = template("covered_call").unwrap();
        let stock = &covered.legs[1];
        assert_eq!(stock.kind, LegKind::Stock);
        assert_eq!(stock.action, LegAction::Hold);
        assert_eq!(stock.shares, Some(100));
    }

    #[test]
    fn test_unknown_template() {
        assert!(template("butterfly").is_none());
        assert_eq!(template("iron_condor").unwrap().legs.len(), 4);
    }
}
