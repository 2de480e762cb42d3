//! Economic mobilisation laws.
//!
//! A country climbs the ladder one rung at a time. Each rung costs political
//! power and needs enough war support; reaching it lowers consumer goods and
//! changes construction speed.

use serde::{Deserialize, Serialize};

/// One rung of the mobilisation ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyLaw {
    pub name: String,
    /// War support needed to adopt this law.
    pub war_support: f64,
    pub political_power_cost: f64,
    /// Share of all factories diverted to consumer goods.
    pub consumer_goods: f64,
    pub civilian_construction: f64,
    pub military_construction: f64,
}

impl EconomyLaw {
    fn new(
        name: &str,
        war_support: f64,
        consumer_goods: f64,
        civilian_construction: f64,
        military_construction: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            war_support,
            political_power_cost: 150.0,
            consumer_goods,
            civilian_construction,
            military_construction,
        }
    }
}

/// Civilian economy through war economy.
pub fn default_ladder() -> Vec<EconomyLaw> {
    vec![
        EconomyLaw::new("civilian_economy", 0.0, 0.35, -0.3, -0.3),
        EconomyLaw::new("early_mobilization", 0.15, 0.30, -0.1, -0.1),
        EconomyLaw::new("partial_economic_mobilisation", 0.25, 0.25, 0.0, 0.1),
        EconomyLaw::new("war_economy", 0.5, 0.20, 0.0, 0.2),
    ]
}

/// Where a country currently sits on the ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EconomyState {
    level: usize,
    political_power: f64,
}

impl EconomyState {
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn political_power(&self) -> f64 {
        self.political_power
    }

    /// Accrues one day of political power, then moves up at most one rung.
    ///
    /// Political power is checked but never spent, so once enough has
    /// accumulated only war support holds a country back.
    /// Returns `true` when the level changed.
    pub fn daily_update(&mut self, gain: f64, war_support: f64, ladder: &[EconomyLaw]) -> bool {
        self.political_power += gain;
        let Some(next) = ladder.get(self.level + 1) else {
            return false;
        };
        if next.political_power_cost <= self.political_power && next.war_support <= war_support {
            self.level += 1;
            true
        } else {
            false
        }
    }
}
