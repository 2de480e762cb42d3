//! Military factory efficiency curve.

use crate::config::FactoryRules;

/// One military factory and where it sits on its efficiency curve.
///
/// Efficiency grows towards the cap each day it produces and always stays in
/// `[minimum_efficiency, cap]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionUnit {
    rules: FactoryRules,
    efficiency_cap: f64,
    efficiency: f64,
    gain_multiplier: f64,
}

impl ProductionUnit {
    /// A factory that already exists at game start, running at its cap.
    pub fn mature(rules: FactoryRules) -> Self {
        Self {
            rules,
            efficiency_cap: rules.base_efficiency_cap,
            efficiency: rules.base_efficiency_cap,
            gain_multiplier: 1.0,
        }
    }

    /// A freshly built factory: minimum efficiency under the base cap, no
    /// gain bonus. Tech bonuses reach it at the next broadcast.
    pub fn new_build(rules: FactoryRules) -> Self {
        Self {
            rules,
            efficiency_cap: rules.base_efficiency_cap,
            efficiency: rules.minimum_efficiency,
            gain_multiplier: 1.0,
        }
    }

    /// Runs one day: grows efficiency, then returns today's output.
    pub fn produce(&mut self) -> f64 {
        if self.efficiency < self.efficiency_cap {
            let growth = self.efficiency_cap * self.efficiency_cap / self.efficiency
                * self.rules.base_efficiency_gain
                * self.gain_multiplier;
            self.efficiency = (self.efficiency + growth).min(self.efficiency_cap);
        }
        self.rules.output_per_factory * self.efficiency
    }

    /// Sets the cap to the base plus `bonus`. Replaces any earlier bonus.
    pub fn apply_efficiency_cap_bonus(&mut self, bonus: f64) {
        self.efficiency_cap =
            (self.rules.base_efficiency_cap + bonus).max(self.rules.minimum_efficiency);
        self.efficiency = self.efficiency.min(self.efficiency_cap);
    }

    pub fn apply_efficiency_gain_bonus(&mut self, bonus: f64) {
        // a negative multiplier would shrink efficiency below the minimum
        self.gain_multiplier = (1.0 + bonus).max(0.0);
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn efficiency_cap(&self) -> f64 {
        self.efficiency_cap
    }

    pub fn gain_multiplier(&self) -> f64 {
        self.gain_multiplier
    }
}
