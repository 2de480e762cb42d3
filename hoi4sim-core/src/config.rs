use crate::economy::{default_ladder, EconomyLaw};
use crate::tech::{TechRules, TechTrack};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every constant a simulation runs under.
///
/// Built once, validated, and shared read-only between all forks of a
/// country. Missing fields in a JSON override fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub factory: FactoryRules,
    pub construction: ConstructionRules,
    pub country: CountryRules,
    pub tech: TechRules,
    pub economy_laws: Vec<EconomyLaw>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            factory: FactoryRules::default(),
            construction: ConstructionRules::default(),
            country: CountryRules::default(),
            tech: TechRules::default(),
            economy_laws: default_ladder(),
        }
    }
}

/// Military factory output curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryRules {
    pub output_per_factory: f64,
    pub minimum_efficiency: f64,
    pub base_efficiency_cap: f64,
    pub base_efficiency_gain: f64,
}

impl Default for FactoryRules {
    fn default() -> Self {
        Self {
            output_per_factory: 4.5,
            minimum_efficiency: 0.1,
            base_efficiency_cap: 0.5,
            base_efficiency_gain: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionRules {
    pub civilian_factory_cost: f64,
    pub military_factory_cost: f64,
    pub infrastructure_speed_per_level: f64,
    /// Construction points one civilian factory contributes per day.
    pub output_per_civilian_factory: f64,
    /// Civilian factories that can work on a single project.
    pub max_factories_per_project: u32,
}

impl Default for ConstructionRules {
    fn default() -> Self {
        Self {
            civilian_factory_cost: 10800.0,
            military_factory_cost: 7200.0,
            infrastructure_speed_per_level: 0.1,
            output_per_civilian_factory: 5.0,
            max_factories_per_project: 15,
        }
    }
}

impl FactoryRules {
    /// Efficiency must start above zero, or the first day of growth divides by it.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.minimum_efficiency.is_nan() || self.minimum_efficiency <= 0.0 {
            return Err(RuleError::NonPositiveMinimumEfficiency(
                self.minimum_efficiency,
            ));
        }
        if self.base_efficiency_cap.is_nan() || self.base_efficiency_cap < self.minimum_efficiency
        {
            return Err(RuleError::CapBelowMinimum {
                cap: self.base_efficiency_cap,
                minimum: self.minimum_efficiency,
            });
        }
        Ok(())
    }
}

impl ConstructionRules {
    pub fn validate(&self) -> Result<(), RuleError> {
        for (kind, cost) in [
            ("civilian", self.civilian_factory_cost),
            ("military", self.military_factory_cost),
        ] {
            if cost.is_nan() || cost <= 0.0 {
                return Err(RuleError::NonPositiveFactoryCost { kind, cost });
            }
        }
        Ok(())
    }

    pub fn max_points_per_project(&self) -> f64 {
        self.max_factories_per_project as f64 * self.output_per_civilian_factory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryRules {
    pub political_power_per_day: f64,
    /// Factory output bonus at stability 1.0.
    pub stability_factory_bonus: f64,
    /// Factory output penalty at stability 0.0.
    pub stability_factory_penalty: f64,
}

impl Default for CountryRules {
    fn default() -> Self {
        Self {
            political_power_per_day: 1.0,
            stability_factory_bonus: 0.2,
            stability_factory_penalty: -0.5,
        }
    }
}

impl CountryRules {
    /// Linear in stability on either side of 0.5; zero at 0.5.
    pub fn stability_modifier(&self, stability: f64) -> f64 {
        if stability >= 0.5 {
            self.stability_factory_bonus * (stability - 0.5)
        } else {
            // Low stability costs output. Writing this as `penalty * (s - 0.5)`
            // would turn it into a bonus; see "Stability below 0.5" in DESIGN.md.
            self.stability_factory_penalty * (0.5 - stability)
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("minimum efficiency must be positive, got {0}")]
    NonPositiveMinimumEfficiency(f64),
    #[error("base efficiency cap {cap} is below the minimum efficiency {minimum}")]
    CapBelowMinimum { cap: f64, minimum: f64 },
    #[error("{kind} factory cost must be positive, got {cost}")]
    NonPositiveFactoryCost { kind: &'static str, cost: f64 },
    #[error("economy law ladder is empty")]
    EmptyEconomyLadder,
    #[error("tech track '{0}' has zero research time")]
    ZeroResearchTime(&'static str),
    #[error("invalid rules JSON: {0}")]
    Json(String),
}

impl RuleSet {
    pub fn validate(&self) -> Result<(), RuleError> {
        self.factory.validate()?;
        self.construction.validate()?;
        if self.economy_laws.is_empty() {
            return Err(RuleError::EmptyEconomyLadder);
        }
        let tracks: [(&'static str, &TechTrack); 4] = [
            ("construction", &self.tech.construction),
            ("industry", &self.tech.industry),
            ("tools", &self.tech.tools),
            ("tools_special", &self.tech.tools_special),
        ];
        for (name, track) in tracks {
            if track.research_days == 0 {
                return Err(RuleError::ZeroResearchTime(name));
            }
        }
        Ok(())
    }

    /// Parses a JSON override and validates it.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let rules: RuleSet =
            serde_json::from_str(json).map_err(|e| RuleError::Json(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }
}
