use crate::config::{RuleError, RuleSet};
use crate::country::Country;
use crate::region::RegionSetup;
use std::sync::Arc;

/// Fixture builder for countries in tests.
pub struct CountryBuilder {
    name: String,
    stability: f64,
    war_support: f64,
    regions: Vec<RegionSetup>,
    rules: RuleSet,
}

impl CountryBuilder {
    pub fn new() -> Self {
        Self {
            name: "TST".to_string(),
            stability: 0.5,
            war_support: 0.5,
            regions: Vec::new(),
            rules: RuleSet::default(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    pub fn war_support(mut self, war_support: f64) -> Self {
        self.war_support = war_support;
        self
    }

    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Appends a region; regions are walked in the order they are added.
    pub fn region(
        mut self,
        infrastructure: u32,
        building_slots: u32,
        dockyards: u32,
        civilian_factories: u32,
        military_factories: u32,
    ) -> Self {
        let id = self.regions.len() as u32 + 1;
        self.regions.push(RegionSetup {
            id,
            infrastructure,
            base_building_slots: building_slots,
            dockyards,
            civilian_factories,
            military_factories,
        });
        self
    }

    /// Fails when the rules set with [`rules`](Self::rules) don't validate.
    pub fn build(self) -> Result<Country, RuleError> {
        Country::new(
            &self.regions,
            self.stability,
            self.war_support,
            self.name,
            Arc::new(self.rules),
        )
    }
}

impl Default for CountryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
