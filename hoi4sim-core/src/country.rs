use crate::config::{RuleError, RuleSet};
use crate::economy::{EconomyLaw, EconomyState};
use crate::region::{Region, RegionSetup};
use crate::tech::{TechLevels, TechTimeline};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Complete { switch_day: u32, duration: u32 },
}

/// Country-wide figures at the end of one simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySnapshot {
    pub day: u32,
    /// Cumulative since day 0.
    pub military_production: f64,
    pub civilian_factories: u32,
    pub military_factories: u32,
    pub economy_level: usize,
}

/// A country and the day-by-day loop that grows its industry.
#[derive(Debug, Clone)]
pub struct Country {
    name: String,
    stability: f64,
    war_support: f64,
    /// Construction is handed out in this order.
    regions: Vec<Region>,
    rules: Arc<RuleSet>,
    economy: EconomyState,
    tech: TechTimeline,
    military_production: f64,
    phase: RunPhase,
}

impl Country {
    /// Validates `rules` before building any region.
    pub fn new(
        regions: &[RegionSetup],
        stability: f64,
        war_support: f64,
        name: impl Into<String>,
        rules: Arc<RuleSet>,
    ) -> Result<Self, RuleError> {
        rules.validate()?;
        let regions = regions
            .iter()
            .map(|&r| Region::from_validated(r, rules.construction, rules.factory))
            .collect();
        Ok(Self {
            name: name.into(),
            stability,
            war_support,
            regions,
            rules,
            economy: EconomyState::default(),
            tech: TechTimeline::default(),
            military_production: 0.0,
            phase: RunPhase::NotStarted,
        })
    }

    /// A fresh copy at game start: same regions and factory counts, nothing
    /// researched, nothing under construction. Shares the rule set.
    pub fn fork(&self) -> Self {
        Self {
            name: self.name.clone(),
            stability: self.stability,
            war_support: self.war_support,
            regions: self.regions.iter().map(Region::fork).collect(),
            rules: Arc::clone(&self.rules),
            economy: EconomyState::default(),
            tech: TechTimeline::default(),
            military_production: 0.0,
            phase: RunPhase::NotStarted,
        }
    }

    /// Simulates `duration` days, building civilian factories before
    /// `switch_day` and military factories from then on.
    pub fn calculate_results(&mut self, switch_day: u32, duration: u32) {
        self.calculate_results_observed(switch_day, duration, |_, _| {});
    }

    /// Like [`calculate_results`](Self::calculate_results), calling
    /// `observer` with the day index and the country after every day.
    pub fn calculate_results_observed<F>(
        &mut self,
        switch_day: u32,
        duration: u32,
        mut observer: F,
    ) where
        F: FnMut(u32, &Country),
    {
        if let RunPhase::Complete { .. } = self.phase {
            log::warn!(
                "{}: results already calculated; fork the country to run again",
                self.name
            );
            return;
        }

        for day in 0..duration {
            self.check_tech(day);
            self.produce();
            self.update_economy();
            self.allocate_construction(day, switch_day);
            observer(day, &*self);
        }

        self.phase = RunPhase::Complete {
            switch_day,
            duration,
        };
        log::debug!(
            "{} switch day {}: {:.1} production, {} civ, {} mil",
            self.name,
            switch_day,
            self.military_production,
            self.civilian_factories(),
            self.military_factories()
        );
    }

    fn check_tech(&mut self, day: u32) {
        let rules = &self.rules.tech;
        let advanced = self.tech.check(day, rules);
        if !advanced.any() {
            return;
        }
        let levels = *self.tech.levels();
        for region in &mut self.regions {
            if advanced.industry {
                region.apply_building_slot_bonus(rules.building_slot_bonus(&levels));
            }
            if advanced.tools {
                region.apply_efficiency_cap_bonus(rules.efficiency_cap_bonus(&levels));
            }
            if advanced.tools_special {
                region.apply_efficiency_gain_bonus(rules.efficiency_gain_bonus(&levels));
            }
        }
        log::trace!("{} day {}: tech now {:?}", self.name, day, levels);
    }

    fn produce(&mut self) {
        let multiplier = 1.0 + self.industry_production_bonus() + self.stability_factory_bonus();
        let mut total = 0.0;
        for region in &mut self.regions {
            total += region.total_military_production() * multiplier;
        }
        self.military_production += total;
    }

    fn update_economy(&mut self) {
        let moved = self.economy.daily_update(
            self.rules.country.political_power_per_day,
            self.war_support,
            &self.rules.economy_laws,
        );
        if moved {
            log::trace!(
                "{}: economy law now {}",
                self.name,
                self.economy_law().map_or("?", |l| l.name.as_str())
            );
        }
    }

    /// Hands out one day of construction points. Each region with free slots
    /// takes at most one project's worth, walking the regions once in order.
    fn allocate_construction(&mut self, day: u32, switch_day: u32) {
        let construction = self.rules.construction;
        let law = self.rules.economy_laws.get(self.economy.level());
        let consumer_goods = law.map_or(0.0, |l| l.consumer_goods);
        let civilian_bonus = law.map_or(0.0, |l| l.civilian_construction);
        let military_bonus = law.map_or(0.0, |l| l.military_construction);

        let civ = self.civilian_factories() as f64;
        let mil = self.military_factories() as f64;
        let available = (civ - consumer_goods * (civ + mil)).trunc();
        let mut budget = available * construction.output_per_civilian_factory;
        let per_project = construction.max_points_per_project();
        let speed = 1.0 + self.rules.tech.construction_bonus(self.tech.levels());

        for region in &mut self.regions {
            if budget <= 0.0 {
                break;
            }
            if region.free_building_slots() <= 0 {
                continue;
            }
            let block = budget.min(per_project);
            budget -= block;
            let points = block * speed;
            if day < switch_day || region.is_civilian_construction_active() {
                region.add_civilian_construction(points * (1.0 + civilian_bonus));
            } else {
                region.add_military_construction(points * (1.0 + military_bonus));
            }
        }
    }

    /// `+0.2 * (s - 0.5)` above 0.5 stability, a penalty reaching -0.25 at 0.
    pub fn stability_factory_bonus(&self) -> f64 {
        self.rules.country.stability_modifier(self.stability)
    }

    pub fn industry_production_bonus(&self) -> f64 {
        self.rules.tech.production_bonus(self.tech.levels())
    }

    pub fn snapshot(&self, day: u32) -> DaySnapshot {
        DaySnapshot {
            day,
            military_production: self.military_production,
            civilian_factories: self.civilian_factories(),
            military_factories: self.military_factories(),
            economy_level: self.economy.level(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    pub fn war_support(&self) -> f64 {
        self.war_support
    }

    /// Cumulative military production over the run.
    pub fn military_production(&self) -> f64 {
        self.military_production
    }

    pub fn civilian_factories(&self) -> u32 {
        self.regions.iter().map(Region::civilian_factory_count).sum()
    }

    pub fn military_factories(&self) -> u32 {
        self.regions.iter().map(Region::military_factory_count).sum()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Mutable access for seeding construction already underway.
    pub fn region_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    pub fn tech_levels(&self) -> &TechLevels {
        self.tech.levels()
    }

    pub fn economy_level(&self) -> usize {
        self.economy.level()
    }

    pub fn economy_law(&self) -> Option<&EconomyLaw> {
        self.rules.economy_laws.get(self.economy.level())
    }

    pub fn political_power(&self) -> f64 {
        self.economy.political_power()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }
}
