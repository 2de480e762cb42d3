//! A single state: its factories, building slots and construction queues.

use crate::config::{ConstructionRules, FactoryRules, RuleError, RuleSet};
use crate::factory::ProductionUnit;

/// Starting figures for a region, also what a fork rebuilds from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionSetup {
    /// Game state id. Only used in logs.
    pub id: u32,
    pub infrastructure: u32,
    pub base_building_slots: u32,
    pub dockyards: u32,
    pub civilian_factories: u32,
    pub military_factories: u32,
}

/// Progress on the one project of a kind a region can have underway.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstructionQueue {
    progress: f64,
    active: bool,
}

impl ConstructionQueue {
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Adds `amount` and returns `true` when the project completes.
    /// Points beyond the cost are lost; the queue goes idle again.
    fn add(&mut self, amount: f64, cost: f64) -> bool {
        if self.active {
            self.progress += amount;
        } else {
            self.active = true;
            self.progress = amount;
        }
        if self.progress >= cost {
            self.progress = 0.0;
            self.active = false;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    setup: RegionSetup,
    construction: ConstructionRules,
    factory: FactoryRules,
    building_slots: u32,
    civilian_factories: u32,
    /// One entry per military factory. Only ever grows.
    units: Vec<ProductionUnit>,
    civilian_queue: ConstructionQueue,
    military_queue: ConstructionQueue,
}

impl Region {
    pub fn new(setup: RegionSetup, rules: &RuleSet) -> Result<Self, RuleError> {
        Self::with_rules(setup, rules.construction, rules.factory)
    }

    /// Rejects factory or construction rules that would let a unit's
    /// efficiency reach zero or a project never complete.
    pub fn with_rules(
        setup: RegionSetup,
        construction: ConstructionRules,
        factory: FactoryRules,
    ) -> Result<Self, RuleError> {
        factory.validate()?;
        construction.validate()?;
        Ok(Self::from_validated(setup, construction, factory))
    }

    pub(crate) fn from_validated(
        setup: RegionSetup,
        construction: ConstructionRules,
        factory: FactoryRules,
    ) -> Self {
        let units = (0..setup.military_factories)
            .map(|_| ProductionUnit::mature(factory))
            .collect();
        Self {
            setup,
            construction,
            factory,
            building_slots: setup.base_building_slots,
            civilian_factories: setup.civilian_factories,
            units,
            civilian_queue: ConstructionQueue::default(),
            military_queue: ConstructionQueue::default(),
        }
    }

    /// Current factory counts as a fresh setup.
    pub fn current_setup(&self) -> RegionSetup {
        RegionSetup {
            civilian_factories: self.civilian_factories,
            military_factories: self.military_factory_count(),
            ..self.setup
        }
    }

    /// A copy as it would stand at game start with today's factory counts:
    /// every factory mature, no construction underway, no bonuses.
    pub fn fork(&self) -> Self {
        Self::from_validated(self.current_setup(), self.construction, self.factory)
    }

    pub fn id(&self) -> u32 {
        self.setup.id
    }

    pub fn infrastructure(&self) -> u32 {
        self.setup.infrastructure
    }

    pub fn building_slots(&self) -> u32 {
        self.building_slots
    }

    pub fn civilian_factory_count(&self) -> u32 {
        self.civilian_factories
    }

    pub fn military_factory_count(&self) -> u32 {
        self.units.len() as u32
    }

    pub fn units(&self) -> &[ProductionUnit] {
        &self.units
    }

    /// Slots left for new factories. Negative when a slot bonus shrank the
    /// region below what is already built.
    pub fn free_building_slots(&self) -> i64 {
        self.building_slots as i64
            - self.civilian_factories as i64
            - self.units.len() as i64
            - self.setup.dockyards as i64
    }

    pub fn civilian_queue(&self) -> &ConstructionQueue {
        &self.civilian_queue
    }

    pub fn military_queue(&self) -> &ConstructionQueue {
        &self.military_queue
    }

    pub fn is_civilian_construction_active(&self) -> bool {
        self.civilian_queue.is_active()
    }

    /// One day of output from every military factory. Advances each
    /// factory's efficiency, so call it once per day.
    pub fn total_military_production(&mut self) -> f64 {
        self.units.iter_mut().map(ProductionUnit::produce).sum()
    }

    fn infrastructure_multiplier(&self) -> f64 {
        1.0 + self.setup.infrastructure as f64 * self.construction.infrastructure_speed_per_level
    }

    /// Returns `true` when a civilian factory was completed.
    pub fn add_civilian_construction(&mut self, amount: f64) -> bool {
        let amount = amount * self.infrastructure_multiplier();
        let done = self
            .civilian_queue
            .add(amount, self.construction.civilian_factory_cost);
        if done {
            self.civilian_factories += 1;
            log::trace!(
                "state {}: civilian factory completed ({} total)",
                self.setup.id,
                self.civilian_factories
            );
        }
        done
    }

    /// Returns `true` when a military factory was completed. The new factory
    /// starts at minimum efficiency under the base cap, ignoring bonuses
    /// applied before it existed.
    pub fn add_military_construction(&mut self, amount: f64) -> bool {
        let amount = amount * self.infrastructure_multiplier();
        let done = self
            .military_queue
            .add(amount, self.construction.military_factory_cost);
        if done {
            self.units.push(ProductionUnit::new_build(self.factory));
            log::trace!(
                "state {}: military factory completed ({} total)",
                self.setup.id,
                self.units.len()
            );
        }
        done
    }

    /// Slots become `trunc(base * (1 + bonus))`. The bonus replaces any earlier one.
    pub fn apply_building_slot_bonus(&mut self, bonus: f64) {
        let slots = (self.setup.base_building_slots as f64 * (1.0 + bonus)).trunc();
        self.building_slots = slots.max(0.0) as u32;
    }

    pub fn apply_efficiency_cap_bonus(&mut self, bonus: f64) {
        for unit in &mut self.units {
            unit.apply_efficiency_cap_bonus(bonus);
        }
    }

    pub fn apply_efficiency_gain_bonus(&mut self, bonus: f64) {
        for unit in &mut self.units {
            unit.apply_efficiency_gain_bonus(bonus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn region(infrastructure: u32, slots: u32, dockyards: u32, civ: u32, mil: u32) -> Region {
        Region::new(
            RegionSetup {
                id: 1,
                infrastructure,
                base_building_slots: slots,
                dockyards,
                civilian_factories: civ,
                military_factories: mil,
            },
            &RuleSet::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_rules_that_stall_factories() {
        let mut rules = RuleSet::default();
        rules.factory.minimum_efficiency = 0.0;
        let setup = RegionSetup {
            military_factories: 1,
            ..RegionSetup::default()
        };
        assert_eq!(
            Region::new(setup, &rules).unwrap_err(),
            RuleError::NonPositiveMinimumEfficiency(0.0)
        );

        let mut construction = ConstructionRules::default();
        construction.military_factory_cost = 0.0;
        assert!(matches!(
            Region::with_rules(setup, construction, FactoryRules::default()),
            Err(RuleError::NonPositiveFactoryCost { kind: "military", .. })
        ));
    }

    #[test]
    fn test_counts_and_free_slots() {
        let r = region(5, 10, 1, 5, 2);
        assert_eq!(r.civilian_factory_count(), 5);
        assert_eq!(r.military_factory_count(), 2);
        assert_eq!(r.free_building_slots(), 2);
        assert!(!r.is_civilian_construction_active());
    }

    #[test]
    fn test_production_is_sum_of_units() {
        let mut r = region(0, 10, 0, 0, 3);
        assert!((r.total_military_production() - 3.0 * 2.25).abs() < 1e-12);
        let mut empty = region(0, 10, 0, 0, 0);
        assert_eq!(empty.total_military_production(), 0.0);
    }

    #[test]
    fn test_civilian_queue_completes_and_discards_overflow() {
        // infrastructure 0: amounts go in unscaled
        let mut r = region(0, 10, 0, 0, 0);
        assert!(!r.add_civilian_construction(10000.0));
        assert!(r.is_civilian_construction_active());
        assert_eq!(r.civilian_queue().progress(), 10000.0);

        assert!(r.add_civilian_construction(5000.0));
        assert_eq!(r.civilian_factory_count(), 1);
        assert_eq!(r.civilian_queue().progress(), 0.0);
        assert!(!r.is_civilian_construction_active());

        // next project starts from the new amount, not the overflow
        assert!(!r.add_civilian_construction(100.0));
        assert_eq!(r.civilian_queue().progress(), 100.0);
    }

    #[test]
    fn test_infrastructure_scales_construction() {
        let mut r = region(5, 10, 0, 0, 0);
        r.add_military_construction(100.0);
        assert!((r.military_queue().progress() - 150.0).abs() < 1e-9);
        assert!(r.add_military_construction(4700.0));
        assert_eq!(r.military_factory_count(), 1);
        assert_eq!(r.units()[0].efficiency(), 0.1);
    }

    #[test]
    fn test_new_factory_waits_for_next_broadcast() {
        let mut r = region(0, 10, 0, 0, 1);
        r.apply_efficiency_cap_bonus(0.1);
        r.apply_efficiency_gain_bonus(0.1);
        assert!((r.units()[0].efficiency_cap() - 0.6).abs() < 1e-12);
        r.add_military_construction(7200.0);
        let built = &r.units()[1];
        assert_eq!(built.efficiency_cap(), 0.5);
        assert_eq!(built.gain_multiplier(), 1.0);
        assert_eq!(built.efficiency(), 0.1);

        r.apply_efficiency_cap_bonus(0.1);
        assert!((r.units()[1].efficiency_cap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_slot_bonus_truncates() {
        let mut r = region(0, 7, 0, 0, 0);
        r.apply_building_slot_bonus(0.2);
        // 7 * 1.2 = 8.4
        assert_eq!(r.building_slots(), 8);
        r.apply_building_slot_bonus(0.0);
        assert_eq!(r.building_slots(), 7);
    }

    #[test]
    fn test_fork_resets_progress_and_keeps_counts() {
        let mut r = region(2, 10, 0, 1, 1);
        r.apply_efficiency_cap_bonus(0.3);
        r.apply_building_slot_bonus(0.4);
        r.add_military_construction(7200.0);
        r.add_civilian_construction(50.0);

        let fork = r.fork();
        assert_eq!(fork.military_factory_count(), 2);
        assert_eq!(fork.civilian_factory_count(), 1);
        assert_eq!(fork.building_slots(), 10);
        assert!(!fork.is_civilian_construction_active());
        assert!(fork.units().iter().all(|u| u.efficiency() == 0.5));
        assert_eq!(fork.infrastructure(), 2);
        assert_eq!(fork.id(), 1);
    }

    proptest! {
        #[test]
        fn prop_free_slots_follow_slot_bonus(
            base in 0u32..20,
            dockyards in 0u32..4,
            civ in 0u32..8,
            mil in 0u32..8,
            bonuses in proptest::collection::vec(-1.0f64..2.0, 1..10)
        ) {
            let mut r = region(0, base, dockyards, civ, mil);
            for bonus in bonuses {
                r.apply_building_slot_bonus(bonus);
                let expected = (base as f64 * (1.0 + bonus)).trunc().max(0.0) as u32;
                prop_assert_eq!(r.building_slots(), expected);
                prop_assert_eq!(
                    r.free_building_slots(),
                    expected as i64 - civ as i64 - mil as i64 - dockyards as i64
                );
            }
        }

        #[test]
        fn prop_threshold_adds_exactly_one_factory(
            amounts in proptest::collection::vec(1.0f64..20000.0, 1..20)
        ) {
            let mut r = region(0, 10, 0, 0, 0);
            for amount in amounts {
                let before = r.military_factory_count();
                // an idle queue always sits at zero
                let expected = r.military_queue().progress() + amount >= 7200.0;
                let done = r.add_military_construction(amount);
                prop_assert_eq!(done, expected);
                if done {
                    prop_assert_eq!(r.military_factory_count(), before + 1);
                    prop_assert_eq!(r.military_queue().progress(), 0.0);
                } else {
                    prop_assert_eq!(r.military_factory_count(), before);
                }
            }
        }
    }
}
