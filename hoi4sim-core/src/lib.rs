//! # HOI4 Industry Simulation Core
//!
//! Day-stepped model of a Hearts of Iron IV country's industry, used to find
//! the day on which it should stop building civilian factories and start
//! building military ones.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  fork ×N   ┌──────────────┐  calculate_results  ┌──────────────┐
//! │  canonical  │──────────▶│ Country per  │───────────────────▶│ SweepResults │
//! │   Country   │            │  switch day  │   (rayon::join)     │  per day     │
//! └─────────────┘            └──────────────┘                     └──────────────┘
//! ```
//!
//! Each simulated day runs, in order: tech check, military production,
//! economy law update, construction.
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`RuleSet`] | Every constant the model uses, loadable from JSON |
//! | [`Country`] | Regions plus the daily loop |
//! | [`Region`] | One state: slots, factories, construction queues |
//! | [`ProductionUnit`] | One military factory's efficiency curve |
//! | [`run_sweep`] | One fork per switch day, run in parallel |

pub mod config;
pub mod country;
pub mod date;
pub mod economy;
pub mod factory;
pub mod region;
pub mod sweep;
pub mod tech;
pub mod testing;

pub use config::{ConstructionRules, CountryRules, FactoryRules, RuleError, RuleSet};
pub use country::{Country, DaySnapshot, RunPhase};
pub use date::{Date, DateParseError};
pub use economy::{EconomyLaw, EconomyState};
pub use factory::ProductionUnit;
pub use region::{ConstructionQueue, Region, RegionSetup};
pub use sweep::{run_sweep, run_sweep_with, Parallelism, SweepPoint, SweepResults};
pub use tech::{TechLevels, TechRules, TechTimeline, TechTrack};
