//! Fixed research schedule.
//!
//! Research is not simulated. Each track completes a level when the day index
//! hits one of its offsets plus the research time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechTrack {
    /// Day indices at which research on a level starts.
    pub offsets: Vec<u32>,
    pub research_days: u32,
}

impl TechTrack {
    pub fn new(offsets: &[u32], research_days: u32) -> Self {
        Self {
            offsets: offsets.to_vec(),
            research_days,
        }
    }

    /// True when any scheduled level finishes on `day`.
    pub fn completes_on(&self, day: u32) -> bool {
        self.offsets
            .iter()
            .any(|&offset| offset.saturating_add(self.research_days) == day)
    }
}

/// The four tracks and what each level is worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechRules {
    pub construction: TechTrack,
    pub industry: TechTrack,
    pub tools: TechTrack,
    pub tools_special: TechTrack,
    pub construction_speed_per_level: f64,
    pub industry_slots_per_level: f64,
    pub industry_production_per_level: f64,
    pub tools_cap_per_level: f64,
    pub tools_special_gain_per_level: f64,
}

impl Default for TechRules {
    fn default() -> Self {
        const YEARLY: [u32; 5] = [0, 365, 1095, 1825, 2555];
        Self {
            construction: TechTrack::new(&YEARLY, 170),
            // starts 170 days in, after the first construction tech
            industry: TechTrack::new(&[170, 365, 1095, 1825, 2555], 170),
            tools: TechTrack::new(&YEARLY, 127),
            tools_special: TechTrack::new(&[2555], 127),
            construction_speed_per_level: 0.1,
            industry_slots_per_level: 0.2,
            industry_production_per_level: 0.15,
            tools_cap_per_level: 0.1,
            tools_special_gain_per_level: 0.1,
        }
    }
}

impl TechRules {
    pub fn construction_bonus(&self, levels: &TechLevels) -> f64 {
        levels.construction as f64 * self.construction_speed_per_level
    }

    pub fn building_slot_bonus(&self, levels: &TechLevels) -> f64 {
        levels.industry as f64 * self.industry_slots_per_level
    }

    pub fn production_bonus(&self, levels: &TechLevels) -> f64 {
        levels.industry as f64 * self.industry_production_per_level
    }

    pub fn efficiency_cap_bonus(&self, levels: &TechLevels) -> f64 {
        levels.tools as f64 * self.tools_cap_per_level
    }

    pub fn efficiency_gain_bonus(&self, levels: &TechLevels) -> f64 {
        levels.tools_special as f64 * self.tools_special_gain_per_level
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechLevels {
    pub construction: u32,
    pub industry: u32,
    pub tools: u32,
    pub tools_special: u32,
}

/// Which tracks moved on a given day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TechAdvances {
    pub construction: bool,
    pub industry: bool,
    pub tools: bool,
    pub tools_special: bool,
}

impl TechAdvances {
    pub fn any(&self) -> bool {
        self.construction || self.industry || self.tools || self.tools_special
    }
}

/// Per-country research progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TechTimeline {
    levels: TechLevels,
    last_checked: Option<u32>,
}

impl TechTimeline {
    pub fn levels(&self) -> &TechLevels {
        &self.levels
    }

    /// Advances every track that completes on `day`, at most one level each.
    /// Checking the same day again is a no-op.
    pub fn check(&mut self, day: u32, rules: &TechRules) -> TechAdvances {
        if self.last_checked == Some(day) {
            return TechAdvances::default();
        }
        self.last_checked = Some(day);

        let mut advance = |track: &TechTrack, level: &mut u32| {
            let hit = track.completes_on(day);
            if hit {
                *level += 1;
            }
            hit
        };
        TechAdvances {
            construction: advance(&rules.construction, &mut self.levels.construction),
            industry: advance(&rules.industry, &mut self.levels.industry),
            tools: advance(&rules.tools, &mut self.levels.tools),
            tools_special: advance(&rules.tools_special, &mut self.levels.tools_special),
        }
    }
}
