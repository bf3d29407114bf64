//! crates/diabetes_education_core/src/scoring.rs
//!
//! The lifestyle scoring rubric. Maps weekly activity, nightly sleep, diet
//! adherence and glucose monitoring habits onto four 0-10 scores that the
//! form renders as a bar chart.

use crate::domain::{DietAdherence, MonitoringFrequency, ProfileInput};
use serde::Serialize;

pub const MAX_SCORE: u8 = 10;

/// Four derived wellness proxy scores, each in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifestyleScores {
    pub diet: u8,
    pub exercise: u8,
    pub monitoring: u8,
    pub sleep: u8,
}

impl LifestyleScores {
    /// Scores for a validated profile.
    pub fn for_profile(profile: &ProfileInput) -> Self {
        compute_lifestyle_scores(
            profile.activity_minutes(),
            profile.sleep_hours(),
            profile.diet_adherence(),
            profile.monitoring_frequency(),
        )
    }

    /// The chart bars in display order.
    pub fn bars(&self) -> [(&'static str, u8); 4] {
        [
            ("Diet", self.diet),
            ("Exercise", self.exercise),
            ("Monitoring", self.monitoring),
            ("Sleep", self.sleep),
        ]
    }
}

/// Computes all four lifestyle scores. Callers validate numeric ranges first.
pub fn compute_lifestyle_scores(
    activity_minutes: u32,
    sleep_hours: Option<f64>,
    diet_adherence: DietAdherence,
    monitoring_frequency: MonitoringFrequency,
) -> LifestyleScores {
    LifestyleScores {
        diet: diet_score(diet_adherence),
        exercise: exercise_score(activity_minutes),
        monitoring: monitoring_score(monitoring_frequency),
        sleep: sleep_score(sleep_hours),
    }
}

/// Weekly activity minutes against the 150-minute guideline.
pub fn exercise_score(activity_minutes: u32) -> u8 {
    match activity_minutes {
        150.. => 10,
        90..=149 => 7,
        1..=89 => 4,
        0 => 0,
    }
}

/// Nightly sleep hours. `None` means the patient did not answer.
pub fn sleep_score(sleep_hours: Option<f64>) -> u8 {
    match sleep_hours {
        Some(hours) if (7.0..=9.0).contains(&hours) => 10,
        Some(hours) if hours == 6.0 || hours == 10.0 => 6,
        Some(hours) if hours > 0.0 => 3,
        Some(_) | None => 0,
    }
}

pub fn diet_score(adherence: DietAdherence) -> u8 {
    match adherence {
        DietAdherence::None | DietAdherence::PreferNotToSay => 0,
        DietAdherence::Rarely => 3,
        DietAdherence::Sometimes => 6,
        DietAdherence::Often => 9,
    }
}

pub fn monitoring_score(frequency: MonitoringFrequency) -> u8 {
    match frequency {
        MonitoringFrequency::None | MonitoringFrequency::PreferNotToSay => 0,
        MonitoringFrequency::LessThanDaily => 4,
        MonitoringFrequency::Daily => 7,
        MonitoringFrequency::MultipleDaily => 9,
    }
}

/// Label-keyed diet lookup for callers holding raw strings. Unknown labels score 0.
pub fn diet_score_for_label(label: &str) -> u8 {
    DietAdherence::from_value(label).map_or(0, diet_score)
}

/// Label-keyed monitoring lookup for callers holding raw strings. Unknown labels score 0.
pub fn monitoring_score_for_label(label: &str) -> u8 {
    MonitoringFrequency::from_value(label).map_or(0, monitoring_score)
}
