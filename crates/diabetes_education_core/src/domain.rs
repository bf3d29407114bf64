//! crates/diabetes_education_core/src/domain.rs
//!
//! Defines the pure, core data structures for the patient profile form.
//! Every categorical form field is a closed enumeration so that adding a new
//! choice is a compile-time-visible change everywhere it is matched on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

//=========================================================================================
// Form Choice Enumerations
//=========================================================================================

/// Declares a closed set of form choices. Each variant carries the stable wire
/// value (used in JSON and in the preference log) and the label shown to the patient.
macro_rules! form_choice {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => ($value:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            /// Every choice, in the order the form presents them.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stable machine value of this choice.
            pub fn value(self) -> &'static str {
                match self {
                    $( $name::$variant => $value ),+
                }
            }

            /// The patient-facing label of this choice.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Looks a choice up by its machine value.
            pub fn from_value(value: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|choice| choice.value() == value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

form_choice! {
    DiabetesType {
        Type1 => ("type-1", "Type 1"),
        Type2 => ("type-2", "Type 2"),
        Gestational => ("gestational", "Gestational"),
        Prediabetes => ("prediabetes", "Prediabetes"),
        Other => ("other", "Other / not sure"),
    }
}

form_choice! {
    TherapyType {
        MultipleDailyInjections => ("multiple-daily-injections", "Multiple daily insulin injections"),
        InsulinPump => ("insulin-pump", "Insulin pump"),
        BasalInsulinOnly => ("basal-insulin-only", "Basal (long-acting) insulin only"),
        OralMedication => ("oral-medication", "Oral medication"),
        NonInsulinInjectable => ("non-insulin-injectable", "Non-insulin injectable (e.g. GLP-1)"),
        LifestyleOnly => ("lifestyle-only", "Diet and exercise only"),
    }
}

form_choice! {
    /// Typical fasting glucose, in mg/dL.
    FastingRange {
        Below70 => ("below-70", "Below 70 mg/dL"),
        From70To99 => ("70-99", "70-99 mg/dL"),
        From100To130 => ("100-130", "100-130 mg/dL"),
        From131To180 => ("131-180", "131-180 mg/dL"),
        Above180 => ("above-180", "Above 180 mg/dL"),
        NotSure => ("not-sure", "Not sure"),
    }
}

form_choice! {
    /// How the patient's main medication is taken.
    DeliveryRoute {
        Oral => ("oral", "Oral (by mouth)"),
        Injection => ("injection", "Injection (pen or syringe)"),
        Pump => ("pump", "Insulin pump"),
        Intravenous => ("intravenous", "IV (hospital setting)"),
        Inhaled => ("inhaled", "Inhaled"),
        NotSure => ("not-sure", "Not sure"),
    }
}

form_choice! {
    DietAdherence {
        None => ("none", "Not at all"),
        PreferNotToSay => ("prefer-not-to-say", "Prefer not to say"),
        Rarely => ("rarely", "Rarely"),
        Sometimes => ("sometimes", "Sometimes"),
        Often => ("often", "Often"),
    }
}

form_choice! {
    MonitoringFrequency {
        None => ("none", "I don't check"),
        PreferNotToSay => ("prefer-not-to-say", "Prefer not to say"),
        LessThanDaily => ("less-than-daily", "Less than once a day"),
        Daily => ("daily", "Once a day"),
        MultipleDaily => ("multiple-daily", "Several times a day"),
    }
}

form_choice! {
    /// Education topics the patient asked to focus on.
    Topic {
        LowGlucoseSafety => ("low-glucose-safety", "Low-glucose safety"),
        NewDeliveryOptions => ("new-delivery-options", "New delivery options (research)"),
        InjectionComfort => ("injection-comfort", "Injection comfort"),
        CarbCounting => ("carb-counting", "Carb counting basics"),
        ExerciseAndGlucose => ("exercise-and-glucose", "Exercise and glucose"),
        SickDayRules => ("sick-day-rules", "Sick-day rules"),
        MedicationBasics => ("medication-basics", "How my medications work"),
    }
}

form_choice! {
    /// Answer to "Would you consider buccal insulin films if they become available?"
    SurveyAnswer {
        Yes => ("yes", "Yes"),
        No => ("no", "No"),
        Unsure => ("unsure", "Not sure yet"),
    }
}

impl Topic {
    /// The topics pre-selected when the form is first shown.
    pub const DEFAULTS: &'static [Topic] = &[Topic::LowGlucoseSafety, Topic::NewDeliveryOptions];
}

//=========================================================================================
// Validation
//=========================================================================================

pub const MAX_INJECTIONS_PER_DAY: i64 = 10;
pub const MAX_BURDEN_SCORE: i64 = 10;
pub const MAX_WEEKLY_ACTIVITY_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_SLEEP_HOURS: f64 = 24.0;
pub const MAX_MEDICATION_CHARS: usize = 500;

/// Rejections raised while turning a raw form into a `ProfileInput`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
        value: String,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

fn check_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
            value: value.to_string(),
        })
    }
}

/// Weekly activity minutes must fit in one week.
pub fn validate_activity_minutes(minutes: i64) -> Result<u32, ValidationError> {
    check_range("activity_minutes", minutes, 0, MAX_WEEKLY_ACTIVITY_MINUTES).map(|m| m as u32)
}

/// Nightly sleep must be a finite number of hours within one day, or absent.
pub fn validate_sleep_hours(hours: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match hours {
        Some(hours) if !hours.is_finite() => Err(ValidationError::NotFinite { field: "sleep_hours" }),
        Some(hours) if !(0.0..=MAX_SLEEP_HOURS).contains(&hours) => {
            Err(ValidationError::OutOfRange {
                field: "sleep_hours",
                min: "0".to_string(),
                max: MAX_SLEEP_HOURS.to_string(),
                value: hours.to_string(),
            })
        }
        other => Ok(other),
    }
}

//=========================================================================================
// Profile Structures
//=========================================================================================

/// The raw, unvalidated values of one patient form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub diabetes_type: DiabetesType,
    pub therapy_type: TherapyType,
    pub fasting_range: FastingRange,
    pub injections_per_day: i64,
    pub hypo_last_week: bool,
    pub burden_score: i64,
    pub activity_minutes: i64,
    /// `None` when the patient left the field empty.
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    pub diet_adherence: DietAdherence,
    pub monitoring_frequency: MonitoringFrequency,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub medication_name: Option<String>,
    pub route: DeliveryRoute,
}

/// One validated snapshot of the patient form. Only constructible through
/// `ProfileInput::try_from(ProfileForm)`, so every instance satisfies the range invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInput {
    diabetes_type: DiabetesType,
    therapy_type: TherapyType,
    fasting_range: FastingRange,
    injections_per_day: u8,
    hypo_last_week: bool,
    burden_score: u8,
    activity_minutes: u32,
    sleep_hours: Option<f64>,
    diet_adherence: DietAdherence,
    monitoring_frequency: MonitoringFrequency,
    topics: BTreeSet<Topic>,
    medication_name: Option<String>,
    route: DeliveryRoute,
}

impl TryFrom<ProfileForm> for ProfileInput {
    type Error = ValidationError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let injections_per_day =
            check_range("injections_per_day", form.injections_per_day, 0, MAX_INJECTIONS_PER_DAY)?;
        let burden_score = check_range("burden_score", form.burden_score, 0, MAX_BURDEN_SCORE)?;
        let activity_minutes = validate_activity_minutes(form.activity_minutes)?;
        let sleep_hours = validate_sleep_hours(form.sleep_hours)?;

        let medication_name = form
            .medication_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if let Some(name) = &medication_name {
            if name.chars().count() > MAX_MEDICATION_CHARS {
                return Err(ValidationError::TooLong {
                    field: "medication_name",
                    max: MAX_MEDICATION_CHARS,
                });
            }
        }

        // The ranges checked above all fit the narrower integer types.
        Ok(Self {
            diabetes_type: form.diabetes_type,
            therapy_type: form.therapy_type,
            fasting_range: form.fasting_range,
            injections_per_day: injections_per_day as u8,
            hypo_last_week: form.hypo_last_week,
            burden_score: burden_score as u8,
            activity_minutes,
            sleep_hours,
            diet_adherence: form.diet_adherence,
            monitoring_frequency: form.monitoring_frequency,
            topics: form.topics.into_iter().collect(),
            medication_name,
            route: form.route,
        })
    }
}

impl ProfileInput {
    pub fn diabetes_type(&self) -> DiabetesType {
        self.diabetes_type
    }

    pub fn therapy_type(&self) -> TherapyType {
        self.therapy_type
    }

    pub fn fasting_range(&self) -> FastingRange {
        self.fasting_range
    }

    pub fn injections_per_day(&self) -> u8 {
        self.injections_per_day
    }

    pub fn hypo_last_week(&self) -> bool {
        self.hypo_last_week
    }

    pub fn burden_score(&self) -> u8 {
        self.burden_score
    }

    pub fn activity_minutes(&self) -> u32 {
        self.activity_minutes
    }

    pub fn sleep_hours(&self) -> Option<f64> {
        self.sleep_hours
    }

    pub fn diet_adherence(&self) -> DietAdherence {
        self.diet_adherence
    }

    pub fn monitoring_frequency(&self) -> MonitoringFrequency {
        self.monitoring_frequency
    }

    /// Selected topics, deduplicated and in form order.
    pub fn topics(&self) -> impl Iterator<Item = Topic> + '_ {
        self.topics.iter().copied()
    }

    pub fn medication_name(&self) -> Option<&str> {
        self.medication_name.as_deref()
    }

    pub fn route(&self) -> DeliveryRoute {
        self.route
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_form() -> ProfileForm {
        ProfileForm {
            diabetes_type: DiabetesType::Type1,
            therapy_type: TherapyType::MultipleDailyInjections,
            fasting_range: FastingRange::From100To130,
            injections_per_day: 4,
            hypo_last_week: false,
            burden_score: 5,
            activity_minutes: 120,
            sleep_hours: Some(7.5),
            diet_adherence: DietAdherence::Sometimes,
            monitoring_frequency: MonitoringFrequency::MultipleDaily,
            topics: Topic::DEFAULTS.to_vec(),
            medication_name: Some("  Lantus injection, Metformin oral ".to_string()),
            route: DeliveryRoute::Injection,
        }
    }

    #[test]
    fn valid_form_becomes_profile() {
        let profile = ProfileInput::try_from(sample_form()).unwrap();
        assert_eq!(profile.injections_per_day(), 4);
        assert_eq!(profile.sleep_hours(), Some(7.5));
        assert_eq!(profile.medication_name(), Some("Lantus injection, Metformin oral"));
        assert_eq!(
            profile.topics().collect::<Vec<_>>(),
            vec![Topic::LowGlucoseSafety, Topic::NewDeliveryOptions]
        );
    }

    #[test]
    fn burden_score_above_ten_is_rejected() {
        let mut form = sample_form();
        form.burden_score = 11;
        let err = ProfileInput::try_from(form).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "burden_score", .. }));
    }

    #[test]
    fn negative_activity_is_rejected() {
        let mut form = sample_form();
        form.activity_minutes = -5;
        assert!(ProfileInput::try_from(form).is_err());
    }

    #[test]
    fn injections_follow_form_widget_bounds() {
        let mut form = sample_form();
        form.injections_per_day = 10;
        assert!(ProfileInput::try_from(form.clone()).is_ok());
        form.injections_per_day = 11;
        assert!(ProfileInput::try_from(form).is_err());
    }

    #[test]
    fn sleep_outside_a_day_or_nan_is_rejected() {
        let mut form = sample_form();
        form.sleep_hours = Some(24.5);
        assert!(ProfileInput::try_from(form.clone()).is_err());
        form.sleep_hours = Some(f64::NAN);
        assert_eq!(
            ProfileInput::try_from(form).unwrap_err(),
            ValidationError::NotFinite { field: "sleep_hours" }
        );
    }

    #[test]
    fn blank_medication_is_treated_as_absent() {
        let mut form = sample_form();
        form.medication_name = Some("   ".to_string());
        let profile = ProfileInput::try_from(form).unwrap();
        assert_eq!(profile.medication_name(), None);
    }

    #[test]
    fn duplicate_topics_collapse() {
        let mut form = sample_form();
        form.topics = vec![Topic::CarbCounting, Topic::CarbCounting];
        let profile = ProfileInput::try_from(form).unwrap();
        assert_eq!(profile.topics().count(), 1);
    }

    #[test]
    fn choices_use_wire_values_in_json() {
        let json = serde_json::to_string(&MonitoringFrequency::LessThanDaily).unwrap();
        assert_eq!(json, "\"less-than-daily\"");
        let parsed: DietAdherence = serde_json::from_str("\"prefer-not-to-say\"").unwrap();
        assert_eq!(parsed, DietAdherence::PreferNotToSay);
        assert!(serde_json::from_str::<DietAdherence>("\"always\"").is_err());
    }

    #[test]
    fn from_value_matches_every_choice() {
        for route in DeliveryRoute::ALL {
            assert_eq!(DeliveryRoute::from_value(route.value()), Some(*route));
        }
        assert_eq!(FastingRange::from_value("nope"), None);
    }
}
