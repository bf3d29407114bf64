//! crates/diabetes_education_core/src/preferences.rs
//!
//! The append-only preference log row and the survey aggregation read from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    DeliveryRoute, DiabetesType, FastingRange, ProfileInput, SurveyAnswer, TherapyType,
};

/// Separator used when the selected topics are flattened into one column.
pub const TOPIC_SEPARATOR: &str = "; ";

/// Which user action produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordEvent {
    SummaryGenerated,
    PreferenceSaved,
}

/// One logged user action. Field order is the column order of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub event: RecordEvent,
    pub diabetes_type: Option<DiabetesType>,
    pub therapy_type: Option<TherapyType>,
    pub fasting_range: Option<FastingRange>,
    pub injections_per_day: Option<u8>,
    pub hypo_last_week: Option<bool>,
    pub burden_score: Option<u8>,
    pub route: Option<DeliveryRoute>,
    pub topics: String,
    pub consider_buccal: Option<SurveyAnswer>,
    pub comment: Option<String>,
}

impl PreferenceRecord {
    /// The log's header row. Must list the struct fields in declaration order.
    pub const COLUMNS: [&'static str; 13] = [
        "timestamp",
        "session_id",
        "event",
        "diabetes_type",
        "therapy_type",
        "fasting_range",
        "injections_per_day",
        "hypo_last_week",
        "burden_score",
        "route",
        "topics",
        "consider_buccal",
        "comment",
    ];

    fn empty(session_id: Uuid, event: RecordEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            session_id,
            event,
            diabetes_type: None,
            therapy_type: None,
            fasting_range: None,
            injections_per_day: None,
            hypo_last_week: None,
            burden_score: None,
            route: None,
            topics: String::new(),
            consider_buccal: None,
            comment: None,
        }
    }

    fn with_profile(mut self, profile: &ProfileInput) -> Self {
        self.diabetes_type = Some(profile.diabetes_type());
        self.therapy_type = Some(profile.therapy_type());
        self.fasting_range = Some(profile.fasting_range());
        self.injections_per_day = Some(profile.injections_per_day());
        self.hypo_last_week = Some(profile.hypo_last_week());
        self.burden_score = Some(profile.burden_score());
        self.route = Some(profile.route());
        self.topics = profile
            .topics()
            .map(|topic| topic.value())
            .collect::<Vec<_>>()
            .join(TOPIC_SEPARATOR);
        self
    }

    /// The record written when a summary has been generated for a profile.
    pub fn summary_generated(
        session_id: Uuid,
        profile: &ProfileInput,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::empty(session_id, RecordEvent::SummaryGenerated, timestamp).with_profile(profile)
    }

    /// The record written when the patient answers the delivery-option survey.
    pub fn preference_saved(
        session_id: Uuid,
        answer: SurveyAnswer,
        comment: Option<String>,
        profile: Option<&ProfileInput>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut record = Self::empty(session_id, RecordEvent::PreferenceSaved, timestamp);
        if let Some(profile) = profile {
            record = record.with_profile(profile);
        }
        record.consider_buccal = Some(answer);
        record.comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        record
    }
}

/// Counts of survey answers across the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SurveyTally {
    pub yes: usize,
    pub no: usize,
    pub unsure: usize,
    pub total_records: usize,
}

impl SurveyTally {
    pub fn answered(&self) -> usize {
        self.yes + self.no + self.unsure
    }
}

pub fn tally_survey_answers(records: &[PreferenceRecord]) -> SurveyTally {
    records.iter().fold(
        SurveyTally {
            total_records: records.len(),
            ..SurveyTally::default()
        },
        |mut tally, record| {
            match record.consider_buccal {
                Some(SurveyAnswer::Yes) => tally.yes += 1,
                Some(SurveyAnswer::No) => tally.no += 1,
                Some(SurveyAnswer::Unsure) => tally.unsure += 1,
                None => {}
            }
            tally
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::sample_form;

    fn profile() -> ProfileInput {
        ProfileInput::try_from(sample_form()).unwrap()
    }

    #[test]
    fn summary_record_copies_profile_subset() {
        let session = Uuid::new_v4();
        let record = PreferenceRecord::summary_generated(session, &profile(), Utc::now());
        assert_eq!(record.event, RecordEvent::SummaryGenerated);
        assert_eq!(record.session_id, session);
        assert_eq!(record.injections_per_day, Some(4));
        assert_eq!(record.topics, "low-glucose-safety; new-delivery-options");
        assert_eq!(record.consider_buccal, None);
    }

    #[test]
    fn preference_record_without_profile_leaves_profile_columns_empty() {
        let record = PreferenceRecord::preference_saved(
            Uuid::new_v4(),
            SurveyAnswer::Unsure,
            Some("  ".to_string()),
            None,
            Utc::now(),
        );
        assert_eq!(record.diabetes_type, None);
        assert_eq!(record.topics, "");
        assert_eq!(record.comment, None);
        assert_eq!(record.consider_buccal, Some(SurveyAnswer::Unsure));
    }

    #[test]
    fn columns_cover_every_serialized_field() {
        let record = PreferenceRecord::summary_generated(Uuid::new_v4(), &profile(), Utc::now());
        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = PreferenceRecord::COLUMNS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn tally_counts_only_survey_answers() {
        let session = Uuid::new_v4();
        let now = Utc::now();
        let records = vec![
            PreferenceRecord::summary_generated(session, &profile(), now),
            PreferenceRecord::preference_saved(session, SurveyAnswer::Yes, None, None, now),
            PreferenceRecord::preference_saved(session, SurveyAnswer::Yes, None, None, now),
            PreferenceRecord::preference_saved(session, SurveyAnswer::No, None, None, now),
        ];
        let tally = tally_survey_answers(&records);
        assert_eq!(
            tally,
            SurveyTally { yes: 2, no: 1, unsure: 0, total_records: 4 }
        );
        assert_eq!(tally.answered(), 3);
    }
}
