pub mod domain;
pub mod ports;
pub mod preferences;
pub mod prompt;
pub mod reference;
pub mod scoring;
pub mod sections;

pub use domain::{
    DeliveryRoute, DiabetesType, DietAdherence, FastingRange, MonitoringFrequency, ProfileForm,
    ProfileInput, SurveyAnswer, TherapyType, Topic, ValidationError,
};
pub use ports::{
    DocumentRenderer, GenerationError, PortError, PortResult, PreferenceStore, SummaryDocument,
    SummaryGenerationService, SummaryRequest,
};
pub use preferences::{tally_survey_answers, PreferenceRecord, RecordEvent, SurveyTally};
pub use scoring::{compute_lifestyle_scores, LifestyleScores};
pub use sections::{split_sections, SummarySection};
