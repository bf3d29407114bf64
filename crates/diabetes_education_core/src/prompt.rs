//! crates/diabetes_education_core/src/prompt.rs
//!
//! Turns a validated profile into the request sent to the language model.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::ProfileInput;
use crate::ports::SummaryRequest;
use crate::scoring::LifestyleScores;

pub const SYSTEM_INSTRUCTIONS: &str = r#"System role: You are a kind, clear diabetes education assistant.
Audience: Adults with diabetes (patients, not clinicians).
Tone: Warm, encouraging, simple language. Avoid medical jargon.

Rules:
- NO dosing suggestions or insulin adjustments.
- Focus on general education and ADA/FDA-aligned safety.
- Always include red flags for when to contact a doctor.
- Mark that buccal insulin films are experimental/research stage.
- Keep output short and scannable (bullets, headings)."#;

const USER_INPUT_TEMPLATE: &str = r#"User profile:
{profile}

Write a patient-friendly education plan with the following sections:

1) **Disclaimer**
   - Short paragraph reminding this is education only.

2) **Your Current Regimen (Education)**
   - Restate their diabetes type, therapy, injections per day, and any medications in simple terms.

3) **ADA Glycemic Targets**
   - General fasting, post-meal, A1C targets with note these are individualized.

4) **Lifestyle & Self-Care**
   - **Diet, Exercise, Monitoring, Stress/Sleep** (short bullets).

5) **Injection Comfort & Adherence**
   - Simple comfort tips.

6) **Red Flags & Safety**
   - When to contact a doctor.

7) **Medication Education (Based on ADA & FDA)**
   - For each medication they listed, generate a short patient-friendly handout:
     - What it is (drug class, simple explanation)
     - When/how it is generally used (oral/injection/IV, food timing if relevant)
     - Common side effects
     - Safety alerts / red flags (from ADA/FDA patient guidance)
   - If multiple meds, list them separately.

8) **New Delivery Option: Buccal Insulin Films (Research Stage)**
   - Explain briefly in plain language.

9) **Question: Would You Consider This Option?**

10) **References**
   - ADA Standards of Care, ADA Hypoglycemia guidance, CDC Carb Counting basics.

Output must use numbered headings in the form "1) Title" and bullet points for clarity."#;

/// Renders the profile as one `key: value` line per field.
pub fn describe_profile(
    profile: &ProfileInput,
    scores: &LifestyleScores,
    submitted_at: DateTime<Utc>,
) -> String {
    let topics = profile
        .topics()
        .map(|topic| topic.label())
        .collect::<Vec<_>>()
        .join(", ");
    let sleep = profile
        .sleep_hours()
        .map_or_else(|| "not provided".to_string(), |hours| format!("{hours} hours/night"));

    let lines = [
        format!("- diabetes_type: {}", profile.diabetes_type()),
        format!("- therapy_type: {}", profile.therapy_type()),
        format!("- fasting_range: {}", profile.fasting_range()),
        format!("- injections_per_day: {}", profile.injections_per_day()),
        format!(
            "- hypo_last_week: {}",
            if profile.hypo_last_week() { "Yes" } else { "No" }
        ),
        format!("- burden_score: {}/10", profile.burden_score()),
        format!("- activity_minutes_per_week: {}", profile.activity_minutes()),
        format!("- sleep: {sleep}"),
        format!("- diet_adherence: {}", profile.diet_adherence()),
        format!("- glucose_monitoring: {}", profile.monitoring_frequency()),
        format!(
            "- lifestyle_scores (0-10): diet {}, exercise {}, monitoring {}, sleep {}",
            scores.diet, scores.exercise, scores.monitoring, scores.sleep
        ),
        format!(
            "- topics: {}",
            if topics.is_empty() { "none selected" } else { topics.as_str() }
        ),
        format!(
            "- medications: {}",
            profile.medication_name().unwrap_or("none listed")
        ),
        format!("- medication_route: {}", profile.route()),
        format!(
            "- timestamp: {}",
            submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
    ];
    lines.join("\n")
}

/// Builds the full language-model request for one form submission.
pub fn build_summary_request(
    profile: &ProfileInput,
    scores: &LifestyleScores,
    submitted_at: DateTime<Utc>,
) -> SummaryRequest {
    SummaryRequest {
        system_instructions: SYSTEM_INSTRUCTIONS.to_string(),
        user_profile: USER_INPUT_TEMPLATE
            .replace("{profile}", &describe_profile(profile, scores, submitted_at)),
    }
}
