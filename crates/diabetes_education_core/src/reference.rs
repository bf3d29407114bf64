//! crates/diabetes_education_core/src/reference.rs
//!
//! Static reference material shown next to every generated summary.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GlycemicTarget {
    pub measure: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Reference {
    pub title: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReferenceMaterial {
    pub disclaimer: &'static str,
    pub glycemic_targets: &'static [GlycemicTarget],
    pub low_glucose_rule: &'static str,
    pub buccal_insulin_note: &'static str,
    pub references: &'static [Reference],
}

pub const DISCLAIMER: &str = "This summary is for education only and is not medical advice. \
Talk with your diabetes care team before changing anything about your treatment.";

/// General ADA targets for most non-pregnant adults. Individual targets vary.
pub const GLYCEMIC_TARGETS: &[GlycemicTarget] = &[
    GlycemicTarget {
        measure: "Fasting / before meals",
        target: "80-130 mg/dL",
    },
    GlycemicTarget {
        measure: "1-2 hours after starting a meal",
        target: "Below 180 mg/dL",
    },
    GlycemicTarget {
        measure: "A1C",
        target: "Below 7%",
    },
    GlycemicTarget {
        measure: "Time in range (70-180 mg/dL)",
        target: "More than 70% of readings",
    },
];

pub const LOW_GLUCOSE_RULE: &str = "Rule of 15: if glucose is below 70 mg/dL, take 15 g of \
fast-acting carbohydrate, recheck after 15 minutes, and repeat if still below 70 mg/dL.";

pub const BUCCAL_INSULIN_NOTE: &str = "Buccal insulin films dissolve against the inside of the \
cheek. They are still in research and are not an approved treatment.";

pub const REFERENCES: &[Reference] = &[
    Reference {
        title: "ADA Standards of Care in Diabetes",
        url: "https://diabetesjournals.org/care/issue/48/Supplement_1",
    },
    Reference {
        title: "ADA: Hypoglycemia (Low Blood Glucose)",
        url: "https://diabetes.org/living-with-diabetes/hypoglycemia-low-blood-glucose",
    },
    Reference {
        title: "CDC: Carb Counting",
        url: "https://www.cdc.gov/diabetes/healthy-eating/carb-counting-manage-blood-sugar.html",
    },
];

pub const REFERENCE_MATERIAL: ReferenceMaterial = ReferenceMaterial {
    disclaimer: DISCLAIMER,
    glycemic_targets: GLYCEMIC_TARGETS,
    low_glucose_rule: LOW_GLUCOSE_RULE,
    buccal_insulin_note: BUCCAL_INSULIN_NOTE,
    references: REFERENCES,
};
