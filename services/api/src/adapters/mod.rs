pub mod pdf;
pub mod preference_log;
pub mod summary_llm;

pub use pdf::PdfSummaryRenderer;
pub use preference_log::CsvPreferenceLog;
pub use summary_llm::OpenAiSummaryAdapter;
