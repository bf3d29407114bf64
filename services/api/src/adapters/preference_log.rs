//! services/api/src/adapters/preference_log.rs
//!
//! This module contains the CSV-file adapter for the `PreferenceStore` port.
//! Rows are appended one at a time under a process-wide writer lock; the header
//! row is written when the file is first created and checked on every later use.

use async_trait::async_trait;
use diabetes_education_core::ports::{PortError, PortResult, PreferenceStore};
use diabetes_education_core::PreferenceRecord;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A preference log stored as a CSV file.
#[derive(Clone)]
pub struct CsvPreferenceLog {
    inner: Arc<LogFile>,
}

struct LogFile {
    path: PathBuf,
    /// Serializes writers (and readers, so they never see a half-written row).
    lock: Mutex<()>,
}

impl CsvPreferenceLog {
    /// Creates a new `CsvPreferenceLog`. The file is not touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LogFile {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

fn unexpected(e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// Blocking File Operations
//=========================================================================================

impl LogFile {
    /// Length of the log file, or `None` if it does not exist yet.
    fn current_len(&self) -> PortResult<Option<u64>> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unexpected(e)),
        }
    }

    /// Rejects a log whose header does not list exactly the expected columns.
    fn check_header(&self) -> PortResult<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(unexpected)?;
        let found: Vec<String> = reader
            .headers()
            .map_err(unexpected)?
            .iter()
            .map(str::to_string)
            .collect();

        if found.iter().map(String::as_str).eq(PreferenceRecord::COLUMNS) {
            Ok(())
        } else {
            Err(PortError::SchemaDrift {
                expected: PreferenceRecord::COLUMNS.iter().map(|c| c.to_string()).collect(),
                found,
            })
        }
    }

    fn append(&self, record: &PreferenceRecord) -> PortResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| PortError::Unexpected("preference log lock poisoned".to_string()))?;

        let needs_header = match self.current_len()? {
            None | Some(0) => true,
            Some(_) => {
                self.check_header()?;
                false
            }
        };

        if needs_header {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(unexpected)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(unexpected)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            debug!(path = %self.path.display(), "Creating preference log");
            writer
                .write_record(PreferenceRecord::COLUMNS)
                .map_err(unexpected)?;
        }
        writer.serialize(record).map_err(unexpected)?;
        writer.flush().map_err(unexpected)?;
        Ok(())
    }

    fn read_all(&self) -> PortResult<Vec<PreferenceRecord>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| PortError::Unexpected("preference log lock poisoned".to_string()))?;

        match self.current_len()? {
            None | Some(0) => return Ok(Vec::new()),
            Some(_) => self.check_header()?,
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(unexpected)?;
        reader
            .deserialize()
            .collect::<Result<Vec<PreferenceRecord>, _>>()
            .map_err(unexpected)
    }
}

//=========================================================================================
// `PreferenceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PreferenceStore for CsvPreferenceLog {
    async fn append_record(&self, record: PreferenceRecord) -> PortResult<()> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.append(&record))
            .await
            .map_err(unexpected)?
    }

    async fn read_records(&self) -> PortResult<Vec<PreferenceRecord>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.read_all())
            .await
            .map_err(unexpected)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diabetes_education_core::{
        DeliveryRoute, DiabetesType, DietAdherence, FastingRange, MonitoringFrequency,
        ProfileForm, ProfileInput, SurveyAnswer, TherapyType, Topic,
    };
    use uuid::Uuid;

    fn profile() -> ProfileInput {
        ProfileInput::try_from(ProfileForm {
            diabetes_type: DiabetesType::Type2,
            therapy_type: TherapyType::OralMedication,
            fasting_range: FastingRange::From131To180,
            injections_per_day: 0,
            hypo_last_week: true,
            burden_score: 2,
            activity_minutes: 60,
            sleep_hours: None,
            diet_adherence: DietAdherence::Rarely,
            monitoring_frequency: MonitoringFrequency::Daily,
            topics: vec![Topic::CarbCounting, Topic::SickDayRules],
            medication_name: Some("Metformin".to_string()),
            route: DeliveryRoute::Oral,
        })
        .unwrap()
    }

    fn raw_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn reading_a_missing_log_returns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvPreferenceLog::new(dir.path().join("absent.csv"));
        assert!(log.read_records().await.unwrap().is_empty());
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn appended_records_read_back_in_order_with_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvPreferenceLog::new(dir.path().join("nested/log.csv"));

        let sessions: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut written = Vec::new();
        for (i, session) in sessions.iter().enumerate() {
            let record = if i == 1 {
                PreferenceRecord::preference_saved(
                    *session,
                    SurveyAnswer::Yes,
                    Some("Sounds easier, \"no needles\"".to_string()),
                    None,
                    Utc::now(),
                )
            } else {
                PreferenceRecord::summary_generated(*session, &profile(), Utc::now())
            };
            log.append_record(record.clone()).await.unwrap();
            written.push(record);
        }

        let rows = raw_rows(log.path());
        assert_eq!(rows.len(), 3 + 1);
        assert_eq!(rows[0], PreferenceRecord::COLUMNS.to_vec());

        let read = log.read_records().await.unwrap();
        assert_eq!(read, written);
    }

    #[tokio::test]
    async fn header_drift_is_rejected_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        fs::write(&path, "timestamp,session_id,event\n").unwrap();
        let log = CsvPreferenceLog::new(&path);

        let record = PreferenceRecord::summary_generated(Uuid::new_v4(), &profile(), Utc::now());
        let err = log.append_record(record).await.unwrap_err();
        assert!(matches!(err, PortError::SchemaDrift { ref found, .. } if found.len() == 3));
        assert_eq!(fs::read_to_string(&path).unwrap(), "timestamp,session_id,event\n");
        assert!(log.read_records().await.is_err());
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = CsvPreferenceLog::new(dir.path().join("busy.csv"));

        let mut handles = Vec::new();
        for _ in 0..25 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                let record = PreferenceRecord::summary_generated(Uuid::new_v4(), &profile(), Utc::now());
                log.append_record(record).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let rows = raw_rows(log.path());
        assert_eq!(rows.len(), 26);
        assert!(rows.iter().all(|row| row.len() == PreferenceRecord::COLUMNS.len()));
        assert_eq!(log.read_records().await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn append_to_unwritable_location_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let log = CsvPreferenceLog::new(blocker.join("log.csv"));

        let record = PreferenceRecord::summary_generated(Uuid::new_v4(), &profile(), Utc::now());
        assert!(matches!(
            log.append_record(record).await,
            Err(PortError::Unexpected(_))
        ));
    }
}
