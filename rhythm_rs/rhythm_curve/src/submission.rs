//! Submission relay: forward to a remote endpoint, fall back to local storage.
//!
//! Nothing here is allowed to block or fail the quiz flow. `SubmissionRelay::submit`
//! reports what happened but never returns an error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::answers::QuizAnswers;
use crate::RhythmError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub email: String,
    pub quiz_results: QuizAnswers,
    pub timestamp: DateTime<Utc>,
}

impl Submission {
    pub fn new(email: impl Into<String>, quiz_results: QuizAnswers) -> Self {
        Self::at(email, quiz_results, Utc::now())
    }

    pub fn at(email: impl Into<String>, quiz_results: QuizAnswers, timestamp: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            quiz_results,
            timestamp,
        }
    }
}

/// Local persistence for submissions that could not be forwarded.
pub trait SubmissionStore {
    fn save(&self, submission: &Submission) -> Result<(), RhythmError>;
    fn load_all(&self) -> Result<Vec<Submission>, RhythmError>;
}

/// Forwards a submission to a remote service.
pub trait Dispatch {
    fn dispatch(&self, submission: &Submission) -> Result<(), RhythmError>;
}

/// Submissions kept as a JSON array in a single file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionStore for JsonFileStore {
    fn save(&self, submission: &Submission) -> Result<(), RhythmError> {
        let mut all = self.load_all()?;
        all.push(submission.clone());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RhythmError::Storage(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        let text = serde_json::to_string_pretty(&all)
            .map_err(|e| RhythmError::Serialization(e.to_string()))?;
        fs::write(&self.path, text)
            .map_err(|e| RhythmError::Storage(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), count = all.len(), "submission stored");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Submission>, RhythmError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RhythmError::Storage(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| RhythmError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    submissions: Mutex<Vec<Submission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for MemoryStore {
    fn save(&self, submission: &Submission) -> Result<(), RhythmError> {
        self.submissions
            .lock()
            .map_err(|_| RhythmError::Storage("memory store poisoned".into()))?
            .push(submission.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Submission>, RhythmError> {
        self.submissions
            .lock()
            .map(|all| all.clone())
            .map_err(|_| RhythmError::Storage("memory store poisoned".into()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    Dispatched,
    StoredLocally,
    Dropped,
}

pub struct SubmissionRelay<S> {
    dispatcher: Option<Box<dyn Dispatch>>,
    store: S,
}

impl<S: SubmissionStore> SubmissionRelay<S> {
    pub fn local_only(store: S) -> Self {
        Self {
            dispatcher: None,
            store,
        }
    }

    pub fn with_dispatcher(dispatcher: Box<dyn Dispatch>, store: S) -> Self {
        Self {
            dispatcher: Some(dispatcher),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn submit(&self, submission: &Submission) -> RelayOutcome {
        if let Some(dispatcher) = self.dispatcher.as_ref() {
            match dispatcher.dispatch(submission) {
                Ok(()) => {
                    info!(email = %submission.email, "submission dispatched");
                    return RelayOutcome::Dispatched;
                }
                Err(err) => warn!("dispatch failed, storing locally: {}", err),
            }
        }
        match self.store.save(submission) {
            Ok(()) => RelayOutcome::StoredLocally,
            Err(err) => {
                warn!("failed to store submission locally: {}", err);
                RelayOutcome::Dropped
            }
        }
    }
}
