use std::time::Duration;

use anyhow::{Context, Result};
use rhythm_curve::{Dispatch, RhythmError, Submission};
use serde::Serialize;
use tracing::debug;

/// Posts submissions as JSON to a remote endpoint.
pub struct HttpDispatcher {
    endpoint: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct Envelope<'a> {
    submission: &'a Submission,
}

impl HttpDispatcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl Dispatch for HttpDispatcher {
    fn dispatch(&self, submission: &Submission) -> Result<(), RhythmError> {
        debug!(endpoint = %self.endpoint, "posting submission");
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&Envelope { submission })
            .send()
            .map_err(|e| RhythmError::Dispatch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(RhythmError::Dispatch(format!("{status}: {body}")));
        }
        Ok(())
    }
}
