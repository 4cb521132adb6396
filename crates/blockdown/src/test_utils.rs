//! Test helpers shared by the module tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::admission::{Probe, ProbeError};

/// Probe with canned answers that records every URL it is asked about
pub struct StubProbe {
    statuses: HashMap<String, u16>,
    delays: HashMap<String, Duration>,
    fallback: Option<u16>,
    calls: Mutex<Vec<String>>,
}

impl StubProbe {
    /// Every URL answers 200
    pub fn ok() -> Self {
        Self::status(200)
    }

    /// Every URL answers `status`
    pub fn status(status: u16) -> Self {
        Self {
            statuses: HashMap::new(),
            delays: HashMap::new(),
            fallback: Some(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every URL fails with a transport error
    pub fn unreachable() -> Self {
        Self {
            fallback: None,
            ..Self::ok()
        }
    }

    /// Override the answer for one URL
    pub fn with(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    /// Answer for one URL only after `millis`
    pub fn delayed(mut self, url: &str, millis: u64) -> Self {
        self.delays.insert(url.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Probe for StubProbe {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.statuses
            .get(url)
            .copied()
            .or(self.fallback)
            .ok_or_else(|| ProbeError::Transport("connection refused".to_string()))
    }
}
