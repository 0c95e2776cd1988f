use super::EventPublisher;
use crate::constants::events;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::models::Watermark;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Why a unit produced no work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Update time is not after the low watermark
    NotChanged,
    /// Low watermark is after the run's expected high watermark
    LowWatermarkAhead,
}

/// Informational note for a unit that was evaluated but not emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub unit: String,
    pub update_time: i64,
    pub low_watermark: Watermark,
    pub reason: SkipReason,
}

/// Counters and notes accumulated over one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub datasets_visited: usize,
    pub units_evaluated: usize,
    pub work_units_emitted: usize,
    pub skipped: Vec<SkippedUnit>,
}

/// State scoped to a single discovery run
///
/// Created fresh for every call and dropped with it; nothing here outlives the run.
#[derive(Debug)]
pub struct RunContext {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    publisher: Option<EventPublisher>,
    event_prefix: String,
    report: Mutex<RunReport>,
}

impl RunContext {
    pub fn new(publisher: Option<EventPublisher>, event_prefix: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            publisher,
            event_prefix: event_prefix.into(),
            report: Mutex::new(RunReport::default()),
        }
    }

    /// Context that publishes no events
    pub fn detached() -> Self {
        Self::new(None, "")
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Publish `payload` as event `name` under the run's prefix, tagged with the run id
    pub fn emit<T: Serialize + ?Sized>(&self, name: &str, payload: &T) -> DiscoveryResult<()> {
        let Some(publisher) = &self.publisher else {
            return Ok(());
        };

        let mut context =
            serde_json::to_value(payload).map_err(|e| DiscoveryError::Event(format!("{name}: {e}")))?;
        if let Value::Object(map) = &mut context {
            map.insert("run_id".to_string(), Value::String(self.run_id.to_string()));
        }

        publisher.publish(events::qualified(&self.event_prefix, name), context);
        Ok(())
    }

    pub fn record_dataset(&self) {
        self.report.lock().datasets_visited += 1;
    }

    pub fn record_evaluated(&self) {
        self.report.lock().units_evaluated += 1;
    }

    pub fn record_emitted(&self) {
        self.report.lock().work_units_emitted += 1;
    }

    pub fn record_skipped(&self, skipped: SkippedUnit) {
        self.report.lock().skipped.push(skipped);
    }

    /// Snapshot of the report so far
    pub fn report(&self) -> RunReport {
        self.report.lock().clone()
    }

    pub fn into_report(self) -> RunReport {
        self.report.into_inner()
    }
}
