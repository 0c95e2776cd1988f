//! Scripted collaborators for discovery integration tests
//!
//! Both mocks record every unit they are asked about and can be told to fail on the Nth
//! call. Clones share their call log, so a test can hand one clone to the assembler and
//! inspect the other afterwards.

#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use watermark_discovery::clock::Clock;
use watermark_discovery::discovery::{ChangeDetector, WorkUnitAssembler};
use watermark_discovery::error::{DiscoveryError, DiscoveryResult};
use watermark_discovery::models::{FieldSchema, UnitDescriptor, Watermark};
use watermark_discovery::providers::UpdateTimeProvider;
use watermark_discovery::watermark::WatermarkStore;

/// Update times keyed by complete name; unknown units report 0
#[derive(Debug, Clone, Default)]
pub struct ScriptedUpdateProvider {
    update_times: HashMap<String, i64>,
    delays: HashMap<String, Duration>,
    fail_on_call: Option<usize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedUpdateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_update_time(mut self, unit: &str, update_time: i64) -> Self {
        self.update_times.insert(unit.to_string(), update_time);
        self
    }

    /// Delay the answer for `unit`
    pub fn with_delay(mut self, unit: &str, delay: Duration) -> Self {
        self.delays.insert(unit.to_string(), delay);
        self
    }

    /// Fail the `call`th lookup (1-based)
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl UpdateTimeProvider for ScriptedUpdateProvider {
    async fn get_update_time(&self, unit: &UnitDescriptor) -> DiscoveryResult<i64> {
        let name = unit.complete_name();
        let call = {
            let mut calls = self.calls.lock();
            calls.push(name.clone());
            calls.len()
        };

        if let Some(delay) = self.delays.get(&name) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_on_call == Some(call) {
            return Err(DiscoveryError::update_provider(name, "scripted failure"));
        }

        Ok(self.update_times.get(&name).copied().unwrap_or(0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Previous watermarks keyed by complete name; unknown units are at zero
#[derive(Debug, Clone, Default)]
pub struct ScriptedWatermarkStore {
    watermarks: HashMap<String, Watermark>,
    fail_on_call: Option<usize>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watermark(mut self, unit: &str, watermark: i64) -> Self {
        self.watermarks
            .insert(unit.to_string(), Watermark::new(watermark));
        self
    }

    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl WatermarkStore for ScriptedWatermarkStore {
    async fn get_previous_high_watermark(&self, unit: &UnitDescriptor) -> DiscoveryResult<Watermark> {
        let name = unit.complete_name();
        let call = {
            let mut calls = self.calls.lock();
            calls.push(name.clone());
            calls.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(DiscoveryError::watermark_store(name, "scripted failure"));
        }

        Ok(self.watermarks.get(&name).copied().unwrap_or(Watermark::ZERO))
    }
}

/// Clock that moves forward by one millisecond every time it is read
#[derive(Debug)]
pub struct TickingClock {
    start: i64,
    next: AtomicI64,
}

impl TickingClock {
    pub fn starting_at(millis: i64) -> Self {
        Self {
            start: millis,
            next: AtomicI64::new(millis),
        }
    }

    /// Number of times the clock has been read
    pub fn reads(&self) -> i64 {
        self.next.load(Ordering::SeqCst) - self.start
    }
}

impl Clock for TickingClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// `db.<name>`, partitioned by a single string `dt` column
pub fn partitioned_table(name: &str) -> UnitDescriptor {
    UnitDescriptor::table("db", name).with_partition_key(FieldSchema::new("dt", "string"))
}

pub fn assembler_with(
    provider: &ScriptedUpdateProvider,
    store: Arc<dyn WatermarkStore>,
    clock: Arc<dyn Clock>,
) -> WorkUnitAssembler {
    WorkUnitAssembler::new(ChangeDetector::new(Arc::new(provider.clone())), store).with_clock(clock)
}
