// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Slurm job accounting.
//!
//! Architecture:
//! - CPU cycle: step daemons in /proc -> job step -> cpuset cgroup + session CPU usage
//! - Memory cycle: memory cgroup tree (uid/job/step) -> usage and limit counters
//! - Collector mode: runs both cycles on their own periods, NDJSON on stdout

pub mod collector;
pub mod cpu;
pub mod identify;
pub mod memory;
pub mod types;

pub use collector::{run_collector_mode, EventSink, NdjsonSink};
pub use cpu::CpuCollector;
pub use memory::MemoryCollector;
pub use types::{CpuSnapshot, Event, JobStep, Measurement, MemorySnapshot, Record, SENTINEL};

use crate::config::MetricSet;
use crate::error::Result;

/// One fetch cycle, invoked once per collection interval by the runner.
///
/// Implementations keep no state between calls, so a single instance can be
/// fetched repeatedly and different instances can run on different threads.
pub trait JobCollector: Send {
    fn metricset(&self) -> MetricSet;

    /// Sample every job step currently visible on the node.
    fn fetch(&self) -> Result<Vec<Record>>;
}
