// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Records produced by the collectors and their NDJSON envelope.

use serde::Serialize;

/// Marks a numeric field as unavailable for this cycle
pub const SENTINEL: i64 = -1;

/// A job step as identified from the step daemon or the cgroup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStep {
    /// Numeric owner, only used to build cgroup paths
    #[serde(skip)]
    pub uid: u32,
    /// Login name of the owner, empty when the uid could not be resolved
    pub job_user: String,
    pub jobid: u64,
    /// Step token ("0", "batch", "extern"...), empty for a job-level record
    pub step: String,
}

/// CPU accounting for one job step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuSnapshot {
    /// Utilization of the requested cores in percent, within [0, 100]
    pub cpuutil: f64,
    /// Cores in use, `cpuutil * cpureq / 100`
    pub cpuused: f64,
    /// Physical cores assigned to the step
    pub cpureq: u32,
}

impl CpuSnapshot {
    /// Derive the snapshot from the requested core count and the summed CPU
    /// percentage of the step's session.
    ///
    /// With no requested core the utilization is undefined and both derived
    /// fields carry [`SENTINEL`].
    pub fn compute(cpureq: u32, summed_percent: f64) -> Self {
        if cpureq == 0 {
            return Self {
                cpuutil: SENTINEL as f64,
                cpuused: SENTINEL as f64,
                cpureq,
            };
        }

        let cores = f64::from(cpureq);
        let cpuutil = (summed_percent / cores).clamp(0.0, 100.0);
        Self {
            cpuutil,
            cpuused: cpuutil * cores / 100.0,
            cpureq,
        }
    }
}

/// Memory accounting for one job step, or one job without steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemorySnapshot {
    /// Usage in bytes
    pub memusage: i64,
    /// Configured limit in bytes
    pub memreq: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measurement {
    Cpu(CpuSnapshot),
    Memory(MemorySnapshot),
}

/// One emitted record: classification fields followed by measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub job: JobStep,
    #[serde(flatten)]
    pub measurement: Measurement,
}

impl Record {
    pub fn cpu(job: JobStep, snapshot: CpuSnapshot) -> Self {
        Self {
            job,
            measurement: Measurement::Cpu(snapshot),
        }
    }

    pub fn memory(job: JobStep, snapshot: MemorySnapshot) -> Self {
        Self {
            job,
            measurement: Measurement::Memory(snapshot),
        }
    }
}

/// A record as written on stdout, one NDJSON line per record.
#[derive(Debug, Clone, Serialize)]
pub struct Event<'a> {
    /// Metric set discriminator ("job_cpu" or "job_mem")
    #[serde(rename = "type")]
    pub msg_type: &'static str,

    /// Hostname of the node the record was sampled on
    pub node: &'a str,

    /// Unix timestamp in milliseconds, captured before the fetch started
    pub timestamp: u64,

    #[serde(flatten)]
    pub record: &'a Record,
}

impl Event<'_> {
    /// Get current time as milliseconds since UNIX epoch
    pub fn now() -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
