// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! CPU fetch cycle: from running step daemons outward to their cpuset cgroups.

use std::path::PathBuf;

use super::identify::identify_step_daemon;
use super::types::{CpuSnapshot, Record};
use super::JobCollector;
use crate::cgroup::count_cpu_list;
use crate::cgroup::types::{step_dir, CPUSET_CPUS};
use crate::config::{Config, MetricSet};
use crate::error::{read_file, Result};
use crate::process::parser::clock_ticks;
use crate::process::{CpuSampler, ProcessEntry, SessionUsage};
use crate::topology::TopologyReader;

/// Produces one [`CpuSnapshot`] per running job step.
///
/// Holds only configuration; every fetch recomputes the topology, the
/// process table and the session usage from scratch.
#[derive(Debug, Clone)]
pub struct CpuCollector {
    proc_root: PathBuf,
    cpuset_root: PathBuf,
    step_daemon: String,
    topology: TopologyReader,
    sampler: CpuSampler,
}

impl CpuCollector {
    pub fn new(config: &Config) -> Self {
        Self {
            proc_root: config.proc_root.clone(),
            cpuset_root: config.cpuset_root.clone(),
            step_daemon: config.step_daemon.clone(),
            topology: TopologyReader::new(config.topology_command.clone()),
            sampler: CpuSampler::from_config(config),
        }
    }

    /// Run one CPU cycle.
    ///
    /// Fails only when the topology or the process table cannot be read.
    /// A step daemon whose metadata or cpuset cannot be read is logged and
    /// left out of the result.
    pub fn fetch(&self) -> Result<Vec<Record>> {
        let threads_per_core = self.topology.threads_per_core()?;
        let (table, usage) = self.sampler.sample(&self.proc_root, clock_ticks())?;

        let mut records = Vec::new();
        for daemon in table.by_name(&self.step_daemon) {
            match self.measure(daemon, threads_per_core, &usage) {
                Ok(record) => records.push(record),
                Err(err) => log::error!("skipping step daemon {}: {err}", daemon.pid),
            }
        }

        log::debug!(
            "cpu cycle: {} records from {} processes, {threads_per_core} threads per core",
            records.len(),
            table.len()
        );
        Ok(records)
    }

    fn measure(&self, daemon: &ProcessEntry, threads_per_core: u32, usage: &SessionUsage) -> Result<Record> {
        let job = identify_step_daemon(&self.proc_root, daemon.pid)?;

        let cpus_path = step_dir(&self.cpuset_root, job.uid, job.jobid, &job.step).join(CPUSET_CPUS);
        let cpus = count_cpu_list(&read_file(&cpus_path)?);
        let cpureq = cpus / threads_per_core;

        let summed_percent = usage.get(&daemon.stat.session).copied().unwrap_or(0.0);
        if cpureq == 0 {
            log::warn!(
                "job {} step {}: no full core in {} ({cpus} cpus), utilization unavailable",
                job.jobid,
                job.step,
                cpus_path.display()
            );
        }

        Ok(Record::cpu(job, CpuSnapshot::compute(cpureq, summed_percent)))
    }
}

impl JobCollector for CpuCollector {
    fn metricset(&self) -> MetricSet {
        MetricSet::Cpu
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        CpuCollector::fetch(self)
    }
}
