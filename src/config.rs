// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Collector configuration: defaults, optionally overlaid by a TOML file.
//! Command line flags are applied on top by the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{read_file, Error, Result};

/// Default cgroup v1 cpuset hierarchy used by Slurm's task/cgroup plugin
pub const CPUSET_ROOT: &str = "/sys/fs/cgroup/cpuset/slurm";
/// Default cgroup v1 memory hierarchy used by Slurm's task/cgroup plugin
pub const MEMORY_ROOT: &str = "/sys/fs/cgroup/memory/slurm";
pub const PROC_ROOT: &str = "/proc";
/// Executable name of the per-step Slurm daemon
pub const STEP_DAEMON: &str = "slurmstepd";

/// How per-process CPU percentages are derived from `/proc/<pid>/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CpuSampling {
    /// CPU time over process lifetime, the same figure `ps -o pcpu` prints
    Lifetime,
    /// CPU time consumed during a short wall-clock window
    Interval,
}

/// The two independent fetch cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricSet {
    Cpu,
    Memory,
}

impl MetricSet {
    /// Name used as the record `type` on the wire
    pub fn event_type(self) -> &'static str {
        match self {
            MetricSet::Cpu => "job_cpu",
            MetricSet::Memory => "job_mem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Node name attached to every record (host name when unset)
    pub node_name: Option<String>,
    pub proc_root: PathBuf,
    pub cpuset_root: PathBuf,
    pub memory_root: PathBuf,
    pub step_daemon: String,
    /// argv of the topology reporter; must print a `Thread(s) per core:` line
    pub topology_command: Vec<String>,
    pub cpu_sampling: CpuSampling,
    /// Length of the sampling window for [`CpuSampling::Interval`]
    pub sample_window_ms: u64,
    pub cpu_period_ms: u64,
    pub memory_period_ms: u64,
    pub metricsets: Vec<MetricSet>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_name: None,
            proc_root: PathBuf::from(PROC_ROOT),
            cpuset_root: PathBuf::from(CPUSET_ROOT),
            memory_root: PathBuf::from(MEMORY_ROOT),
            step_daemon: STEP_DAEMON.to_string(),
            topology_command: vec!["lscpu".to_string()],
            cpu_sampling: CpuSampling::Lifetime,
            sample_window_ms: 500,
            cpu_period_ms: 10_000,
            memory_period_ms: 10_000,
            metricsets: vec![MetricSet::Cpu, MetricSet::Memory],
        }
    }
}

impl Config {
    /// Load a TOML file; keys that are absent keep their default value.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    pub fn period(&self, metricset: MetricSet) -> Duration {
        match metricset {
            MetricSet::Cpu => Duration::from_millis(self.cpu_period_ms),
            MetricSet::Memory => Duration::from_millis(self.memory_period_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.memory_root, PathBuf::from("/sys/fs/cgroup/memory/slurm"));
        assert_eq!(config.step_daemon, "slurmstepd");
        assert_eq!(config.cpu_sampling, CpuSampling::Lifetime);
        assert_eq!(config.period(MetricSet::Cpu), Duration::from_secs(10));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobstat.toml");
        fs::write(
            &path,
            "memory_root = \"/tmp/mem\"\ncpu_sampling = \"interval\"\nmetricsets = [\"memory\"]\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.memory_root, PathBuf::from("/tmp/mem"));
        assert_eq!(config.cpu_sampling, CpuSampling::Interval);
        assert_eq!(config.metricsets, vec![MetricSet::Memory]);
        // untouched keys keep their defaults
        assert_eq!(config.cpuset_root, PathBuf::from(CPUSET_ROOT));
    }

    #[test]
    fn test_load_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobstat.toml");
        fs::write(&path, "memroot = \"/tmp/mem\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }
}
