// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-process CPU percentages computed from `/proc` accounting counters,
//! summed per session.

use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::parser::{read_uptime, scan_processes};
use super::types::{ProcStat, ProcessTable};
use crate::config::{Config, CpuSampling};
use crate::error::Result;

/// Summed CPU percentage of all processes in each session, keyed by session id.
pub type SessionUsage = HashMap<u32, f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuSampler {
    /// `(utime + stime)` over the time since the process started
    Lifetime,
    /// Counter delta between two scans taken `window` apart
    Interval(Duration),
}

impl CpuSampler {
    pub fn from_config(config: &Config) -> Self {
        match config.cpu_sampling {
            CpuSampling::Lifetime => CpuSampler::Lifetime,
            CpuSampling::Interval => CpuSampler::Interval(config.sample_window()),
        }
    }

    /// Scan the process table and compute per-session usage.
    ///
    /// The returned table is the most recent scan.
    pub fn sample(&self, proc_root: &Path, clock_ticks: u64) -> Result<(ProcessTable, SessionUsage)> {
        match *self {
            CpuSampler::Lifetime => {
                let table = scan_processes(proc_root)?;
                let uptime = read_uptime(proc_root)?;
                let usage = lifetime_usage(&table, uptime, clock_ticks);
                Ok((table, usage))
            }
            CpuSampler::Interval(window) => {
                let before = scan_processes(proc_root)?;
                thread::sleep(window);
                let after = scan_processes(proc_root)?;
                let usage = interval_usage(&before, &after, clock_ticks);
                Ok((after, usage))
            }
        }
    }
}

/// CPU percent over the process lifetime, as `ps -o pcpu` reports it.
pub fn lifetime_percent(stat: &ProcStat, uptime_secs: f64, clock_ticks: u64) -> f64 {
    let ticks = clock_ticks as f64;
    let running_secs = uptime_secs - stat.starttime as f64 / ticks;
    if running_secs <= 0.0 {
        return 0.0;
    }
    stat.total_time() as f64 / ticks / running_secs * 100.0
}

pub fn lifetime_usage(table: &ProcessTable, uptime_secs: f64, clock_ticks: u64) -> SessionUsage {
    let mut usage = SessionUsage::new();
    for p in &table.processes {
        *usage.entry(p.stat.session).or_default() += lifetime_percent(&p.stat, uptime_secs, clock_ticks);
    }
    usage
}

/// Percentages from the counter delta between two scans.
///
/// Processes are matched by (pid, starttime) so a recycled pid is not taken
/// for the process it replaced. A process present in only one scan counts 0.
pub fn interval_usage(before: &ProcessTable, after: &ProcessTable, clock_ticks: u64) -> SessionUsage {
    let mut usage = SessionUsage::new();
    let elapsed = after.taken_at.duration_since(before.taken_at).as_secs_f64();

    let prev: HashMap<(u32, u64), u64> = before
        .processes
        .iter()
        .map(|p| ((p.pid, p.stat.starttime), p.stat.total_time()))
        .collect();

    for p in &after.processes {
        let percent = match prev.get(&(p.pid, p.stat.starttime)) {
            Some(&prev_ticks) if elapsed > 0.0 => {
                let delta_secs = p.stat.total_time().saturating_sub(prev_ticks) as f64 / clock_ticks as f64;
                delta_secs / elapsed * 100.0
            }
            _ => 0.0,
        };
        *usage.entry(p.stat.session).or_default() += percent;
    }
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::types::ProcessEntry;
    use std::time::Instant;

    fn proc_entry(pid: u32, session: u32, ticks: u64, starttime: u64) -> ProcessEntry {
        ProcessEntry {
            pid,
            stat: ProcStat {
                comm: "python".to_string(),
                session,
                utime: ticks,
                stime: 0,
                starttime,
            },
        }
    }

    #[test]
    fn test_lifetime_percent() {
        // started at t=100s, now t=300s, used 100s of CPU -> 50%
        let stat = proc_entry(1, 1, 10_000, 10_000).stat;
        let pct = lifetime_percent(&stat, 300.0, 100);
        assert!((pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_lifetime_percent_not_started() {
        let stat = proc_entry(1, 1, 10, 50_000).stat;
        assert_eq!(lifetime_percent(&stat, 100.0, 100), 0.0);
    }

    #[test]
    fn test_lifetime_usage_sums_sessions() {
        let table = ProcessTable {
            processes: vec![
                proc_entry(10, 10, 10_000, 0), // 100% over 100s
                proc_entry(11, 10, 5_000, 0),  // 50%
                proc_entry(20, 20, 2_500, 0),  // 25%
            ],
            taken_at: Instant::now(),
        };
        let usage = lifetime_usage(&table, 100.0, 100);
        assert!((usage[&10] - 150.0).abs() < 1e-9);
        assert!((usage[&20] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_interval_usage() {
        let t0 = Instant::now();
        let before = ProcessTable {
            processes: vec![proc_entry(10, 10, 1_000, 5), proc_entry(11, 10, 0, 6), proc_entry(12, 10, 0, 7)],
            taken_at: t0,
        };
        let after = ProcessTable {
            processes: vec![
                proc_entry(10, 10, 1_200, 5), // +2s of CPU over 2s -> 100%
                proc_entry(11, 10, 100, 6),   // +1s -> 50%
                proc_entry(12, 10, 900, 99),  // pid reused: ignored
                proc_entry(13, 10, 400, 8),   // new process: ignored
            ],
            taken_at: t0 + Duration::from_secs(2),
        };
        let usage = interval_usage(&before, &after, 100);
        assert!((usage[&10] - 150.0).abs() < 1e-9);
    }
}
