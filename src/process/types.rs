// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::time::Instant;

/// The subset of `/proc/[pid]/stat` the collectors need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcStat {
    /// Executable name (comm, at most 15 bytes)
    pub comm: String,
    /// Session ID (field 6)
    pub session: u32,
    /// User CPU time in clock ticks
    pub utime: u64,
    /// System CPU time in clock ticks
    pub stime: u64,
    /// Start time in clock ticks after boot (field 22)
    pub starttime: u64,
}

impl ProcStat {
    /// Total CPU time in clock ticks
    pub fn total_time(&self) -> u64 {
        self.utime + self.stime
    }
}

/// A live process seen during one scan of the proc root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub stat: ProcStat,
}

/// All processes visible in one pass over the proc root.
#[derive(Debug, Clone)]
pub struct ProcessTable {
    pub processes: Vec<ProcessEntry>,
    /// When the scan started, used as the sample time for rate computations
    pub taken_at: Instant,
}

impl ProcessTable {
    /// Processes whose executable name equals `name` exactly.
    ///
    /// This does not see through renamed or wrapped binaries.
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ProcessEntry> + 'a {
        self.processes.iter().filter(move |p| p.stat.comm == name)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, comm: &str) -> ProcessEntry {
        ProcessEntry {
            pid,
            stat: ProcStat {
                comm: comm.to_string(),
                session: pid,
                utime: 10,
                stime: 5,
                starttime: 100,
            },
        }
    }

    #[test]
    fn test_by_name_exact_match() {
        let table = ProcessTable {
            processes: vec![
                entry(10, "slurmstepd"),
                entry(11, "slurmd"),
                entry(12, "slurmstepd.sh"),
                entry(13, "slurmstepd"),
            ],
            taken_at: Instant::now(),
        };

        let pids: Vec<u32> = table.by_name("slurmstepd").map(|p| p.pid).collect();
        assert_eq!(pids, vec![10, 13]);
    }

    #[test]
    fn test_total_time() {
        assert_eq!(entry(1, "x").stat.total_time(), 15);
    }
}
