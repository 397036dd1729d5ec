// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Layout of Slurm's cgroup v1 hierarchies:
//! `<root>/uid_<uid>/job_<jobid>/step_<step>`.

use std::path::{Path, PathBuf};

pub const UID_PREFIX: &str = "uid_";
pub const JOB_PREFIX: &str = "job_";
pub const STEP_PREFIX: &str = "step_";

/// Logical CPUs bound to a cpuset cgroup
pub const CPUSET_CPUS: &str = "cpuset.cpus";
pub const MEMORY_USAGE: &str = "memory.usage_in_bytes";
pub const MEMORY_MAX_USAGE: &str = "memory.max_usage_in_bytes";
pub const MEMORY_LIMIT: &str = "memory.limit_in_bytes";

pub fn job_dir(root: &Path, uid: u32, jobid: u64) -> PathBuf {
    root.join(format!("{UID_PREFIX}{uid}"))
        .join(format!("{JOB_PREFIX}{jobid}"))
}

pub fn step_dir(root: &Path, uid: u32, jobid: u64, step: &str) -> PathBuf {
    job_dir(root, uid, jobid).join(format!("{STEP_PREFIX}{step}"))
}

/// A child cgroup directory whose name carries one of the prefixes above
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupEntry {
    /// Full path to the cgroup directory
    pub path: PathBuf,
    /// Directory name with the prefix removed
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_dir() {
        let dir = step_dir(Path::new("/sys/fs/cgroup/cpuset/slurm"), 1000, 456, "batch");
        assert_eq!(
            dir,
            PathBuf::from("/sys/fs/cgroup/cpuset/slurm/uid_1000/job_456/step_batch")
        );
    }
}
