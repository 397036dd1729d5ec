// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Map a `slurmstepd` process to the job step it runs.

use std::path::Path;

use super::types::JobStep;
use crate::error::{read_file_lossy, Result};
use crate::process::parser::{parse_job_step, parse_real_uid, resolve_username};

/// Identify the job step served by step daemon `pid`.
///
/// The owner comes from the real uid in `status`, the job and step from the
/// `[<jobid>.<step>]` process title in `cmdline`. An unresolvable uid only
/// blanks the user name.
pub fn identify_step_daemon(proc_root: &Path, pid: u32) -> Result<JobStep> {
    let pid_dir = proc_root.join(pid.to_string());

    let status = read_file_lossy(&pid_dir.join("status"))?;
    let uid = parse_real_uid(&status)?;
    let job_user = username_or_blank(uid);

    let cmdline = read_file_lossy(&pid_dir.join("cmdline"))?;
    let (jobid, step) = parse_job_step(&cmdline)?;

    Ok(JobStep {
        uid,
        job_user,
        jobid,
        step,
    })
}

pub(crate) fn username_or_blank(uid: u32) -> String {
    resolve_username(uid).unwrap_or_else(|err| {
        log::warn!("{err}");
        String::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;

    fn write_pid(root: &Path, pid: u32, status: &str, cmdline: &str) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("status"), status).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
    }

    #[test]
    fn test_identify_step_daemon() {
        let root = tempfile::tempdir().unwrap();
        write_pid(
            root.path(),
            4242,
            "Name:\tslurmstepd\nPid:\t4242\nUid:\t0\t0\t0\t0\n",
            "slurmstepd: [1234.batch]\0",
        );

        let job = identify_step_daemon(root.path(), 4242).unwrap();
        assert_eq!(
            job,
            JobStep {
                uid: 0,
                job_user: "root".to_string(),
                jobid: 1234,
                step: "batch".to_string(),
            }
        );
    }

    #[test]
    fn test_identify_unknown_uid_leaves_user_blank() {
        let root = tempfile::tempdir().unwrap();
        write_pid(root.path(), 7, "Uid:\t3999999999\t0\t0\t0\n", "slurmstepd: [77.0]");

        let job = identify_step_daemon(root.path(), 7).unwrap();
        assert_eq!(job.job_user, "");
        assert_eq!(job.jobid, 77);
        assert_eq!(job.step, "0");
    }

    #[test]
    fn test_identify_bad_cmdline() {
        let root = tempfile::tempdir().unwrap();
        write_pid(root.path(), 8, "Uid:\t0\t0\t0\t0\n", "/usr/sbin/slurmstepd\0");

        assert!(matches!(
            identify_step_daemon(root.path(), 8),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_identify_vanished_process() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            identify_step_daemon(root.path(), 9),
            Err(Error::FileAccess { .. })
        ));
    }
}
