// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use nix::unistd::{sysconf, SysconfVar, Uid, User};

use super::types::{ProcStat, ProcessEntry, ProcessTable};
use crate::error::{read_dir, read_file, read_file_lossy, Error, Result};

/// Fallback when sysconf(_SC_CLK_TCK) is unavailable; standard on Linux
const DEFAULT_CLOCK_TICKS: u64 = 100;

/// Scan every numeric entry of `proc_root`.
///
/// Only failing to list `proc_root` itself is an error. Processes that exit
/// between listing and reading, or whose stat cannot be parsed, are skipped.
pub fn scan_processes(proc_root: &Path) -> Result<ProcessTable> {
    let taken_at = Instant::now();
    let mut processes = Vec::new();

    for entry in read_dir(proc_root)?.filter_map(|e| e.ok()) {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };

        match read_file_lossy(&entry.path().join("stat")).and_then(|content| parse_proc_stat(&content)) {
            Ok(stat) => processes.push(ProcessEntry { pid, stat }),
            Err(err) => log::debug!("skipping pid {pid}: {err}"),
        }
    }

    processes.sort_by_key(|p| p.pid);
    Ok(ProcessTable { processes, taken_at })
}

pub fn parse_proc_stat(content: &str) -> Result<ProcStat> {
    let invalid = || Error::parse("/proc/[pid]/stat", content.trim());

    // Find comm between parentheses (handles names with spaces/parens)
    let start = content.find('(').ok_or_else(invalid)?;
    let end = content.rfind(')').ok_or_else(invalid)?;
    if end < start {
        return Err(invalid());
    }
    let comm = content[start + 1..end].to_string();

    // Fields after comm, 0-indexed from the state field (field 3 in proc(5))
    let fields: Vec<&str> = content[end + 1..].split_whitespace().collect();
    if fields.len() < 20 {
        return Err(invalid());
    }

    let num = |i: usize| fields[i].parse::<u64>().map_err(|_| invalid());

    Ok(ProcStat {
        comm,
        session: num(3)? as u32,
        utime: num(11)?,
        stime: num(12)?,
        starttime: num(19)?,
    })
}

/// Decode `Name:\tvalue` lines of `/proc/[pid]/status` into a map.
pub fn parse_status_fields(content: &str) -> HashMap<&str, &str> {
    content
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .collect()
}

/// Real user id: the first of the four ids on the `Uid:` line.
pub fn parse_real_uid(status: &str) -> Result<u32> {
    let fields = parse_status_fields(status);
    let uid_line = fields
        .get("Uid")
        .ok_or_else(|| Error::parse("/proc/[pid]/status (no Uid field)", ""))?;

    uid_line
        .split_whitespace()
        .next()
        .and_then(|uid| uid.parse().ok())
        .ok_or_else(|| Error::parse("Uid field", *uid_line))
}

/// Extract `(jobid, step)` from a step daemon command line such as
/// `slurmstepd: [1234.batch]`.
pub fn parse_job_step(cmdline: &str) -> Result<(u64, String)> {
    let invalid = || Error::parse("step daemon cmdline", cmdline.replace('\0', " ").trim().to_string());

    let start = cmdline.find('[').ok_or_else(invalid)?;
    let token = cmdline[start + 1..]
        .split(|c: char| c == '\0' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    let (jobid, step) = token.split_once('.').ok_or_else(invalid)?;

    let jobid = jobid.parse::<u64>().map_err(|_| invalid())?;
    let step = step.strip_suffix(']').unwrap_or(step);
    if step.is_empty() {
        return Err(invalid());
    }

    Ok((jobid, step.to_string()))
}

/// Seconds since boot, from the first field of `<proc_root>/uptime`.
pub fn read_uptime(proc_root: &Path) -> Result<f64> {
    let content = read_file(&proc_root.join("uptime"))?;
    content
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::parse("/proc/uptime", content.trim()))
}

/// Kernel clock ticks per second (USER_HZ)
pub fn clock_ticks() -> u64 {
    match sysconf(SysconfVar::CLK_TCK) {
        Ok(Some(ticks)) if ticks > 0 => ticks as u64,
        _ => {
            log::warn!("sysconf(CLK_TCK) unavailable, assuming {DEFAULT_CLOCK_TICKS}");
            DEFAULT_CLOCK_TICKS
        }
    }
}

/// Look up the login name for a numeric user id.
pub fn resolve_username(uid: u32) -> Result<String> {
    match User::from_uid(Uid::from_raw(uid)) {
        Ok(Some(user)) => Ok(user.name),
        Ok(None) => Err(Error::Lookup {
            uid,
            reason: "no such user".to_string(),
        }),
        Err(errno) => Err(Error::Lookup {
            uid,
            reason: errno.desc().to_string(),
        }),
    }
}
