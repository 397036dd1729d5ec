// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::path::Path;

use super::types::CgroupEntry;
use crate::error::{read_dir, read_file, Error, Result};

/// Count the CPUs in a cpuset list such as `0-3,8,10-11`.
///
/// Malformed tokens, and tokens that would overflow the count, are logged and
/// skipped; the rest are still counted.
pub fn count_cpu_list(cpulist: &str) -> u32 {
    let mut total: u32 = 0;
    for item in cpulist.trim().split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let counted = parse_cpu_list_item(item)
            .and_then(|n| total.checked_add(n).ok_or_else(|| Error::parse("cpu list token", item)));
        match counted {
            Ok(sum) => total = sum,
            Err(err) => log::error!("skipping cpu list token: {err}"),
        }
    }
    total
}

// handles "n" or "start-end"
fn parse_cpu_list_item(item: &str) -> Result<u32> {
    let invalid = || Error::parse("cpu list token", item);

    match item.split_once('-') {
        Some((start, end)) => {
            let start: u32 = start.trim().parse().map_err(|_| invalid())?;
            let end: u32 = end.trim().parse().map_err(|_| invalid())?;
            if end < start {
                return Err(invalid());
            }
            (end - start).checked_add(1).ok_or_else(invalid)
        }
        None => item.parse::<u32>().map(|_| 1).map_err(|_| invalid()),
    }
}

/// Read a single integer counter file such as `memory.usage_in_bytes`.
pub fn read_counter(path: &Path) -> Result<i64> {
    let content = read_file(path)?;
    content
        .trim()
        .parse()
        .map_err(|_| Error::parse("cgroup counter", content.trim()))
}

/// List the subdirectories of `dir` named `<prefix><id>`.
///
/// Numeric ids come first in numeric order (`job_9` before `job_10`), then the
/// others by name (`step_0`, `step_1`, `step_batch`, `step_extern`).
pub fn list_prefixed(dir: &Path, prefix: &str) -> Result<Vec<CgroupEntry>> {
    let mut entries: Vec<CgroupEntry> = read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let id = name.strip_prefix(prefix)?.to_string();
            Some(CgroupEntry { path: e.path(), id })
        })
        .collect();

    entries.sort_by_cached_key(|e| {
        let numeric = e.id.parse::<u64>().ok();
        (numeric.is_none(), numeric, e.id.clone())
    });
    Ok(entries)
}
