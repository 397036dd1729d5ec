// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Memory fetch cycle: walks `uid_*/job_*/step_*` under the memory cgroup root.

use std::path::{Path, PathBuf};

use super::identify::username_or_blank;
use super::types::{JobStep, MemorySnapshot, Record, SENTINEL};
use super::JobCollector;
use crate::cgroup::types::{
    CgroupEntry, JOB_PREFIX, MEMORY_LIMIT, MEMORY_MAX_USAGE, MEMORY_USAGE, STEP_PREFIX, UID_PREFIX,
};
use crate::cgroup::{list_prefixed, read_counter};
use crate::config::{Config, MetricSet};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct MemoryCollector {
    root: PathBuf,
}

impl MemoryCollector {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.memory_root.clone(),
        }
    }

    /// Run one memory cycle.
    ///
    /// Jobs with step cgroups yield one record per step; jobs without any
    /// yield a single job-level record with an empty step. Only an unreadable
    /// root is an error, deeper failures skip the affected subtree or field.
    pub fn fetch(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for uid_entry in list_prefixed(&self.root, UID_PREFIX)? {
            let Ok(uid) = uid_entry.id.parse::<u32>() else {
                log::error!("skipping {}: invalid uid", uid_entry.path.display());
                continue;
            };
            let job_user = username_or_blank(uid);

            let jobs = match list_prefixed(&uid_entry.path, JOB_PREFIX) {
                Ok(jobs) => jobs,
                Err(err) => {
                    log::error!("skipping {}: {err}", uid_entry.path.display());
                    continue;
                }
            };

            for job_entry in jobs {
                walk_job(&job_entry, uid, &job_user, &mut records);
            }
        }

        log::debug!("memory cycle: {} records", records.len());
        Ok(records)
    }
}

fn walk_job(job_entry: &CgroupEntry, uid: u32, job_user: &str, records: &mut Vec<Record>) {
    let Ok(jobid) = job_entry.id.parse::<u64>() else {
        log::error!("skipping {}: invalid job id", job_entry.path.display());
        return;
    };

    let steps = match list_prefixed(&job_entry.path, STEP_PREFIX) {
        Ok(steps) => steps,
        Err(err) => {
            log::error!("skipping {}: {err}", job_entry.path.display());
            return;
        }
    };

    let job = |step: &str| JobStep {
        uid,
        job_user: job_user.to_string(),
        jobid,
        step: step.to_string(),
    };

    if steps.is_empty() {
        // aggregate-only job: peak usage and limit of the job cgroup itself
        let snapshot = MemorySnapshot {
            memusage: counter_or_sentinel(&job_entry.path.join(MEMORY_MAX_USAGE)),
            memreq: counter_or_sentinel(&job_entry.path.join(MEMORY_LIMIT)),
        };
        records.push(Record::memory(job(""), snapshot));
        return;
    }

    for step in steps {
        let snapshot = MemorySnapshot {
            memusage: counter_or_sentinel(&step.path.join(MEMORY_USAGE)),
            memreq: counter_or_sentinel(&step.path.join(MEMORY_LIMIT)),
        };
        records.push(Record::memory(job(&step.id), snapshot));
    }
}

fn counter_or_sentinel(path: &Path) -> i64 {
    read_counter(path).unwrap_or_else(|err| {
        log::error!("{err}");
        SENTINEL
    })
}

impl JobCollector for MemoryCollector {
    fn metricset(&self) -> MetricSet {
        MetricSet::Memory
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        MemoryCollector::fetch(self)
    }
}
