// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-job CPU and memory sampling for Slurm compute nodes.
//!
//! Two independent fetch cycles read the cgroup v1 hierarchies Slurm creates
//! (`uid_<uid>/job_<jobid>/step_<step>`) together with `/proc`, and return one
//! [`Record`] per job step:
//!
//! - [`CpuCollector`]: requested cores, utilization and used cores per step
//! - [`MemoryCollector`]: memory usage and limit per step, or per job when the
//!   job has no step cgroups

pub mod cgroup;
pub mod config;
pub mod error;
pub mod process;
pub mod slurm;
pub mod topology;

pub use config::{Config, CpuSampling, MetricSet};
pub use error::{Error, Result};
pub use slurm::{CpuCollector, JobCollector, MemoryCollector, Record};
