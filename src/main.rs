// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use slurm_jobstat::slurm::run_collector_mode;
use slurm_jobstat::{Config, CpuSampling, MetricSet};

#[derive(Parser, Debug)]
#[command(name = "slurm-jobstat")]
#[command(about = "Per-job CPU and memory sampler for Slurm compute nodes (NDJSON on stdout)")]
#[command(version)]
struct Args {
    /// TOML configuration file; command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run every enabled metric set once and exit
    #[arg(long)]
    once: bool,

    /// Metric sets to collect
    #[arg(long, value_enum, value_delimiter = ',')]
    metricsets: Option<Vec<MetricSet>>,

    /// Period of the CPU cycle in milliseconds
    #[arg(long)]
    cpu_period: Option<u64>,

    /// Period of the memory cycle in milliseconds
    #[arg(long)]
    memory_period: Option<u64>,

    /// How per-process CPU percentages are computed
    #[arg(long, value_enum)]
    cpu_sampling: Option<CpuSampling>,

    /// Sampling window in milliseconds (interval sampling only)
    #[arg(long)]
    sample_window: Option<u64>,

    /// Node name attached to records (defaults to the host name)
    #[arg(long)]
    node_name: Option<String>,

    #[arg(long, hide = true)]
    proc_root: Option<PathBuf>,

    #[arg(long, hide = true)]
    cpuset_root: Option<PathBuf>,

    #[arg(long, hide = true)]
    memory_root: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).context("Failed to load configuration")?,
            None => Config::default(),
        };

        if let Some(metricsets) = self.metricsets {
            config.metricsets = metricsets;
        }
        if let Some(ms) = self.cpu_period {
            config.cpu_period_ms = ms;
        }
        if let Some(ms) = self.memory_period {
            config.memory_period_ms = ms;
        }
        if let Some(sampling) = self.cpu_sampling {
            config.cpu_sampling = sampling;
        }
        if let Some(ms) = self.sample_window {
            config.sample_window_ms = ms;
        }
        if self.node_name.is_some() {
            config.node_name = self.node_name;
        }
        if let Some(path) = self.proc_root {
            config.proc_root = path;
        }
        if let Some(path) = self.cpuset_root {
            config.cpuset_root = path;
        }
        if let Some(path) = self.memory_root {
            config.memory_root = path;
        }

        Ok((config, self.once))
    }
}

fn main() -> Result<()> {
    // stdout carries the records, logs go to stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, once) = Args::parse().into_config()?;
    run_collector_mode(&config, once)
}
