// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Collector mode: drives the fetch cycles on their own periods and writes
//! every record as one NDJSON line to stdout.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use super::cpu::CpuCollector;
use super::memory::MemoryCollector;
use super::types::Event;
use super::JobCollector;
use crate::config::{Config, MetricSet};

/// Receives the records of every fetch cycle
pub trait EventSink {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()>;
}

/// Writes one JSON object per line, flushing after each record.
pub struct NdjsonSink<W: Write> {
    out: W,
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for NdjsonSink<W> {
    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// Run one fetch and forward its records to `sink`.
///
/// A failed fetch is logged and yields no records; only a failing sink is
/// reported to the caller. Returns the number of records emitted.
pub fn run_cycle(collector: &dyn JobCollector, node: &str, sink: &mut dyn EventSink) -> io::Result<usize> {
    let msg_type = collector.metricset().event_type();
    // Capture timestamp before sampling
    let timestamp = Event::now();

    let records = match collector.fetch() {
        Ok(records) => records,
        Err(err) => {
            log::error!("{msg_type} cycle aborted: {err}");
            return Ok(0);
        }
    };

    for record in &records {
        sink.emit(&Event {
            msg_type,
            node,
            timestamp,
            record,
        })?;
    }
    Ok(records.len())
}

/// Build one collector per enabled metric set, ignoring duplicates.
pub fn build_collectors(config: &Config) -> Vec<Box<dyn JobCollector>> {
    let mut seen = Vec::new();
    let mut collectors: Vec<Box<dyn JobCollector>> = Vec::new();
    for &metricset in &config.metricsets {
        if seen.contains(&metricset) {
            continue;
        }
        seen.push(metricset);
        let collector: Box<dyn JobCollector> = match metricset {
            MetricSet::Cpu => Box::new(CpuCollector::new(config)),
            MetricSet::Memory => Box::new(MemoryCollector::new(config)),
        };
        collectors.push(collector);
    }
    collectors
}

/// Run the collector mode until SIGINT/SIGTERM, or for a single round when
/// `once` is set.
pub fn run_collector_mode(config: &Config, once: bool) -> Result<()> {
    let node = config.node_name.clone().unwrap_or_else(|| {
        hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    });

    let collectors = build_collectors(config);
    if collectors.is_empty() {
        bail!("no metric set enabled");
    }

    let mut sink = NdjsonSink::new(io::stdout().lock());

    if once {
        for collector in &collectors {
            run_cycle(collector.as_ref(), &node, &mut sink)?;
        }
        return Ok(());
    }

    log::info!(
        "collector starting on node '{node}' (pid {}), metric sets: {:?}",
        std::process::id(),
        config.metricsets
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(err) = ctrlc::set_handler(move || shutdown_clone.store(true, Ordering::SeqCst)) {
        log::warn!("cannot install signal handler: {err}");
    }

    let mut next_due = vec![Instant::now(); collectors.len()];
    let sleep_chunk = Duration::from_millis(100);

    while !shutdown.load(Ordering::SeqCst) {
        for (collector, due) in collectors.iter().zip(next_due.iter_mut()) {
            let started = Instant::now();
            if started < *due {
                continue;
            }
            let emitted = run_cycle(collector.as_ref(), &node, &mut sink)?;
            log::debug!(
                "{}: {emitted} records in {:?}",
                collector.metricset().event_type(),
                started.elapsed()
            );
            *due = started + config.period(collector.metricset());
        }

        // Sleep until the next cycle is due (check for shutdown more frequently)
        let wake = next_due.iter().min().copied().unwrap_or_else(Instant::now);
        while !shutdown.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= wake {
                break;
            }
            thread::sleep(sleep_chunk.min(wake - now));
        }
    }

    log::info!("collector received shutdown signal, exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::slurm::types::{JobStep, MemorySnapshot, Record};

    struct FixedCollector(Vec<Record>);

    impl JobCollector for FixedCollector {
        fn metricset(&self) -> MetricSet {
            MetricSet::Memory
        }

        fn fetch(&self) -> crate::Result<Vec<Record>> {
            Ok(self.0.clone())
        }
    }

    struct FailingCollector;

    impl JobCollector for FailingCollector {
        fn metricset(&self) -> MetricSet {
            MetricSet::Cpu
        }

        fn fetch(&self) -> crate::Result<Vec<Record>> {
            Err(Error::parse("threads per core", "two"))
        }
    }

    fn record(jobid: u64, step: &str) -> Record {
        Record::memory(
            JobStep {
                uid: 1000,
                job_user: "alice".to_string(),
                jobid,
                step: step.to_string(),
            },
            MemorySnapshot {
                memusage: 2048,
                memreq: 4096,
            },
        )
    }

    #[test]
    fn test_run_cycle_writes_ndjson() {
        let collector = FixedCollector(vec![record(1, "0"), record(1, "batch")]);
        let mut sink = NdjsonSink::new(Vec::new());

        let emitted = run_cycle(&collector, "node001", &mut sink).unwrap();
        assert_eq!(emitted, 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "job_mem");
        assert_eq!(first["node"], "node001");
        assert_eq!(first["step"], "0");
        assert_eq!(first["memreq"], 4096);
    }

    #[test]
    fn test_run_cycle_failed_fetch_emits_nothing() {
        let mut sink = NdjsonSink::new(Vec::new());
        assert_eq!(run_cycle(&FailingCollector, "node001", &mut sink).unwrap(), 0);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_build_collectors_dedup() {
        let config = Config {
            metricsets: vec![MetricSet::Memory, MetricSet::Cpu, MetricSet::Memory],
            ..Default::default()
        };
        let kinds: Vec<MetricSet> = build_collectors(&config).iter().map(|c| c.metricset()).collect();
        assert_eq!(kinds, vec![MetricSet::Memory, MetricSet::Cpu]);
    }
}
