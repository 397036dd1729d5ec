// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

//! Host CPU topology via `lscpu`.

use std::collections::HashMap;
use std::process::Command;

use crate::error::{Error, Result};

/// Label of the `lscpu` line holding the SMT width
pub const THREADS_PER_CORE: &str = "Thread(s) per core";

/// Runs the topology reporter and extracts the number of hardware threads
/// per physical core. Nothing is cached: every call spawns the tool again.
#[derive(Debug, Clone)]
pub struct TopologyReader {
    command: Vec<String>,
}

impl TopologyReader {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn threads_per_core(&self) -> Result<u32> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| Error::parse("topology command", ""))?;
        let command_line = self.command.join(" ");

        // lscpu translates its labels
        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|io| Error::ToolInvocation {
                command: command_line.clone(),
                io,
            })?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                command: command_line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_threads_per_core(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Decode `label: value` lines into a map. Lines without a colon are ignored.
pub fn parse_fields(output: &str) -> HashMap<&str, &str> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(label, value)| (label.trim(), value.trim()))
        .collect()
}

pub fn parse_threads_per_core(output: &str) -> Result<u32> {
    let fields = parse_fields(output);
    let value = fields
        .get(THREADS_PER_CORE)
        .ok_or_else(|| Error::parse("lscpu output (no threads per core)", output.trim()))?;

    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::parse("threads per core", *value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSCPU: &str = "Architecture:                       x86_64\n\
                         CPU op-mode(s):                     32-bit, 64-bit\n\
                         Byte Order:                         Little Endian\n\
                         CPU(s):                             64\n\
                         On-line CPU(s) list:                0-63\n\
                         Vendor ID:                          AuthenticAMD\n\
                         Model name:                         AMD EPYC 7302 16-Core Processor\n\
                         Thread(s) per core:                 2\n\
                         Core(s) per socket:                 16\n\
                         Socket(s):                          2\n";

    #[test]
    fn test_parse_threads_per_core() {
        assert_eq!(parse_threads_per_core(LSCPU).unwrap(), 2);
    }

    #[test]
    fn test_parse_threads_per_core_any_position() {
        // older lscpu versions print the field as the sixth line
        let output = "Architecture: x86_64\nThread(s) per core: 1\nCPU(s): 8\n";
        assert_eq!(parse_threads_per_core(output).unwrap(), 1);
    }

    #[test]
    fn test_parse_threads_per_core_missing() {
        let err = parse_threads_per_core("Architecture: aarch64\nCPU(s): 8\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_parse_threads_per_core_invalid() {
        assert!(parse_threads_per_core("Thread(s) per core: two\n").is_err());
        assert!(parse_threads_per_core("Thread(s) per core: 0\n").is_err());
    }

    #[test]
    fn test_parse_fields_keeps_colons_in_value() {
        let fields = parse_fields("Flags: a:b\n");
        assert_eq!(fields.get("Flags"), Some(&"a:b"));
    }

    #[test]
    fn test_reader_runs_command() {
        let reader = TopologyReader::new(vec!["echo".into(), "Thread(s) per core:    4".into()]);
        assert_eq!(reader.threads_per_core().unwrap(), 4);
    }

    #[test]
    fn test_reader_forces_c_locale() {
        // prints the english label only when the child runs under LC_ALL=C
        let script = r#"if [ "$LC_ALL" = C ]; then echo "Thread(s) per core: 2"; else echo "Thread(s) pro Kern: 2"; fi"#;
        let reader = TopologyReader::new(vec!["sh".into(), "-c".into(), script.into()]);
        assert_eq!(reader.threads_per_core().unwrap(), 2);
    }

    #[test]
    fn test_reader_missing_tool() {
        let reader = TopologyReader::new(vec!["/nonexistent/lscpu".into()]);
        assert!(matches!(
            reader.threads_per_core(),
            Err(Error::ToolInvocation { .. })
        ));
    }

    #[test]
    fn test_reader_failing_tool() {
        let reader = TopologyReader::new(vec!["false".into()]);
        assert!(matches!(reader.threads_per_core(), Err(Error::ToolFailed { .. })));
    }
}
