// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

pub mod parser;
pub mod types;
pub mod usage;

pub use parser::scan_processes;
pub use types::{ProcStat, ProcessEntry, ProcessTable};
pub use usage::{CpuSampler, SessionUsage};
