// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

pub mod parser;
pub mod types;

pub use parser::{count_cpu_list, list_prefixed, read_counter};
pub use types::CgroupEntry;
