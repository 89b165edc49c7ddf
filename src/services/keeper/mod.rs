// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

pub mod blacklist;
pub mod evaluator;
pub mod scan;
pub mod stats;
pub mod supervisor;
pub mod unwrap;

pub use blacklist::Blacklist;
pub use evaluator::Evaluator;
pub use scan::{PassSummary, ScanLoop};
pub use stats::{KeeperStats, StatsSnapshot};
pub use supervisor::Supervisor;
pub use unwrap::{UnwrapOutcome, Unwrapper};
