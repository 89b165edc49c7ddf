// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::common::retry::Backoff;
use crate::services::keeper::scan::{PassSummary, ScanLoop};
use std::time::Duration;
use tokio::time::sleep;

/// Runs scan passes forever. A failed pass backs off and starts over.
pub struct Supervisor {
    scan: ScanLoop,
    backoff: Backoff,
    pass_delay: Duration,
}

impl Supervisor {
    pub fn new(scan: ScanLoop) -> Self {
        let cfg = scan.config();
        let backoff = Backoff::new(cfg.restart_backoff, cfg.restart_backoff_max);
        let pass_delay = cfg.pass_delay;
        Self {
            scan,
            backoff,
            pass_delay,
        }
    }

    pub fn scan(&self) -> &ScanLoop {
        &self.scan
    }

    pub async fn run(mut self) {
        tracing::info!(target: "supervisor", "Keeper started");
        loop {
            if let Ok(summary) = self.step().await {
                tracing::debug!(target: "supervisor", ?summary, "Pass finished");
            }
        }
    }

    /// One pass plus the sleep that follows it.
    pub async fn step(&mut self) -> Result<PassSummary, AppError> {
        match self.scan.run_pass().await {
            Ok(summary) => {
                if self.backoff.failures() > 0 {
                    tracing::info!(
                        target: "supervisor",
                        failures = self.backoff.failures(),
                        "Recovered after failed passes"
                    );
                }
                self.backoff.reset();
                sleep(self.pass_delay).await;
                Ok(summary)
            }
            Err(e) => {
                let stats = self.scan.stats();
                stats.incr(&stats.pass_failures);
                let delay = self.backoff.next_delay();
                tracing::error!(
                    target: "supervisor",
                    error = %e,
                    failures = self.backoff.failures(),
                    restart_in_secs = delay.as_secs(),
                    "Pass failed, restarting"
                );
                sleep(delay).await;
                Err(e)
            }
        }
    }
}
