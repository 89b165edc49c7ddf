// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const QUIET_MODULES: &str = "h2=info,hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info,alloy_rpc_client=info";

/// A bare level ("debug") gets quiet defaults for transport crates; a custom
/// directive string (with ',' or '=') is used as-is.
pub fn filter_spec(log_level: &str) -> String {
    let normalized = log_level.trim();
    if normalized.is_empty() {
        return format!("info,{QUIET_MODULES}");
    }
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!("{normalized},{QUIET_MODULES}")
    }
}

pub fn setup_logging(log_level: &str, json_format: bool) {
    let spec = filter_spec(log_level);
    let filter = EnvFilter::from_str(&spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false);
        subscriber.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer().with_target(true).compact();
        subscriber.with(fmt_layer).init();
    }

    let base = spec.split(',').next().unwrap_or("info");
    tracing::info!(
        base,
        format = if json_format { "json" } else { "compact" },
        "Logging initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_gets_quiet_transport_defaults() {
        let spec = filter_spec("debug");
        assert!(spec.starts_with("debug,"));
        assert!(spec.contains("hyper=info"));
        assert!(EnvFilter::from_str(&spec).is_ok());
    }

    #[test]
    fn custom_directives_pass_through() {
        assert_eq!(filter_spec("info,harvest=trace"), "info,harvest=trace");
        assert!(filter_spec("  ").starts_with("info,"));
    }
}
