//! Driver (§4.10, §5): reads lines, runs each through parse → classify →
//! dispatch, and maintains the running totals the exit-status / progress
//! collaborators consult.
//!
//! Grounded in `pre_process_log()`/`read_log()` in the original `parser.c`.
//! Test mode mirrors `test_format()`'s early exit after `n` lines with no
//! aggregation; full mode mirrors the unbounded `read_log()` loop.

use std::io::BufRead;

use crate::classify::classify;
use crate::config::Config;
use crate::counters::Counters;
use crate::dispatch::dispatch;
use crate::error::{ExcludeReason, LineOutcome};
use crate::line_parser::parse_line;
use crate::oracles::{AgentOracle, GeoOracle, IpOracle, Spinner};

/// Running totals maintained across a drive (§4.10, §6 exit-status check).
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverStats {
    pub process: u64,
    pub invalid: u64,
    pub exclude_ip: u64,
    pub resp_size: u64,
}

impl DriverStats {
    /// `test_format`'s success criterion (§6): at least one line parsed,
    /// and not every parsed line was invalid.
    pub fn test_format_succeeded(&self) -> bool {
        self.process > 0 && self.process != self.invalid
    }
}

/// Orchestrates one drive over `reader`. `n_test_lines`: `Some(n)` runs test
/// mode (process at most `n` lines, never dispatch); `None` runs full mode
/// to EOF (§4.10).
#[allow(clippy::too_many_arguments)]
pub fn run<R: BufRead>(
    reader: R,
    cfg: &mut Config,
    ip_oracle: &dyn IpOracle,
    agent_oracle: &dyn AgentOracle,
    geo_oracle: &dyn GeoOracle,
    counters: &mut dyn Counters,
    spinner: &dyn Spinner,
    n_test_lines: Option<usize>,
) -> DriverStats {
    let mut stats = DriverStats::default();
    let mut processed_in_test = 0usize;

    for line in reader.lines() {
        let Ok(line) = line else { break };

        // Comment/blank lines fail `valid_line()` in the original, which
        // counts as invalid rather than being silently skipped (§7).
        if line.starts_with('#') || line.is_empty() {
            bump_invalid(&mut stats, spinner, counters);
            continue;
        }

        if let Some(limit) = n_test_lines {
            if processed_in_test >= limit {
                break;
            }
            processed_in_test += 1;
        }

        bump_process(&mut stats, spinner, counters);

        let mut item = match parse_line(&line, cfg, ip_oracle) {
            Ok(item) => item,
            Err(_reason) => {
                bump_invalid(&mut stats, spinner, counters);
                continue;
            }
        };

        if !item.is_valid() {
            bump_invalid(&mut stats, spinner, counters);
            continue;
        }

        // %u is optional; a format without it leaves agent unset (§4.10).
        if item.agent.is_none() {
            item.agent = Some("-".to_string());
        }

        if n_test_lines.is_some() {
            // Test mode never classifies or dispatches (§4.10).
            continue;
        }

        let (classified, outcome) = classify(item, cfg, ip_oracle, agent_oracle);

        match outcome {
            LineOutcome::Accepted if classified.date_key.is_none() => {
                // process_date() failing is its own invalid case (§4.7).
                bump_invalid(&mut stats, spinner, counters);
            }
            LineOutcome::Accepted => {
                stats.resp_size += classified.item.resp_size;
                dispatch(&classified, cfg, agent_oracle, geo_oracle, counters);
            }
            LineOutcome::Excluded(ExcludeReason::Ip) => {
                stats.exclude_ip += 1;
                counters.general_stats_mut().exclude_ip += 1;
            }
            LineOutcome::Excluded(_) => {}
            LineOutcome::Invalid(_) => {
                bump_invalid(&mut stats, spinner, counters);
            }
        }
    }

    stats
}

/// Mirrors `count_process()`: bumps both the driver's own `process` total
/// and `general_stats["total_requests"]` together, under the same spinner
/// lock.
fn bump_process(stats: &mut DriverStats, spinner: &dyn Spinner, counters: &mut dyn Counters) {
    with_spinner_lock(spinner, || {
        stats.process += 1;
        counters.general_stats_mut().total_requests += 1;
    });
}

/// Mirrors `count_invalid()`: bumps both the driver's own `invalid` total
/// and `general_stats["failed_requests"]` together.
fn bump_invalid(stats: &mut DriverStats, spinner: &dyn Spinner, counters: &mut dyn Counters) {
    with_spinner_lock(spinner, || {
        stats.invalid += 1;
        counters.general_stats_mut().failed_requests += 1;
    });
}

/// Takes the spinner's mutex around a counter mutation iff it's running
/// (§5: `SPN_RUN` gating), matching the original's cooperative single
/// reader thread plus an independently rendering progress thread.
fn with_spinner_lock(spinner: &dyn Spinner, f: impl FnOnce()) {
    if spinner.is_running() {
        spinner.lock();
        f();
        spinner.unlock();
    } else {
        f();
    }
}
