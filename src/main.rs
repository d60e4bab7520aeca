use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use logagg::cli::Cli;
use logagg::config::{Config, StaticFilesConfig};
use logagg::counters::MemCounters;
use logagg::error::FatalError;
use logagg::oracles::{NoSpinner, NullGeoOracle, StaticAgentOracle, StdIpOracle};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_format.is_empty() {
        return Err(FatalError::MissingLogFormat.into());
    }
    if cli.date_format.is_empty() {
        return Err(FatalError::MissingDateFormat.into());
    }

    let mut cfg = Config::new(cli.log_format.clone(), cli.date_format.clone());
    cfg.input.double_decode = cli.double_decode;
    cfg.classify.ignore_qstr = cli.ignore_qstr;
    cfg.classify.append_method = cli.append_method;
    cfg.classify.append_protocol = cli.append_protocol;
    cfg.classify.code444_as_404 = cli.code444_as_404;
    cfg.classify.client_err_to_unique_count = cli.client_err_to_unique_count;
    cfg.classify.ignore_crawlers = cli.ignore_crawlers;
    cfg.classify.ignore_ip_idx = !cli.ignore_ip.is_empty();
    cfg.classify.list_agents = cli.list_agents;
    cfg.classify.geoip_database = cli.geoip_city;
    cfg.classify.ignore_referers = cli.ignore_referer.clone();
    cfg.static_files = StaticFilesConfig {
        extensions: cli.static_ext.clone(),
        max_len: cli.static_min_len,
    };

    let ip_oracle = StdIpOracle {
        ignore_ranges: cli.ignore_ip.iter().filter_map(|s| parse_cidr(s)).collect(),
    };
    let agent_oracle = StaticAgentOracle;
    let geo_oracle = NullGeoOracle;
    let spinner = NoSpinner;
    let mut counters = MemCounters::new();

    let stdin_only = cli.files.is_empty() || (cli.files.len() == 1 && cli.files[0] == "-");
    let stats = if stdin_only {
        let reader = BufReader::new(io::stdin());
        logagg::driver::run(reader, &mut cfg, &ip_oracle, &agent_oracle, &geo_oracle, &mut counters, &spinner, cli.test)
    } else {
        let mut last = Default::default();
        for path in &cli.files {
            let file = File::open(path).with_context(|| FatalError::InputOpenFailure(path.clone()))?;
            let reader = BufReader::new(file);
            last = logagg::driver::run(reader, &mut cfg, &ip_oracle, &agent_oracle, &geo_oracle, &mut counters, &spinner, cli.test);
        }
        last
    };

    eprintln!(
        "process={} invalid={} exclude_ip={} resp_size={}",
        stats.process, stats.invalid, stats.exclude_ip, stats.resp_size
    );

    if cli.test.is_some() && !stats.test_format_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}

/// Parses `addr/prefix` (defaulting to a host-only /32 or /128 when no
/// prefix is given) for `--ignore-ip`.
fn parse_cidr(s: &str) -> Option<(std::net::IpAddr, u8)> {
    let (addr, prefix) = match s.split_once('/') {
        Some((a, p)) => (a, p.parse().ok()?),
        None => (s, 0),
    };
    let addr: std::net::IpAddr = addr.parse().ok()?;
    let prefix = if prefix == 0 {
        match addr {
            std::net::IpAddr::V4(_) => 32,
            std::net::IpAddr::V6(_) => 128,
        }
    } else {
        prefix
    };
    Some((addr, prefix))
}
