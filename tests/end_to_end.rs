//! End-to-end scenarios against the full parse → classify → dispatch →
//! drive pipeline, one per numbered scenario.

use logagg::config::{Config, StaticFilesConfig};
use logagg::counters::MemCounters;
use logagg::oracles::{NoSpinner, NullGeoOracle, StaticAgentOracle, StdIpOracle};
use std::io::Cursor;

const LOG_FORMAT: &str = r#"%h %^[%d:%^] "%r" %s %b "%R" "%u""#;
const DATE_FORMAT: &str = "%d/%b/%Y";

fn run_line(line: &str, mut cfg: Config) -> (logagg::driver::DriverStats, MemCounters) {
    let mut counters = MemCounters::new();
    let stats = logagg::driver::run(
        Cursor::new(format!("{line}\n")),
        &mut cfg,
        &StdIpOracle::new(),
        &StaticAgentOracle,
        &NullGeoOracle,
        &mut counters,
        &NoSpinner,
        None,
    );
    (stats, counters)
}

#[test]
fn scenario_1_combined_line_accepted_and_aggregated() {
    let cfg = Config::new(LOG_FORMAT, DATE_FORMAT);
    let line = r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET /index.html HTTP/1.1" 200 1024 "-" "Mozilla/5.0""#;
    let (stats, counters) = run_line(line, cfg);

    assert_eq!(stats.process, 1);
    assert_eq!(stats.invalid, 0);
    assert_eq!(stats.resp_size, 1024);
    assert_eq!(counters.status_code["200"], 1);
    assert_eq!(counters.requests["/index.html"].hits, 1);
    assert_eq!(counters.hosts["127.0.0.1"], 1);
    assert_eq!(counters.date_bw["20140410"], 1024);
    assert_eq!(counters.unique_vis_by_date["20140410"], 1);
    assert!(counters.unique_visitors.contains("127.0.0.1|20140410|Mozilla/5.0"));
}

#[test]
fn scenario_2_404_status_goes_to_not_found_requests() {
    let cfg = Config::new(LOG_FORMAT, DATE_FORMAT);
    let line = r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET /index.html HTTP/1.1" 404 1024 "-" "Mozilla/5.0""#;
    let (_, counters) = run_line(line, cfg);

    assert!(!counters.requests.contains_key("/index.html"));
    assert_eq!(counters.not_found_requests["/index.html"].hits, 1);
}

#[test]
fn scenario_3_static_file_classified_after_qstr_stripped() {
    let mut cfg = Config::new(LOG_FORMAT, DATE_FORMAT);
    cfg.classify.ignore_qstr = true;
    cfg.static_files = StaticFilesConfig { extensions: vec![".png".into()], max_len: 4 };
    let line = r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET /img/logo.png?v=2 HTTP/1.1" 200 512 "-" "Mozilla/5.0""#;
    let (_, counters) = run_line(line, cfg);

    assert_eq!(counters.requests_static["/img/logo.png"].hits, 1);
    assert!(!counters.requests_static.contains_key("/img/logo.png?v=2"));
}

#[test]
fn scenario_4_google_keyphrase_and_referring_site() {
    let cfg = Config::new(LOG_FORMAT, DATE_FORMAT);
    let line = r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET / HTTP/1.1" 200 256 "http://www.google.com/search?q=hello+world&hl=en" "Mozilla/5.0""#;
    let (_, counters) = run_line(line, cfg);

    assert!(counters.keyphrases.contains_key("hello world"));
    assert!(counters.referring_sites.contains_key("www.google.com"));
}

#[test]
fn scenario_5_malformed_request_line_is_invalid() {
    let cfg = Config::new(r#""%r""#, DATE_FORMAT);
    let mut counters = MemCounters::new();
    let mut cfg = cfg;
    let stats = logagg::driver::run(
        Cursor::new("\"GET HTTP/1.1\"\n"),
        &mut cfg,
        &StdIpOracle::new(),
        &StaticAgentOracle,
        &NullGeoOracle,
        &mut counters,
        &NoSpinner,
        None,
    );

    assert_eq!(stats.invalid, 1);
    assert!(counters.requests.is_empty());
    assert!(counters.not_found_requests.is_empty());
}

#[test]
fn scenario_6_repeated_host_specifier_is_invalid() {
    let mut cfg = Config::new("%h %h", DATE_FORMAT);
    let mut counters = MemCounters::new();
    let stats = logagg::driver::run(
        Cursor::new("1.2.3.4 5.6.7.8 trailing\n"),
        &mut cfg,
        &StdIpOracle::new(),
        &StaticAgentOracle,
        &NullGeoOracle,
        &mut counters,
        &NoSpinner,
        None,
    );

    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.process, 1);
}

#[test]
fn invalid_accepted_excluded_partitions_process_count() {
    let mut cfg = Config::new(LOG_FORMAT, DATE_FORMAT);
    cfg.classify.ignore_ip_idx = true;
    let oracle = StdIpOracle { ignore_ranges: vec![("10.0.0.0".parse().unwrap(), 8)] };

    let log = concat!(
        "not a valid line\n",
        r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET / HTTP/1.1" 200 10 "-" "-""#,
        "\n",
        r#"10.0.0.5 - [10/Apr/2014:12:00:00 +0000] "GET / HTTP/1.1" 200 10 "-" "-""#,
        "\n",
    );
    let mut counters = MemCounters::new();
    let stats = logagg::driver::run(
        Cursor::new(log),
        &mut cfg,
        &oracle,
        &StaticAgentOracle,
        &NullGeoOracle,
        &mut counters,
        &NoSpinner,
        None,
    );

    assert_eq!(stats.process, 3);
    assert_eq!(stats.invalid, 1);
    assert_eq!(stats.exclude_ip, 1);
}
