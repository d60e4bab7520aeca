//! Drives the core against a real log file on disk, the way a CLI invocation
//! would (as opposed to the in-memory `Cursor` fixtures in the other
//! integration tests).

use logagg::config::Config;
use logagg::counters::MemCounters;
use logagg::oracles::{NoSpinner, NullGeoOracle, StaticAgentOracle, StdIpOracle};
use std::fs::File;
use std::io::{BufReader, Write};
use tempfile::NamedTempFile;

#[test]
fn drives_a_log_file_from_disk() {
    let mut file = NamedTempFile::new().expect("create temp log file");
    writeln!(
        file,
        r#"127.0.0.1 - [10/Apr/2014:12:00:00 +0000] "GET /index.html HTTP/1.1" 200 1024 "-" "Mozilla/5.0""#
    )
    .unwrap();
    writeln!(
        file,
        r#"127.0.0.1 - [10/Apr/2014:12:00:01 +0000] "GET /missing HTTP/1.1" 404 0 "-" "Mozilla/5.0""#
    )
    .unwrap();
    file.flush().unwrap();

    let mut cfg = Config::new(r#"%h %^[%d:%^] "%r" %s %b "%R" "%u""#, "%d/%b/%Y");
    let mut counters = MemCounters::new();
    let reader = BufReader::new(File::open(file.path()).expect("reopen temp log file"));
    let stats = logagg::driver::run(
        reader,
        &mut cfg,
        &StdIpOracle::new(),
        &StaticAgentOracle,
        &NullGeoOracle,
        &mut counters,
        &NoSpinner,
        None,
    );

    assert_eq!(stats.process, 2);
    assert_eq!(stats.invalid, 0);
    assert_eq!(counters.requests["/index.html"].hits, 1);
    assert_eq!(counters.not_found_requests["/missing"].hits, 1);
    assert_eq!(counters.general_stats.total_requests, 2);
    assert_eq!(counters.general_stats.failed_requests, 0);
}
