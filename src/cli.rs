// CLI-specific types and structures
// This module contains the command-line interface definitions and parsing logic

use clap::Parser;

// CLI structure - contains all command-line arguments and options
#[derive(Parser)]
#[command(name = "logagg")]
#[command(about = "Format-directed web-access-log parser and aggregation core")]
#[command(author = "Dirk Loss <mail@dirk-loss.de>")]
#[command(version)]
pub struct Cli {
    /// Input files (stdin if not specified, or use "-" to explicitly specify stdin)
    pub files: Vec<String>,

    /// Printf-like log line format, e.g. `%h %l %u %t "%r" %s %b`
    #[arg(long = "log-format", help_heading = "Input Options")]
    pub log_format: String,

    /// Broken-down-time format used by the `%d` specifier, e.g. `%d/%b/%Y`
    #[arg(long = "date-format", help_heading = "Input Options")]
    pub date_format: String,

    /// URL-decode `%U`/`%r`/`%u` a second time
    #[arg(long = "double-decode", help_heading = "Input Options")]
    pub double_decode: bool,

    /// Strip `?...` from the request before using it as a counter key
    #[arg(long = "ignore-qstr", help_heading = "Classifier Options")]
    pub ignore_qstr: bool,

    /// Prefix the HTTP method onto the request key
    #[arg(long = "append-method", help_heading = "Classifier Options")]
    pub append_method: bool,

    /// Prefix the HTTP protocol onto the request key
    #[arg(long = "append-protocol", help_heading = "Classifier Options")]
    pub append_protocol: bool,

    /// Treat status 444 the same as 404
    #[arg(long = "code444-as-404", help_heading = "Classifier Options")]
    pub code444_as_404: bool,

    /// Count 4xx responses toward unique visitors
    #[arg(long = "client-err-to-unique-count", help_heading = "Classifier Options")]
    pub client_err_to_unique_count: bool,

    /// Drop records whose agent matches a known crawler signature
    #[arg(long = "ignore-crawlers", help_heading = "Classifier Options")]
    pub ignore_crawlers: bool,

    /// Drop records whose host falls within a configured ignore range
    #[arg(long = "ignore-ip", help_heading = "Classifier Options")]
    pub ignore_ip: Vec<String>,

    /// Drop records whose referer site is on this ignore list
    #[arg(long = "ignore-referer", help_heading = "Classifier Options")]
    pub ignore_referer: Vec<String>,

    /// Populate the per-host distinct-agent table
    #[arg(long = "list-agents", help_heading = "Classifier Options")]
    pub list_agents: bool,

    /// File extension counted as static content (repeatable)
    #[arg(long = "static-ext", help_heading = "Classifier Options")]
    pub static_ext: Vec<String>,

    /// Minimum request length to be considered for static-content detection
    #[arg(long = "static-min-len", default_value = "0", help_heading = "Classifier Options")]
    pub static_min_len: usize,

    /// Enable GeoIP city lookups (country/continent are always attempted)
    #[arg(long = "geoip-city", help_heading = "Classifier Options")]
    pub geoip_city: bool,

    /// Validate the format against the first N lines and exit, without
    /// aggregating (omit for a full run to EOF)
    #[arg(long = "test", help_heading = "Driver Options")]
    pub test: Option<usize>,
}
