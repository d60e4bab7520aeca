//! Error handling (§7), grounded in `kelora::error_handling`'s
//! `ErrorSeverity`/`ErrorInfo` split between "why" and "what".
//!
//! Per-line outcomes never propagate as `Result::Err` — they manifest only
//! through driver counters (§7). Fatal conditions use `anyhow::Result`.

use std::fmt;

/// Why a line was rejected (`LineInvalid`) or dropped (`LineExcluded`).
/// Tracked for diagnostics; never itself an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyOrComment,
    RepeatedSpecifier(char),
    WhitespaceAfterPercent,
    DateDidNotFullyConsumeToken,
    InvalidHost,
    InvalidMethod,
    InvalidProtocol,
    EmptyUri,
    RequestMissingProtocolSuffix,
    InvalidStatus,
    MissingRequiredField,
    FormatExhaustedBeforeInput,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyOrComment => write!(f, "empty or comment line"),
            RejectReason::RepeatedSpecifier(c) => write!(f, "specifier %{c} fired twice"),
            RejectReason::WhitespaceAfterPercent => write!(f, "whitespace byte after %"),
            RejectReason::DateDidNotFullyConsumeToken => {
                write!(f, "date format did not consume entire token")
            }
            RejectReason::InvalidHost => write!(f, "host failed IP validation"),
            RejectReason::InvalidMethod => write!(f, "unrecognized HTTP method"),
            RejectReason::InvalidProtocol => write!(f, "unrecognized HTTP protocol"),
            RejectReason::EmptyUri => write!(f, "empty URI"),
            RejectReason::RequestMissingProtocolSuffix => {
                write!(f, "request line missing protocol suffix")
            }
            RejectReason::InvalidStatus => write!(f, "status code not a valid integer"),
            RejectReason::MissingRequiredField => write!(f, "host, date or req missing"),
            RejectReason::FormatExhaustedBeforeInput => {
                write!(f, "format specifier expected data but input was exhausted")
            }
        }
    }
}

/// Why a structurally valid line was dropped before aggregation (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeReason {
    Ip,
    Crawler,
    Referer,
}

/// Outcome of running one line through the full pipeline (§4.10, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Accepted,
    Invalid(RejectReason),
    Excluded(ExcludeReason),
}

/// Fatal conditions (§7): these abort the driver via `anyhow::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FatalError {
    MissingLogFormat,
    MissingDateFormat,
    InputOpenFailure(String),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::MissingLogFormat => write!(f, "no log_format was configured"),
            FatalError::MissingDateFormat => write!(f, "no date_format was configured"),
            FatalError::InputOpenFailure(path) => write!(f, "unable to open input: {path}"),
        }
    }
}

impl std::error::Error for FatalError {}
