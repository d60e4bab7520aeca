//! `LogItem`: the parsed record for one line (§3).
//!
//! Fields are each semantically optional — absence is meaningful, modeled
//! with `Option<String>` rather than the original's `"-"`-as-sentinel
//! allocations (Design Notes §9: `"-"` is a display choice, not a data-model
//! one; it is applied only when rendering `ref`/`agent`, in `dispatch.rs`).

/// IP address family of a validated `host` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpKind {
    V4,
    V6,
}

/// The HTTP methods recognized by `%m`/`%r` (§4.3), case-insensitively on
/// input but always normalized to uppercase once stored (§3, §11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Options,
    Get,
    Head,
    Post,
    Put,
    Delete,
    Trace,
    Connect,
    Patch,
}

impl Method {
    pub const ALL: [Method; 9] = [
        Method::Options,
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Trace,
        Method::Connect,
        Method::Patch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Patch => "PATCH",
        }
    }

    /// Matches `extract_method()` in the original: an exact-length,
    /// case-insensitive prefix match against the known method table,
    /// tried in the original's declared order (§11 — upper before lower).
    pub fn match_prefix(token: &str) -> Option<Method> {
        Method::ALL
            .into_iter()
            .find(|m| token.len() >= m.as_str().len() && token[..m.as_str().len()].eq_ignore_ascii_case(m.as_str()))
    }

    /// Exact case-insensitive match of the *whole* token, used by the `%m`
    /// specifier ("exact length match per method", §4.3).
    pub fn exact(token: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| token.eq_ignore_ascii_case(m.as_str()))
    }
}

/// `HTTP/1.0` or `HTTP/1.1` (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http10,
    Http11,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http10 => "HTTP/1.0",
            Protocol::Http11 => "HTTP/1.1",
        }
    }

    pub fn parse(token: &str) -> Option<Protocol> {
        if token.eq_ignore_ascii_case("HTTP/1.0") {
            Some(Protocol::Http10)
        } else if token.eq_ignore_ascii_case("HTTP/1.1") {
            Some(Protocol::Http11)
        } else {
            None
        }
    }

    /// Finds `" HTTP/1.0"` or `" HTTP/1.1"` as a suffix anchor within a
    /// combined request line, as `parse_req()` does via `strstr`. Returns
    /// the byte offset of the leading space and which protocol matched.
    pub fn find_suffix(s: &str) -> Option<(usize, Protocol)> {
        if let Some(idx) = s.find(" HTTP/1.0") {
            return Some((idx, Protocol::Http10));
        }
        if let Some(idx) = s.find(" HTTP/1.1") {
            return Some((idx, Protocol::Http11));
        }
        None
    }
}

pub const REF_SITE_LEN: usize = 256;

/// The parsed record for one log line (§3). Created per line, mutated only
/// by field parsers for that line, consulted by the classifier/dispatcher,
/// then dropped.
#[derive(Debug, Clone, Default)]
pub struct LogItem {
    pub host: Option<String>,
    pub type_ip: Option<IpKind>,
    pub date: Option<String>,
    pub date_key: Option<String>,
    pub method: Option<Method>,
    pub protocol: Option<Protocol>,
    pub req: Option<String>,
    pub req_key: Option<String>,
    pub status: Option<String>,
    pub resp_size: u64,
    pub serve_time: u64,
    pub ref_: Option<String>,
    pub site: Option<String>,
    pub agent: Option<String>,
}

impl LogItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A LogItem is valid iff `host`, `date`, and `req` are present (§3).
    pub fn is_valid(&self) -> bool {
        self.host.is_some() && self.date.is_some() && self.req.is_some()
    }

    /// `status == "404"`, or `"444"` when treated as 404 (§4.7).
    pub fn is_404(&self, code444_as_404: bool) -> bool {
        match self.status.as_deref() {
            Some("404") => true,
            Some("444") => code444_as_404,
            _ => false,
        }
    }

    /// Rendered `ref` for display/aggregation: `-` when absent (§3).
    pub fn ref_display(&self) -> &str {
        self.ref_.as_deref().unwrap_or("-")
    }

    /// Rendered `agent` for display/aggregation: `-` when absent (§3).
    pub fn agent_display(&self) -> &str {
        self.agent.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_requires_host_date_req() {
        let mut item = LogItem::new();
        assert!(!item.is_valid());
        item.host = Some("127.0.0.1".into());
        item.date = Some("10/Apr/2014".into());
        assert!(!item.is_valid());
        item.req = Some("/index.html".into());
        assert!(item.is_valid());
    }

    #[test]
    fn method_exact_is_case_insensitive_exact_length() {
        assert_eq!(Method::exact("get"), Some(Method::Get));
        assert_eq!(Method::exact("GET"), Some(Method::Get));
        assert_eq!(Method::exact("GETX"), None);
    }

    #[test]
    fn method_match_prefix_finds_leading_method() {
        assert_eq!(Method::match_prefix("GET /x HTTP/1.1"), Some(Method::Get));
        assert_eq!(Method::match_prefix("bogus"), None);
    }

    #[test]
    fn protocol_find_suffix() {
        assert_eq!(
            Protocol::find_suffix("GET /x HTTP/1.1"),
            Some((6, Protocol::Http11))
        );
        assert_eq!(Protocol::find_suffix("GET /x"), None);
    }

    #[test]
    fn is_404_respects_code444_flag() {
        let mut item = LogItem::new();
        item.status = Some("444".into());
        assert!(!item.is_404(false));
        assert!(item.is_404(true));
    }
}
