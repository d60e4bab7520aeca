//! Field parsers: one per format specifier (§4.3).
//!
//! Each consumes the next token off the line cursor and either sets the
//! matching `LogItem` field or rejects the line. Grounded in
//! `parse_specifier()` in the original `parser.c`; the per-specifier match
//! arms below mirror its `switch (*p)` cases one for one, including the
//! asymmetry flagged in spec.md §9 between `%U` (rejects on empty-after-
//! decode) and `%r`/`parse_req` (keeps the undecoded request if decoding
//! yields empty) — preserved verbatim, not unified.

use crate::config::Config;
use crate::error::RejectReason;
use crate::item::{IpKind, LogItem, Method, Protocol};
use crate::oracles::IpOracle;
use crate::tokenizer::Cursor;
use crate::urldecode::decode;
use chrono::NaiveDateTime;

type FieldResult = Result<(), RejectReason>;

fn count_spaces(s: &str) -> usize {
    s.chars().filter(|c| *c == ' ').count()
}

/// `%d` — date. Tokenized with `count = spaces-in-date-format + 1` so dates
/// with embedded spaces (`%b %e %H:%M:%S`) are captured as one token even
/// though the surrounding log separator is also a space (§4.1 rationale).
/// The date format must consume the *entire* token; trailing bytes reject.
pub fn parse_date(item: &mut LogItem, cursor: &mut Cursor, delim: char, cfg: &Config) -> FieldResult {
    if item.date.is_some() {
        return Err(RejectReason::RepeatedSpecifier('d'));
    }
    let count = count_spaces(&cfg.input.date_format) + 1;
    let tkn = cursor
        .next_token(delim, count)
        .ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    if tkn.is_empty() {
        return Err(RejectReason::FormatExhaustedBeforeInput);
    }
    // chrono's %e (space-padded day) requires the exact original width;
    // strptime-style parsing is approximated with NaiveDateTime/NaiveDate.
    parse_strptime_like(tkn, &cfg.input.date_format)
        .ok_or(RejectReason::DateDidNotFullyConsumeToken)?;
    item.date = Some(tkn.to_string());
    Ok(())
}

/// Parses `tkn` fully against `fmt`, requiring the entire token to be
/// consumed (mirrors `strptime` returning a pointer at `'\0'`).
fn parse_strptime_like(tkn: &str, fmt: &str) -> Option<()> {
    // chrono needs a full datetime; pad missing time-of-day components so
    // date-only formats (the common case, e.g. "%d/%b/%Y") still parse.
    let needs_time = !fmt.contains("%H") && !fmt.contains("%T");
    if needs_time {
        let padded_fmt = format!("{fmt} %H:%M:%S");
        let padded_tkn = format!("{tkn} 00:00:00");
        NaiveDateTime::parse_from_str(&padded_tkn, &padded_fmt).ok()?;
    } else {
        NaiveDateTime::parse_from_str(tkn, fmt).ok()?;
    }
    Some(())
}

/// Renders the already-matched date as `YYYYMMDD` (§4.7 date_key, §8
/// round-trip property: always exactly 8 ASCII digits).
pub fn render_date_key(date_token: &str, date_format: &str) -> Option<String> {
    let needs_time = !date_format.contains("%H") && !date_format.contains("%T");
    let dt = if needs_time {
        let padded_fmt = format!("{date_format} %H:%M:%S");
        let padded_tkn = format!("{date_token} 00:00:00");
        NaiveDateTime::parse_from_str(&padded_tkn, &padded_fmt).ok()?
    } else {
        NaiveDateTime::parse_from_str(date_token, date_format).ok()?
    };
    Some(dt.format("%Y%m%d").to_string())
}

/// `%h` — remote host. Must pass IPv4/IPv6 validation (§4.3).
pub fn parse_host(
    item: &mut LogItem,
    cursor: &mut Cursor,
    delim: char,
    ip_oracle: &dyn IpOracle,
) -> FieldResult {
    if item.host.is_some() {
        return Err(RejectReason::RepeatedSpecifier('h'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    let kind = ip_oracle.validate(tkn).ok_or(RejectReason::InvalidHost)?;
    item.host = Some(tkn.to_string());
    item.type_ip = Some(kind);
    Ok(())
}

/// `%m` — request method, matched case-insensitively against the known
/// method table, stored uppercased (§4.3, §11).
pub fn parse_method(item: &mut LogItem, cursor: &mut Cursor, delim: char) -> FieldResult {
    if item.method.is_some() {
        return Err(RejectReason::RepeatedSpecifier('m'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    let method = Method::exact(tkn).ok_or(RejectReason::InvalidMethod)?;
    item.method = Some(method);
    Ok(())
}

/// `%U` — URI path only (no method/protocol). URL-decoded; empty rejects.
pub fn parse_uri(item: &mut LogItem, cursor: &mut Cursor, delim: char, cfg: &Config) -> FieldResult {
    if item.req.is_some() {
        return Err(RejectReason::RepeatedSpecifier('U'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    if tkn.is_empty() {
        return Err(RejectReason::EmptyUri);
    }
    let decoded = decode(tkn, cfg.input.double_decode);
    // Asymmetric with parse_req (§9 Open Question): %U rejects outright
    // when decoding collapses the token to empty, it does not fall back.
    if decoded.is_empty() {
        return Err(RejectReason::EmptyUri);
    }
    item.req = Some(decoded);
    Ok(())
}

/// `%H` — protocol, exact match against `HTTP/1.0`/`HTTP/1.1` (§4.3).
pub fn parse_protocol(item: &mut LogItem, cursor: &mut Cursor, delim: char) -> FieldResult {
    if item.protocol.is_some() {
        return Err(RejectReason::RepeatedSpecifier('H'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    let proto = Protocol::parse(tkn).ok_or(RejectReason::InvalidProtocol)?;
    item.protocol = Some(proto);
    Ok(())
}

/// `%r` — combined `METHOD URI PROTOCOL` request line (§4.3). Mirrors
/// `parse_req()`: if no method is recognized, the *whole* token becomes the
/// (decoded) request; if a method was recognized but no protocol suffix is
/// found, the line rejects with URI `-`.
pub fn parse_request_line(
    item: &mut LogItem,
    cursor: &mut Cursor,
    delim: char,
    cfg: &Config,
) -> FieldResult {
    if item.req.is_some() {
        return Err(RejectReason::RepeatedSpecifier('r'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;

    let Some(method) = Method::match_prefix(tkn) else {
        // No method recognized: the whole token is the request, decoded if
        // possible, else kept raw (parse_req's `dreq != '\0'` fallback).
        let decoded = decode(tkn, cfg.input.double_decode);
        item.req = Some(if decoded.is_empty() { tkn.to_string() } else { decoded });
        return Ok(());
    };

    let after_method = &tkn[method.as_str().len()..];
    let Some((rel_idx, proto)) = Protocol::find_suffix(after_method) else {
        // Method recognized but no protocol suffix: reject with URI "-".
        item.req = Some("-".to_string());
        return Err(RejectReason::RequestMissingProtocolSuffix);
    };

    // rel_idx is the offset of the suffix's leading space; rel_idx <= 1
    // means there's no byte of URI between the method and the protocol
    // (e.g. "GET HTTP/1.1" with nothing but one space).
    let uri = if rel_idx <= 1 { "" } else { &after_method[1..rel_idx] };
    if uri.is_empty() {
        item.req = Some("-".to_string());
        return Err(RejectReason::RequestMissingProtocolSuffix);
    }

    let decoded = decode(uri, cfg.input.double_decode);
    item.req = Some(if decoded.is_empty() { uri.to_string() } else { decoded });

    if cfg.classify.append_method {
        item.method = Some(method);
    }
    if cfg.classify.append_protocol {
        item.protocol = Some(proto);
    }
    Ok(())
}

/// `%s` — status code, strict base-10 integer in a plausible HTTP range.
pub fn parse_status(item: &mut LogItem, cursor: &mut Cursor, delim: char) -> FieldResult {
    if item.status.is_some() {
        return Err(RejectReason::RepeatedSpecifier('s'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    let code: i64 = tkn.parse().map_err(|_| RejectReason::InvalidStatus)?;
    if !(100..=999).contains(&code) {
        return Err(RejectReason::InvalidStatus);
    }
    item.status = Some(tkn.to_string());
    Ok(())
}

/// `%b` — response size in bytes. Unparseable values store 0 rather than
/// rejecting the line (§4.3, §7).
pub fn parse_bytes(item: &mut LogItem, cursor: &mut Cursor, delim: char, cfg: &mut Config) -> FieldResult {
    if item.resp_size != 0 {
        return Err(RejectReason::RepeatedSpecifier('b'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    item.resp_size = tkn.parse::<u64>().unwrap_or(0);
    cfg.bandwidth_seen = true;
    Ok(())
}

/// `%R` — referer. Missing/empty becomes the literal `-`; otherwise the
/// site host is extracted into `site` (§4.3, §4.4).
pub fn parse_referer(item: &mut LogItem, cursor: &mut Cursor, delim: char) -> FieldResult {
    if item.ref_.is_some() {
        return Err(RejectReason::RepeatedSpecifier('R'));
    }
    let tkn = cursor.next_token(delim, 1).unwrap_or("");
    if tkn.is_empty() {
        item.ref_ = Some("-".to_string());
        return Ok(());
    }
    item.site = crate::referer::site_of(tkn);
    item.ref_ = Some(tkn.to_string());
    Ok(())
}

/// `%u` — user agent. URL-decoded, `+` replaced with space; empty becomes
/// `-` (§4.3).
pub fn parse_agent(item: &mut LogItem, cursor: &mut Cursor, delim: char, cfg: &Config) -> FieldResult {
    if item.agent.is_some() {
        return Err(RejectReason::RepeatedSpecifier('u'));
    }
    let tkn = cursor.next_token(delim, 1).unwrap_or("");
    if tkn.is_empty() {
        item.agent = Some("-".to_string());
        return Ok(());
    }
    let decoded = decode(tkn, cfg.input.double_decode).replace('+', " ");
    item.agent = Some(if decoded.is_empty() { "-".to_string() } else { decoded });
    Ok(())
}

/// `%T` — service time in seconds, skipped entirely when the format also
/// contains `%D` (§4.3: precedence preserved, Design Notes §9).
pub fn parse_serve_seconds(
    item: &mut LogItem,
    cursor: &mut Cursor,
    delim: char,
    lfmt: &str,
    cfg: &mut Config,
) -> FieldResult {
    if lfmt.contains("%D") {
        // still consume the token so the cursor stays in sync with lfmt.
        let _ = cursor.next_token(delim, 1);
        return Ok(());
    }
    if item.serve_time != 0 {
        return Err(RejectReason::RepeatedSpecifier('T'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    let secs: f64 = if tkn.contains('.') {
        tkn.parse().unwrap_or(0.0)
    } else {
        tkn.parse::<u64>().unwrap_or(0) as f64
    };
    item.serve_time = if secs > 0.0 { (secs * 1_000_000.0) as u64 } else { 0 };
    cfg.serve_usecs_seen = true;
    Ok(())
}

/// `%D` — service time in microseconds, base-10 unsigned (§4.3).
pub fn parse_serve_micros(
    item: &mut LogItem,
    cursor: &mut Cursor,
    delim: char,
    cfg: &mut Config,
) -> FieldResult {
    if item.serve_time != 0 {
        return Err(RejectReason::RepeatedSpecifier('D'));
    }
    let tkn = cursor.next_token(delim, 1).ok_or(RejectReason::FormatExhaustedBeforeInput)?;
    item.serve_time = tkn.parse::<u64>().unwrap_or(0);
    cfg.serve_usecs_seen = true;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracles::StdIpOracle;

    fn cfg() -> Config {
        Config::new("%h %d %r", "%d/%b/%Y")
    }

    #[test]
    fn parse_host_accepts_valid_ip() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("127.0.0.1 rest");
        let oracle = StdIpOracle::new();
        assert!(parse_host(&mut item, &mut cur, ' ', &oracle).is_ok());
        assert_eq!(item.host.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn parse_host_rejects_invalid_ip() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("not-an-ip rest");
        let oracle = StdIpOracle::new();
        assert_eq!(
            parse_host(&mut item, &mut cur, ' ', &oracle),
            Err(RejectReason::InvalidHost)
        );
    }

    #[test]
    fn parse_bytes_defaults_to_zero_on_parse_failure() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("not-a-number rest");
        let mut c = cfg();
        assert!(parse_bytes(&mut item, &mut cur, ' ', &mut c).is_ok());
        assert_eq!(item.resp_size, 0);
        assert!(c.bandwidth_seen);
    }

    #[test]
    fn parse_bytes_rejects_repeated_specifier() {
        let mut item = LogItem::new();
        let mut first = Cursor::new("1024 rest");
        let mut c = cfg();
        assert!(parse_bytes(&mut item, &mut first, ' ', &mut c).is_ok());
        let mut second = Cursor::new("512 rest");
        assert_eq!(
            parse_bytes(&mut item, &mut second, ' ', &mut c),
            Err(RejectReason::RepeatedSpecifier('b'))
        );
    }

    #[test]
    fn parse_status_rejects_out_of_range() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("9999 rest");
        assert_eq!(
            parse_status(&mut item, &mut cur, ' '),
            Err(RejectReason::InvalidStatus)
        );
    }

    #[test]
    fn parse_request_line_extracts_method_uri_protocol() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new(r#""GET /index.html HTTP/1.1" 200"#);
        // simulate the quoted-token extraction a real %r specifier performs
        let tkn = cur.next_token('"', 2).unwrap();
        let mut sub_cur = Cursor::new(tkn);
        let mut c = cfg();
        assert!(parse_request_line(&mut item, &mut sub_cur, '\u{0}', &mut c).is_ok());
        assert_eq!(item.req.as_deref(), Some("/index.html"));
    }

    #[test]
    fn parse_request_line_no_method_keeps_whole_token() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("justaplainstring");
        let c = cfg();
        assert!(parse_request_line(&mut item, &mut cur, ' ', &c).is_ok());
        assert_eq!(item.req.as_deref(), Some("justaplainstring"));
    }

    #[test]
    fn parse_request_line_method_without_protocol_rejects() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("GET /no-protocol-here");
        let c = cfg();
        assert_eq!(
            parse_request_line(&mut item, &mut cur, '\u{0}', &c),
            Err(RejectReason::RequestMissingProtocolSuffix)
        );
        assert_eq!(item.req.as_deref(), Some("-"));
    }

    #[test]
    fn parse_serve_seconds_ignored_when_format_has_micros() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("1.5 rest");
        let mut c = cfg();
        assert!(parse_serve_seconds(&mut item, &mut cur, ' ', "%h %T %D", &mut c).is_ok());
        assert_eq!(item.serve_time, 0);
    }

    #[test]
    fn parse_serve_seconds_converts_to_micros() {
        let mut item = LogItem::new();
        let mut cur = Cursor::new("1.5");
        let mut c = cfg();
        assert!(parse_serve_seconds(&mut item, &mut cur, ' ', "%h %T", &mut c).is_ok());
        assert_eq!(item.serve_time, 1_500_000);
    }

    #[test]
    fn date_key_renders_eight_digits() {
        let key = render_date_key("10/Apr/2014", "%d/%b/%Y").unwrap();
        assert_eq!(key, "20140410");
        assert_eq!(key.len(), 8);
        assert!(key.chars().all(|c| c.is_ascii_digit()));
    }
}
