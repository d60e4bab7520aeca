//! Line parser (§4.6): walks the format string, invoking the matching field
//! parser against the remaining input for each `%X` specifier.
//!
//! Grounded in `parse_format()` in the original `parser.c`. Non-`%` bytes in
//! the format string advance neither a literal-matching check nor the field
//! parsers directly — they are the delimiter the *next* field parser tokenizes
//! up to, exactly as `parse_string()` takes its `end` byte from `p[1]`
//! (the byte immediately following the specifier letter). Literal bytes are
//! expected but **not verified** against the input (Design Notes §9) — this
//! is a known looseness of the design, preserved here.

use crate::config::Config;
use crate::error::RejectReason;
use crate::fields;
use crate::item::LogItem;
use crate::oracles::IpOracle;
use crate::tokenizer::Cursor;

/// Parses `line` against `cfg.input.log_format`, filling in a fresh
/// `LogItem`. An empty line rejects; any field parser returning a rejection
/// rejects the whole line (§4.6).
pub fn parse_line(line: &str, cfg: &mut Config, ip_oracle: &dyn IpOracle) -> Result<LogItem, RejectReason> {
    if line.is_empty() {
        return Err(RejectReason::EmptyOrComment);
    }

    let mut item = LogItem::new();
    let mut cursor = Cursor::new(line);
    let lfmt = cfg.input.log_format.clone();
    let fmt_bytes: Vec<char> = lfmt.chars().collect();

    let mut i = 0;
    while i < fmt_bytes.len() {
        let c = fmt_bytes[i];
        if c != '%' {
            // Literal format byte: advance the input cursor by exactly one
            // byte, unverified (§9) — this is also how the delimiter byte a
            // field parser stopped at (but didn't consume) gets consumed.
            cursor.advance_literal();
            i += 1;
            continue;
        }
        // `%` found: the next format byte selects the parser, and the byte
        // after *that* is the delimiter the field parser tokenizes up to.
        i += 1;
        if i >= fmt_bytes.len() {
            break;
        }
        let specifier = fmt_bytes[i];
        if specifier.is_whitespace() {
            return Err(RejectReason::WhitespaceAfterPercent);
        }
        let delim = fmt_bytes.get(i + 1).copied().unwrap_or('\u{0}');

        if cursor.is_empty() {
            // Matches `parse_format`'s early `return 0` (success so far,
            // nothing left to read) only when nothing has been read yet for
            // this specifier; an exhausted cursor before a mandatory field
            // is instead a per-specifier rejection below.
            break;
        }

        match specifier {
            'd' => fields::parse_date(&mut item, &mut cursor, delim, cfg).map_err(Some),
            'h' => fields::parse_host(&mut item, &mut cursor, delim, ip_oracle).map_err(Some),
            'm' => fields::parse_method(&mut item, &mut cursor, delim).map_err(Some),
            'U' => fields::parse_uri(&mut item, &mut cursor, delim, cfg).map_err(Some),
            'H' => fields::parse_protocol(&mut item, &mut cursor, delim).map_err(Some),
            'r' => fields::parse_request_line(&mut item, &mut cursor, delim, cfg).map_err(Some),
            's' => fields::parse_status(&mut item, &mut cursor, delim).map_err(Some),
            'b' => fields::parse_bytes(&mut item, &mut cursor, delim, cfg).map_err(Some),
            'R' => fields::parse_referer(&mut item, &mut cursor, delim).map_err(Some),
            'u' => fields::parse_agent(&mut item, &mut cursor, delim, cfg).map_err(Some),
            'T' => fields::parse_serve_seconds(&mut item, &mut cursor, delim, &lfmt, cfg).map_err(Some),
            'D' => fields::parse_serve_micros(&mut item, &mut cursor, delim, cfg).map_err(Some),
            _ => {
                // pass-through: skip field up to the delimiter byte (§4.3).
                cursor.skip_to(delim);
                Ok(())
            }
        }
        .map_err(|reason: Option<RejectReason>| reason.unwrap())?;

        i += 1;
    }

    Ok(item)
}
