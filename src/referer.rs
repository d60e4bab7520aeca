//! Referer-site extraction (§4.4) and Google keyphrase extraction (§4.5).
//!
//! Grounded in `extract_referer_site()` and `process_keyphrases()` in the
//! original `parser.c`.

use crate::item::REF_SITE_LEN;
use crate::urldecode::decode;

/// Locates `"//"`; the host is from the two bytes after it up to the next
/// `/` or end of string, truncated to `REF_SITE_LEN - 1` bytes. Absent
/// `"//"` yields `None` (§4.4).
pub fn site_of(referer: &str) -> Option<String> {
    let begin = referer.find("//")? + 2;
    let rest = &referer[begin..];
    if rest.is_empty() {
        return None;
    }
    let len = rest.find('/').unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    let truncated_len = len.min(REF_SITE_LEN - 1);
    // keep it on a char boundary without pulling in extra deps.
    let mut end = truncated_len;
    while end > 0 && !rest.is_char_boundary(end) {
        end -= 1;
    }
    Some(rest[..end].to_string())
}

const GOOGLE_HOSTS: [&str; 3] = [
    "http://www.google.",
    "http://webcache.googleusercontent.com/",
    "http://translate.googleusercontent.com/",
];

/// Extracts a Google search/cache/translate keyphrase from the *raw,
/// not-yet-decoded* referer (§4.5). Returns `None` when the referer isn't a
/// recognized Google host, or when an anchor matched but yielded nothing to
/// record (e.g. the `"/+&"` no-keyphrase case).
pub fn extract_keyphrase(raw_referer: &str) -> Option<String> {
    if !GOOGLE_HOSTS.iter().any(|h| raw_referer.contains(h)) {
        return None;
    }

    // Priority order exactly as process_keyphrases() in the original.
    if raw_referer.contains("/+&") {
        return None;
    }

    let (start, encoded) = if let Some(idx) = raw_referer.find("/+") {
        (idx + 2, false)
    } else if let Some(idx) = raw_referer.find("q=cache:") {
        let after = &raw_referer[idx..];
        let plus = after.find('+')?;
        (idx + plus + 1, false)
    } else if let Some(idx) = raw_referer.find("&q=").or_else(|| raw_referer.find("?q=")) {
        (idx + 3, false)
    } else if let Some(idx) = raw_referer.find("%26q%3D").or_else(|| raw_referer.find("%3Fq%3D")) {
        (idx + 7, true)
    } else {
        return None;
    };

    if start > raw_referer.len() {
        return None;
    }
    let tail = &raw_referer[start..];
    let end = if encoded {
        tail.find("%26").unwrap_or(tail.len())
    } else {
        tail.find('&').unwrap_or(tail.len())
    };
    let raw_keyphrase = &tail[..end];

    let decoded = decode(raw_keyphrase, false).replace('+', " ");
    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
