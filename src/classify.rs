//! Record classifier (§4.7): turns a structurally valid `LogItem` into a
//! decision of accept/exclude plus the derived `req_key`/`date_key`/`is404`
//! facts the dispatcher needs.
//!
//! Grounded in `process_log()`, `exclude_ip()`, `exclude_crawler()`, and
//! `ignore_referer` (configured site list) in the original `parser.c`.

use crate::config::Config;
use crate::error::{ExcludeReason, LineOutcome};
use crate::item::LogItem;
use crate::oracles::{AgentOracle, IpOracle};

/// A classified record, ready for the dispatcher (§4.9). `req_key`/`date_key`
/// are computed once here rather than re-derived at every counter update.
#[derive(Debug, Clone)]
pub struct Classified {
    pub item: LogItem,
    pub is_404: bool,
    pub is_static: bool,
    pub req_key: String,
    pub date_key: Option<String>,
}

/// Classifies `item` in place, applying exclusion checks and computing the
/// derived keys. Returns the outcome the driver tallies (§4.7, §7).
///
/// `item.date_key` must already be set by the caller (`fields::render_date_key`
/// is applied to `item.date` once `process_date` succeeds, mirroring
/// `process_date()` running only outside test mode).
pub fn classify(
    mut item: LogItem,
    cfg: &Config,
    ip_oracle: &dyn IpOracle,
    agent_oracle: &dyn AgentOracle,
) -> (Classified, LineOutcome) {
    if cfg.classify.ignore_ip_idx && ip_oracle.in_ignore_range(item.host.as_deref().unwrap_or("")) {
        return classified_excluded(item, ExcludeReason::Ip);
    }

    let agent = item.agent.as_deref().unwrap_or("-");
    if cfg.classify.ignore_crawlers && agent_oracle.is_crawler(agent) {
        return classified_excluded(item, ExcludeReason::Crawler);
    }

    if let Some(site) = item.site.as_deref() {
        if cfg.classify.ignore_referers.iter().any(|r| r == site) {
            return classified_excluded(item, ExcludeReason::Referer);
        }
    }

    let is_404 = item.is_404(cfg.classify.code444_as_404);

    // Strip the query string unless it's a 404 (is404 takes priority, §4.7:
    // the original checks is404 / code444 / ignore_qstr as one if/else-if
    // chain, so a 404 response never has its query string stripped).
    let req = item.req.clone().unwrap_or_default();
    let req_for_key = if !is_404 && cfg.classify.ignore_qstr {
        strip_query_string(&req)
    } else {
        req.clone()
    };

    // The original truncates `glog->req` itself at the query string before
    // `verify_static_content` ever sees it, so static detection runs against
    // the already-stripped value, not the raw request (§4.7).
    let is_static = !is_404 && cfg.static_files.is_static(&req_for_key);

    let mut req_key = req_for_key;
    if cfg.classify.append_method || cfg.classify.append_protocol {
        if cfg.classify.append_method {
            if let Some(m) = item.method {
                req_key = format!("{} {}", m.as_str(), req_key);
            }
        }
        if cfg.classify.append_protocol {
            if let Some(p) = item.protocol {
                req_key = format!("{} {}", p.as_str(), req_key);
            }
        }
        req_key = deblank(&req_key);
    }

    let date_key = item.date.as_deref().and_then(|d| crate::fields::render_date_key(d, &cfg.input.date_format));
    item.date_key = date_key.clone();

    let classified = Classified { item, is_404, is_static, req_key, date_key };
    (classified, LineOutcome::Accepted)
}

fn classified_excluded(item: LogItem, reason: ExcludeReason) -> (Classified, LineOutcome) {
    let classified = Classified {
        item,
        is_404: false,
        is_static: false,
        req_key: String::new(),
        date_key: None,
    };
    (classified, LineOutcome::Excluded(reason))
}

/// Strips everything from the first `?` onward, unless the `?` is the first
/// byte of the request (§4.7: `(qmark - glog->req) > 0` guards against
/// truncating a request that's nothing but a query string).
fn strip_query_string(req: &str) -> String {
    match req.find('?') {
        Some(0) | None => req.to_string(),
        Some(idx) => req[..idx].to_string(),
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends,
/// mirroring `deblank()` applied after method/protocol are prefixed onto
/// `req_key` (§4.7).
fn deblank(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
