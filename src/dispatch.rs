//! Uniqueness predicate and unique-visitor dispatch (§4.8), and the
//! aggregation dispatcher (§4.9).
//!
//! Grounded in `process_unique_data()` and `process_log()` in the original
//! `parser.c`.

use crate::classify::Classified;
use crate::config::Config;
use crate::counters::{Counters, RequestMeta, RequestTable, Table};
use crate::oracles::{AgentOracle, GeoOracle};

/// `visitor_key` in the original is a fixed `UKEY_BUFFER`-byte buffer;
/// modeled here as a truncation length instead of a raw byte array.
const VISITOR_KEY_MAX: usize = 2048;

/// Collapses runs of whitespace into single spaces (agent before keying,
/// §4.8's `deblank(xstrdup(glog->agent))`).
fn deblank(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visitor_key(host: &str, date_key: &str, agent: &str) -> String {
    let key = format!("{host}|{date_key}|{}", deblank(agent));
    let mut end = key.len().min(VISITOR_KEY_MAX);
    while end > 0 && !key.is_char_boundary(end) {
        end -= 1;
    }
    key[..end].to_string()
}

/// Runs the full per-record dispatch: uniqueness pass (§4.8) followed by the
/// table updates (§4.9). Assumes `classified` already carries an `Accepted`
/// outcome — excluded/invalid records never reach the dispatcher.
pub fn dispatch(
    classified: &Classified,
    cfg: &Config,
    agent_oracle: &dyn AgentOracle,
    geo_oracle: &dyn GeoOracle,
    counters: &mut dyn Counters,
) {
    let item = &classified.item;
    let host = item.host.as_deref().unwrap_or("-");
    let agent = item.agent_display();
    let date_key = classified.date_key.as_deref().unwrap_or("");

    unique_dispatch(item.status.as_deref(), host, date_key, agent, cfg, agent_oracle, geo_oracle, counters, item.type_ip);

    if cfg.classify.list_agents {
        counters.record_host_agent(host, agent);
    }

    if let Some(status) = item.status.as_deref() {
        counters.incr(Table::StatusCode, status);
    }

    let meta = RequestMeta {
        hits: 0,
        method: item.method.map(|m| m.as_str().to_string()),
        protocol: item.protocol.map(|p| p.as_str().to_string()),
        uri: item.req.clone(),
    };
    let request_table = if classified.is_404 {
        RequestTable::NotFoundRequests
    } else if classified.is_static {
        RequestTable::RequestsStatic
    } else {
        RequestTable::Requests
    };
    counters.record_request(request_table, &classified.req_key, &meta);

    let ref_display = item.ref_display();
    if !ref_display.is_empty() && ref_display != "-" {
        // Keyphrase/site extraction uses the raw referer, same as
        // `process_referrers()`; only the `ht_referrers` table itself gets
        // the URL-decoded form (§4.9).
        let decoded_ref = crate::urldecode::decode(ref_display, cfg.input.double_decode);
        if !decoded_ref.is_empty() {
            counters.incr(Table::Referrers, &decoded_ref);
        }
        if let Some(keyphrase) = crate::referer::extract_keyphrase(ref_display) {
            counters.incr(Table::Keyphrases, &keyphrase);
        }
    }
    if let Some(site) = item.site.as_deref().filter(|s| !s.is_empty()) {
        counters.incr(Table::ReferringSites, site);
    }

    counters.incr(Table::Hosts, host);
    counters.add(Table::DateBw, date_key, item.resp_size);
    counters.add(Table::FileBw, &classified.req_key, item.resp_size);
    counters.add(Table::HostBw, host, item.resp_size);
    counters.add(Table::FileServeUsecs, &classified.req_key, item.serve_time);
    counters.add(Table::HostServeUsecs, host, item.serve_time);

    // `process_log()` is the only place the original adds to
    // `general_stats["bandwidth"]`; `total_requests`/`failed_requests` track
    // `count_process`/`count_invalid` instead and are bumped by the driver
    // for every attempted line, not just ones that reach the dispatcher.
    counters.general_stats_mut().bandwidth += item.resp_size;
}

#[allow(clippy::too_many_arguments)]
fn unique_dispatch(
    status: Option<&str>,
    host: &str,
    date_key: &str,
    agent: &str,
    cfg: &Config,
    agent_oracle: &dyn AgentOracle,
    geo_oracle: &dyn GeoOracle,
    counters: &mut dyn Counters,
    type_ip: Option<crate::item::IpKind>,
) {
    // `unique_data()`: 4xx responses are excluded from the uniqueness count
    // unless client_err_to_unique_count overrides it.
    let is_client_err = status.map(|s| s.starts_with('4')).unwrap_or(false);
    if is_client_err && !cfg.classify.client_err_to_unique_count {
        return;
    }

    let key = visitor_key(host, date_key, agent);
    if !counters.insert_unique(Table::UniqueVisitors, &key) {
        return;
    }

    counters.incr(Table::UniqueVisByDate, date_key);

    if let Some((name, family)) = agent_oracle.verify_browser(agent) {
        counters.record_browser(&name, &family);
    }
    if let Some((name, family)) = agent_oracle.verify_os(agent) {
        counters.record_os(&name, &family);
    }

    if cfg.classify.geoip_database {
        if let Some(kind) = type_ip {
            if let Some(country) = geo_oracle.country(host, kind) {
                let continent = geo_oracle.continent(host, kind);
                counters.record_country(&country, continent.as_deref());
            }
        }
    }
}
