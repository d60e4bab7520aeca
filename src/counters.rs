//! Aggregation tables and the `Counters` collaborator interface (§6, §4.9).
//!
//! `kelora::event::Event` keeps its fields in an `IndexMap` for deterministic
//! iteration order; the same reasoning applies here — a renderer walking
//! these tables should see entries in first-seen order, not hash order.
//!
//! §6 names the counter interface as three generic operations (`incr`,
//! `add`, `insert_unique`); the dispatcher also needs to carry typed
//! metadata (browser family, request method/protocol) that a bare
//! `(table, key)` pair can't express, so a handful of narrower methods sit
//! alongside the generic three rather than overloading them.

use indexmap::{IndexMap, IndexSet};

/// The named tables a generic `incr`/`add`/`insert_unique` call may target
/// (§4.9). Tables with richer per-entry data (`requests*`, `browsers`, `os`,
/// `countries`, `host_agents`) are reached through their own methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    StatusCode,
    Hosts,
    Referrers,
    ReferringSites,
    Keyphrases,
    DateBw,
    FileBw,
    HostBw,
    FileServeUsecs,
    HostServeUsecs,
    UniqueVisByDate,
    UniqueVisitors,
}

/// Per-request metadata retained alongside a hit count (§4.9: "track request
/// metadata (method, protocol, original URI)").
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub hits: u64,
    pub method: Option<String>,
    pub protocol: Option<String>,
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AgentMeta {
    pub hits: u64,
    pub family: String,
}

#[derive(Debug, Clone, Default)]
pub struct CountryMeta {
    pub hits: u64,
    pub continent: Option<String>,
}

/// Running totals independent of any single table, mirroring the `#ifdef
/// TCB_BTREE` `ht_general_stats` bookkeeping in the original (§11):
/// `failed_requests`, `total_requests`, cumulative `bandwidth`, and
/// `exclude_ip` hits.
#[derive(Debug, Clone, Default)]
pub struct GeneralStats {
    pub failed_requests: u64,
    pub total_requests: u64,
    pub bandwidth: u64,
    pub exclude_ip: u64,
}

/// The counter collaborator the dispatcher writes through (§6).
pub trait Counters {
    fn incr(&mut self, table: Table, key: &str);
    fn add(&mut self, table: Table, key: &str, value: u64);
    /// Inserts `key` into a unique-membership table; `true` iff it was not
    /// already present (§4.8).
    fn insert_unique(&mut self, table: Table, key: &str) -> bool;

    fn record_request(&mut self, table: RequestTable, key: &str, meta: &RequestMeta);
    fn record_browser(&mut self, name: &str, family: &str);
    fn record_os(&mut self, name: &str, family: &str);
    fn record_country(&mut self, country: &str, continent: Option<&str>);
    /// Appends `agent` to the set of agents seen for `host`, only when
    /// `list_agents` is configured (§4.9, §6).
    fn record_host_agent(&mut self, host: &str, agent: &str);

    fn general_stats_mut(&mut self) -> &mut GeneralStats;
}

/// Which request table a record falls into (§4.7 `is404`/static dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTable {
    Requests,
    RequestsStatic,
    NotFoundRequests,
}

/// In-memory reference implementation of [`Counters`], sufficient to drive
/// and test the dispatcher without any external storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemCounters {
    pub status_code: IndexMap<String, u64>,
    pub hosts: IndexMap<String, u64>,
    pub referrers: IndexMap<String, u64>,
    pub referring_sites: IndexMap<String, u64>,
    pub keyphrases: IndexMap<String, u64>,
    pub date_bw: IndexMap<String, u64>,
    pub file_bw: IndexMap<String, u64>,
    pub host_bw: IndexMap<String, u64>,
    pub file_serve_usecs: IndexMap<String, u64>,
    pub host_serve_usecs: IndexMap<String, u64>,
    pub unique_vis_by_date: IndexMap<String, u64>,
    pub unique_visitors: IndexSet<String>,

    pub requests: IndexMap<String, RequestMeta>,
    pub requests_static: IndexMap<String, RequestMeta>,
    pub not_found_requests: IndexMap<String, RequestMeta>,

    pub browsers: IndexMap<String, AgentMeta>,
    pub os: IndexMap<String, AgentMeta>,
    pub countries: IndexMap<String, CountryMeta>,
    pub host_agents: IndexMap<String, IndexSet<String>>,

    pub general_stats: GeneralStats,
}

impl MemCounters {
    pub fn new() -> Self {
        Self::default()
    }

    fn table_mut(&mut self, table: Table) -> &mut IndexMap<String, u64> {
        match table {
            Table::StatusCode => &mut self.status_code,
            Table::Hosts => &mut self.hosts,
            Table::Referrers => &mut self.referrers,
            Table::ReferringSites => &mut self.referring_sites,
            Table::Keyphrases => &mut self.keyphrases,
            Table::DateBw => &mut self.date_bw,
            Table::FileBw => &mut self.file_bw,
            Table::HostBw => &mut self.host_bw,
            Table::FileServeUsecs => &mut self.file_serve_usecs,
            Table::HostServeUsecs => &mut self.host_serve_usecs,
            Table::UniqueVisByDate => &mut self.unique_vis_by_date,
            Table::UniqueVisitors => unreachable!("unique_visitors is a set, not a counter table"),
        }
    }

    fn request_table_mut(&mut self, table: RequestTable) -> &mut IndexMap<String, RequestMeta> {
        match table {
            RequestTable::Requests => &mut self.requests,
            RequestTable::RequestsStatic => &mut self.requests_static,
            RequestTable::NotFoundRequests => &mut self.not_found_requests,
        }
    }
}

impl Counters for MemCounters {
    fn incr(&mut self, table: Table, key: &str) {
        *self.table_mut(table).entry(key.to_string()).or_insert(0) += 1;
    }

    fn add(&mut self, table: Table, key: &str, value: u64) {
        *self.table_mut(table).entry(key.to_string()).or_insert(0) += value;
    }

    fn insert_unique(&mut self, table: Table, key: &str) -> bool {
        match table {
            Table::UniqueVisitors => self.unique_visitors.insert(key.to_string()),
            other => !self.table_mut(other).contains_key(key) && {
                self.table_mut(other).insert(key.to_string(), 0);
                true
            },
        }
    }

    fn record_request(&mut self, table: RequestTable, key: &str, meta: &RequestMeta) {
        let entry = self.request_table_mut(table).entry(key.to_string()).or_default();
        entry.hits += 1;
        if entry.method.is_none() {
            entry.method = meta.method.clone();
        }
        if entry.protocol.is_none() {
            entry.protocol = meta.protocol.clone();
        }
        if entry.uri.is_none() {
            entry.uri = meta.uri.clone();
        }
    }

    fn record_browser(&mut self, name: &str, family: &str) {
        let entry = self.browsers.entry(name.to_string()).or_insert_with(|| AgentMeta {
            hits: 0,
            family: family.to_string(),
        });
        entry.hits += 1;
    }

    fn record_os(&mut self, name: &str, family: &str) {
        let entry = self.os.entry(name.to_string()).or_insert_with(|| AgentMeta {
            hits: 0,
            family: family.to_string(),
        });
        entry.hits += 1;
    }

    fn record_country(&mut self, country: &str, continent: Option<&str>) {
        let entry = self.countries.entry(country.to_string()).or_insert_with(|| CountryMeta {
            hits: 0,
            continent: continent.map(String::from),
        });
        entry.hits += 1;
    }

    fn record_host_agent(&mut self, host: &str, agent: &str) {
        self.host_agents.entry(host.to_string()).or_default().insert(agent.to_string());
    }

    fn general_stats_mut(&mut self) -> &mut GeneralStats {
        &mut self.general_stats
    }
}
