//! Collaborator interfaces consumed by the core (§6, §10.4).
//!
//! GoAccess's original implementation calls out to `ip_in_range`,
//! `is_crawler`, `verify_browser`, `verify_os`, and `geoip_get_*` as
//! free functions backed by global tables/databases. The core treats all of
//! them as out-of-scope collaborators (§1) and only defines the trait
//! boundary, the same seam `kelora` draws around its `EventParser`/
//! `Formatter`/`OutputWriter` traits in `pipeline.rs`. A dependency-free
//! default implementation is provided for each so the crate is directly
//! runnable and testable without a GeoIP database or UA signature tables.

use crate::item::IpKind;
use std::net::IpAddr;

/// IP classification (§6: `ip_in_range`, `invalid_ipaddr`).
pub trait IpOracle: Send + Sync {
    /// Validates `host` as an IP literal, returning its address family.
    fn validate(&self, host: &str) -> Option<IpKind>;
    /// True if `host` falls inside a configured ignore range.
    fn in_ignore_range(&self, host: &str) -> bool;
}

/// `std::net`-backed validator with no configured ignore ranges (§10.4).
#[derive(Debug, Default, Clone)]
pub struct StdIpOracle {
    pub ignore_ranges: Vec<(IpAddr, u8)>,
}

impl StdIpOracle {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IpOracle for StdIpOracle {
    fn validate(&self, host: &str) -> Option<IpKind> {
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => Some(IpKind::V4),
            Ok(IpAddr::V6(_)) => Some(IpKind::V6),
            Err(_) => None,
        }
    }

    fn in_ignore_range(&self, host: &str) -> bool {
        let Ok(addr) = host.parse::<IpAddr>() else {
            return false;
        };
        self.ignore_ranges.iter().any(|(base, prefix)| in_cidr(addr, *base, *prefix))
    }
}

fn in_cidr(addr: IpAddr, base: IpAddr, prefix: u8) -> bool {
    match (addr, base) {
        (IpAddr::V4(a), IpAddr::V4(b)) => {
            let mask = if prefix >= 32 { u32::MAX } else { !0u32 << (32 - prefix) };
            (u32::from(a) & mask) == (u32::from(b) & mask)
        }
        (IpAddr::V6(a), IpAddr::V6(b)) => {
            let mask = if prefix >= 128 { u128::MAX } else { !0u128 << (128 - prefix) };
            (u128::from(a) & mask) == (u128::from(b) & mask)
        }
        _ => false,
    }
}

/// Browser/OS/crawler signature lookup (§6: `is_crawler`, `verify_browser`,
/// `verify_os`).
pub trait AgentOracle: Send + Sync {
    fn is_crawler(&self, agent: &str) -> bool;
    /// Returns `(name, family)` for the browser, if recognized.
    fn verify_browser(&self, agent: &str) -> Option<(String, String)>;
    /// Returns `(name, family)` for the operating system, if recognized.
    fn verify_os(&self, agent: &str) -> Option<(String, String)>;
}

/// Minimal table-driven oracle: enough to exercise the uniqueness/browser/OS
/// dispatch (§4.8) without shipping a real signature database.
#[derive(Debug, Default, Clone)]
pub struct StaticAgentOracle;

impl AgentOracle for StaticAgentOracle {
    fn is_crawler(&self, agent: &str) -> bool {
        let lower = agent.to_ascii_lowercase();
        ["bot", "spider", "crawl"].iter().any(|needle| lower.contains(needle))
    }

    fn verify_browser(&self, agent: &str) -> Option<(String, String)> {
        let lower = agent.to_ascii_lowercase();
        if lower.contains("firefox") {
            Some(("Firefox".into(), "Gecko".into()))
        } else if lower.contains("chrome") {
            Some(("Chrome".into(), "Webkit".into()))
        } else if lower.contains("safari") {
            Some(("Safari".into(), "Webkit".into()))
        } else if lower == "-" || lower.is_empty() {
            None
        } else {
            Some(("Unknown".into(), "Unknown".into()))
        }
    }

    fn verify_os(&self, agent: &str) -> Option<(String, String)> {
        let lower = agent.to_ascii_lowercase();
        if lower.contains("windows") {
            Some(("Windows".into(), "Windows".into()))
        } else if lower.contains("mac os") || lower.contains("macos") {
            Some(("macOS".into(), "Macintosh".into()))
        } else if lower.contains("linux") {
            Some(("Linux".into(), "Unix".into()))
        } else if lower == "-" || lower.is_empty() {
            None
        } else {
            Some(("Unknown".into(), "Unknown".into()))
        }
    }
}

/// Geolocation lookup (§6: `geoip_get_country`/`_continent`/`_city`).
pub trait GeoOracle: Send + Sync {
    fn country(&self, host: &str, kind: IpKind) -> Option<String>;
    fn continent(&self, host: &str, kind: IpKind) -> Option<String>;
    /// Only consulted when a city database is configured (§4.8, §6).
    fn city(&self, host: &str, kind: IpKind) -> Option<String>;
}

/// No GeoIP database configured (§1: GeoIP database is out of scope).
#[derive(Debug, Default, Clone)]
pub struct NullGeoOracle;

impl GeoOracle for NullGeoOracle {
    fn country(&self, _host: &str, _kind: IpKind) -> Option<String> {
        None
    }
    fn continent(&self, _host: &str, _kind: IpKind) -> Option<String> {
        None
    }
    fn city(&self, _host: &str, _kind: IpKind) -> Option<String> {
        None
    }
}

/// Progress-spinner collaborator (§5, §6). The driver takes `lock`/`unlock`
/// around each per-line counter increment iff the spinner reports
/// `is_running() == true`, mirroring `SPN_RUN` gating in the original.
pub trait Spinner: Send + Sync {
    fn lock(&self);
    fn unlock(&self);
    fn is_running(&self) -> bool;
}

/// No spinner attached: counter increments proceed unlocked (§5).
#[derive(Debug, Default, Clone)]
pub struct NoSpinner;

impl Spinner for NoSpinner {
    fn lock(&self) {}
    fn unlock(&self) {}
    fn is_running(&self) -> bool {
        false
    }
}
