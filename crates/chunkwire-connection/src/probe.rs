//! Best-effort classification of monitoring traffic.
//!
//! Load balancers and crawlers poke listening ports with traffic that is not
//! an application message. These predicates let the connection report such
//! traffic as a health check instead of a decode failure. They only look at
//! a prefix of the payload and must not be used for access control.

/// Request line sent by crawlers probing an arbitrary port as HTTP.
pub const CRAWLER_REQUEST_LINE: &[u8] = b"GET /robots.txt HTTP/1.1";

/// Payloads this short are never treated as crawler probes.
const MIN_CRAWLER_PROBE_LEN: usize = 11;

/// Whether `payload` looks like an HTTP crawler fetching `robots.txt`.
pub fn is_crawler_probe(payload: &[u8]) -> bool {
    payload.len() >= MIN_CRAWLER_PROBE_LEN && payload.starts_with(CRAWLER_REQUEST_LINE)
}

/// Whether `payload` is monitoring traffic: nothing at all, a lone NUL
/// keep-alive byte, or a crawler probe.
///
/// A single `0x00` byte always matches, so an application message consisting
/// of exactly one NUL byte can never be delivered. Longer payloads that
/// merely start or end with NUL are unaffected.
pub fn is_health_check(payload: &[u8]) -> bool {
    matches!(payload, [] | [0]) || is_crawler_probe(payload)
}
