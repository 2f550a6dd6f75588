//! Tenant slug extraction from request paths and hosts

use std::net::IpAddr;

use roster_shared::constants::RESERVED_SUBDOMAINS;
use roster_shared::utils::is_valid_slug;

/// Prefix of path-addressed tenant routes.
pub const TENANT_PATH_PREFIX: &str = "/api/t/";

/// `/api/t/<slug>/...` yields `<slug>`.
pub fn slug_from_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix(TENANT_PATH_PREFIX)?;
    let slug = rest.split('/').next()?.to_lowercase();
    is_valid_slug(&slug).then_some(slug)
}

/// Subdomain rules: the port is ignored, IP literals and bare `localhost`
/// never name a tenant, `<slug>.localhost` does, and any other host must be
/// exactly one label above `base_domain`. Reserved labels are skipped.
pub fn slug_from_host(host: &str, base_domain: &str) -> Option<String> {
    let host = host.trim().to_lowercase();
    if host.is_empty() || host.starts_with('[') {
        return None;
    }
    let hostname = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host.as_str(),
    };
    if hostname.parse::<IpAddr>().is_ok() || hostname == "localhost" {
        return None;
    }

    let label = if let Some(label) = hostname.strip_suffix(".localhost") {
        label
    } else {
        let base = base_domain.trim().trim_start_matches('.').to_lowercase();
        if base.is_empty() {
            return None;
        }
        hostname.strip_suffix(base.as_str())?.strip_suffix('.')?
    };

    if label.contains('.') || RESERVED_SUBDOMAINS.contains(&label) || !is_valid_slug(label) {
        return None;
    }
    Some(label.to_string())
}

/// Path prefix wins over the subdomain.
pub fn resolve_slug(path: &str, host: Option<&str>, base_domain: &str) -> Option<String> {
    slug_from_path(path).or_else(|| host.and_then(|h| slug_from_host(h, base_domain)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        assert_eq!(slug_from_path("/api/t/acme/admin/roster"), Some("acme".into()));
        assert_eq!(slug_from_path("/api/t/Acme"), Some("acme".into()));
        assert_eq!(slug_from_path("/api/admin/roster"), None);
        assert_eq!(slug_from_path("/api/t//x"), None);
    }

    #[test]
    fn test_host_rules() {
        let base = "roster.example.com";
        assert_eq!(slug_from_host("acme.roster.example.com", base), Some("acme".into()));
        assert_eq!(slug_from_host("ACME.roster.example.com:8443", base), Some("acme".into()));
        assert_eq!(slug_from_host("acme.localhost:3000", base), Some("acme".into()));
        assert_eq!(slug_from_host("localhost:3000", base), None);
        assert_eq!(slug_from_host("127.0.0.1:3000", base), None);
        assert_eq!(slug_from_host("[::1]:3000", base), None);
        assert_eq!(slug_from_host("roster.example.com", base), None);
        assert_eq!(slug_from_host("a.b.roster.example.com", base), None);
        assert_eq!(slug_from_host("www.roster.example.com", base), None);
        assert_eq!(slug_from_host("api.localhost", base), None);
        assert_eq!(slug_from_host("acme.other.com", base), None);
        assert_eq!(slug_from_host("evilroster.example.com", base), None);
    }

    #[test]
    fn test_path_wins() {
        let slug = resolve_slug("/api/t/north/tenant", Some("south.localhost"), "example.com");
        assert_eq!(slug, Some("north".into()));
        let slug = resolve_slug("/api/tenant", Some("south.localhost"), "example.com");
        assert_eq!(slug, Some("south".into()));
    }
}
