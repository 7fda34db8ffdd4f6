//! Monitored service defaults

use crate::monitoring::ServiceDescriptor;

/// Built-in service table: id, name, base-URL variable, local port, critical
const GOVERNANCE_SERVICES: [(&str, &str, &str, u16, bool); 7] = [
    ("auth", "Authentication Service", "AUTH_SERVICE_URL", 8000, true),
    ("ac", "Constitutional Principles Service", "AC_SERVICE_URL", 8001, true),
    ("integrity", "Integrity Service", "INTEGRITY_SERVICE_URL", 8002, true),
    ("fv", "Formal Verification Service", "FV_SERVICE_URL", 8003, false),
    ("gs", "Governance Synthesis Service", "GS_SERVICE_URL", 8004, false),
    ("pgc", "Policy Compliance Service", "PGC_SERVICE_URL", 8005, true),
    ("ec", "Event Coordination Service", "EC_SERVICE_URL", 8006, false),
];

/// Environment variable holding the base URL of `service_id`
pub fn service_url_var(service_id: &str) -> Option<&'static str> {
    GOVERNANCE_SERVICES
        .iter()
        .find(|(id, ..)| *id == service_id)
        .map(|(_, _, var, ..)| *var)
}

/// The governance services on their local addresses
pub fn default_services() -> Vec<ServiceDescriptor> {
    services_with(|_| None)
}

/// The governance services, with base URLs taken from the environment when set
pub fn services_from_env() -> Vec<ServiceDescriptor> {
    services_with(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
}

fn services_with(lookup: impl Fn(&str) -> Option<String>) -> Vec<ServiceDescriptor> {
    GOVERNANCE_SERVICES
        .iter()
        .map(|(id, name, var, port, critical)| {
            let base_url = lookup(var).unwrap_or_else(|| format!("http://localhost:{}", port));
            ServiceDescriptor::new(*id, *name, base_url.trim_end_matches('/')).critical(*critical)
        })
        .collect()
}
