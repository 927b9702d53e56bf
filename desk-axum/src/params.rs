use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::Uri;

use desk_core::capability::CapabilitySet;
use desk_core::ActorContext;

#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub provider: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: String,
    pub path: String,
    pub raw_query: Option<String>,
}

impl RestParams {
    pub fn from_parts(
        provider: &str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &str,
        uri: &Uri,
    ) -> Self {
        let mut out = Self {
            provider: provider.to_string(),
            headers: HashMap::new(),
            query,
            method: method.to_string(),
            path: uri.path().to_string(),
            raw_query: uri.query().map(|s| s.to_string()),
        };

        for (k, v) in headers.iter() {
            if let Ok(s) = v.to_str() {
                out.headers.insert(k.to_string(), s.to_string());
            }
        }

        out
    }
}

pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}

/// Derive the acting identity from request headers.
///
/// The authentication layer in front of this adapter is expected to set
/// `x-actor-id`, `x-tenant-id`, and `x-capabilities` (comma-separated
/// capability keys). Absent headers degrade to an anonymous actor in the
/// default tenant with no capabilities, which every scoped operation
/// resolves to deny.
pub fn actor_from_headers(headers: &HeaderMap) -> ActorContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let actor = header("x-actor-id").unwrap_or_else(|| "anonymous".to_string());
    let tenant = header("x-tenant-id").unwrap_or_else(|| "default".to_string());
    let capabilities = header("x-capabilities")
        .map(|raw| CapabilitySet::from_keys(raw.split(',').map(|s| s.to_string())))
        .unwrap_or_default();

    ActorContext::new(actor, tenant, capabilities)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use desk_core::capability::CapabilityAction;

    use super::*;

    #[test]
    fn actor_headers_parse_capability_list() {
        let mut headers = HeaderMap::new();
        headers.insert("x-actor-id", HeaderValue::from_static("user-5"));
        headers.insert("x-tenant-id", HeaderValue::from_static("tenant-1"));
        headers.insert(
            "x-capabilities",
            HeaderValue::from_static("manage-own-support-tickets, create-support-tickets"),
        );

        let ctx = actor_from_headers(&headers);
        assert_eq!(ctx.actor_id.0, "user-5");
        assert_eq!(ctx.tenant_id.0, "tenant-1");
        assert!(ctx
            .capabilities
            .grants(CapabilityAction::ManageOwn, "support-tickets"));
        assert!(ctx
            .capabilities
            .grants(CapabilityAction::Create, "support-tickets"));
    }

    #[test]
    fn missing_headers_degrade_to_anonymous() {
        let ctx = actor_from_headers(&HeaderMap::new());
        assert_eq!(ctx.actor_id.0, "anonymous");
        assert_eq!(ctx.tenant_id.0, "default");
        assert!(ctx.capabilities.is_empty());
    }
}
