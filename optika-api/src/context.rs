use axum::http::HeaderMap;

use crate::error::AppError;

/// Caller identity derived from gateway-injected headers. Authentication
/// itself happens upstream; this layer only reads the result.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub tenant_id: String,
    pub user_id: String,
    pub roles: Vec<String>,
    pub scopes: Vec<String>,
}

impl RequestContext {
    /// Build the context from `x-tenant-id` / `x-user-id` / `x-roles` /
    /// `x-scopes`. The tenant header is mandatory.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let tenant_id = header_value(headers, "x-tenant-id")
            .ok_or_else(|| AppError::ValidationError("Missing x-tenant-id header".to_string()))?;

        let user_id = header_value(headers, "x-user-id").unwrap_or_else(|| "system".to_string());
        let roles = parse_csv(header_value(headers, "x-roles"));
        let scopes = parse_csv(header_value(headers, "x-scopes"));

        Ok(Self {
            tenant_id,
            user_id,
            roles,
            scopes,
        })
    }

    pub fn ensure_scope(&self, scope: &str) -> Result<(), AppError> {
        if !self.scopes.iter().any(|s| s == scope) {
            return Err(AppError::ForbiddenError(format!("Missing scope: {}", scope)));
        }
        Ok(())
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

pub fn parse_csv(value: Option<String>) -> Vec<String> {
    value
        .map(|raw| {
            raw.split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tenant_header_is_required() {
        let headers = HeaderMap::new();
        assert!(RequestContext::from_headers(&headers).is_err());
    }

    #[test]
    fn csv_headers_are_trimmed_and_filtered() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("tenant-1"));
        headers.insert(
            "x-scopes",
            HeaderValue::from_static("orders:read, orders:patient:read, "),
        );

        let context = RequestContext::from_headers(&headers).unwrap();
        assert_eq!(context.user_id, "system");
        assert_eq!(context.scopes, vec!["orders:read", "orders:patient:read"]);
        assert!(context.ensure_scope("orders:patient:read").is_ok());
        assert!(context.ensure_scope("orders:admin").is_err());
    }
}
