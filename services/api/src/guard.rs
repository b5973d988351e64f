//! Request authorization guard
//!
//! Every request is classified before any handler runs: public paths pass
//! through, protected paths require a resolved identity, and admin paths
//! additionally require a role from the route table. The decision is a pure
//! function of the request path and the resolved identity; the HTTP mapping
//! lives in [`crate::middleware`].
//!
//! Protected paths that match no route-table prefix only require
//! authentication.

use crate::middleware::AuthUser;
use crate::rbac::Role;

/// Outcome of guarding one request
///
/// Unauthenticated and unauthorized are distinct outcomes and are never
/// conflated: a missing or invalid token can only ever produce
/// `DenyUnauthenticated`.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// Request may proceed to its handler
    Allow,
    /// No identity could be resolved; `next` preserves the originally
    /// requested path and query so the caller can be sent back after login
    DenyUnauthenticated { next: String },
    /// Identity resolved but its role is outside the route's allowed set
    DenyUnauthorized {
        required: &'static [Role],
        current: Role,
    },
}

/// Path prefixes reachable without a session. The root path is matched
/// exactly, everything else by prefix.
const PUBLIC_PREFIXES: &[&str] = &[
    "/health", "/auth", "/login", "/signup", "/public", "/pages", "/products", "/contact", "/quote",
];

/// Ordered (prefix, allowed roles) pairs for the admin surface; the first
/// matching prefix wins, so the specific entries must precede the `/admin`
/// catch-all.
const ROUTE_TABLE: &[(&str, &[Role])] = &[
    ("/admin/users", &[Role::ManagingDirector, Role::Admin]),
    (
        "/admin/inventory",
        &[Role::ManagingDirector, Role::Admin, Role::InventoryManager],
    ),
    (
        "/admin/sales",
        &[Role::ManagingDirector, Role::Admin, Role::Cashier],
    ),
    (
        "/admin/reports",
        &[Role::ManagingDirector, Role::Admin, Role::ReportViewer],
    ),
    (
        "/admin/categories",
        &[Role::ManagingDirector, Role::Admin, Role::InventoryManager],
    ),
    (
        "/admin/products",
        &[Role::ManagingDirector, Role::Admin, Role::InventoryManager],
    ),
    ("/admin/media", &[Role::ManagingDirector, Role::Admin]),
    ("/admin/pages", &[Role::ManagingDirector, Role::Admin]),
    ("/admin/messages", &[Role::ManagingDirector, Role::Admin]),
    ("/admin", &Role::ALL),
];

/// Whether `path` is reachable without authentication
fn is_public(path: &str) -> bool {
    path == "/" || PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Decide whether a request may proceed
///
/// # Arguments
///
/// * `path_and_query` - the original request path including any query string
/// * `identity` - the resolved caller identity, if any; callers must pass
///   `None` for absent and for invalid tokens alike
pub fn authorize(path_and_query: &str, identity: Option<&AuthUser>) -> AccessDecision {
    let path = path_and_query
        .split('?')
        .next()
        .unwrap_or(path_and_query);

    if is_public(path) {
        return AccessDecision::Allow;
    }

    let Some(user) = identity else {
        return AccessDecision::DenyUnauthenticated {
            next: path_and_query.to_string(),
        };
    };

    for (prefix, allowed) in ROUTE_TABLE {
        if path.starts_with(prefix) {
            if allowed.contains(&user.role) {
                return AccessDecision::Allow;
            }
            return AccessDecision::DenyUnauthorized {
                required: allowed,
                current: user.role,
            };
        }
    }

    AccessDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_public_paths_allow_without_identity() {
        for path in [
            "/",
            "/health",
            "/pages/about-us",
            "/products",
            "/products/b2c6d9f0",
            "/contact",
            "/quote",
            "/auth/login",
            "/signup",
        ] {
            assert_eq!(authorize(path, None), AccessDecision::Allow, "path {path}");
        }
    }

    #[test]
    fn test_root_is_exact_match_only() {
        // "/secret" is not under any public prefix even though "/" is public
        assert!(matches!(
            authorize("/secret", None),
            AccessDecision::DenyUnauthenticated { .. }
        ));
    }

    #[test]
    fn test_protected_without_identity_is_unauthenticated() {
        let decision = authorize("/admin/sales?page=2&per_page=10", None);
        match decision {
            AccessDecision::DenyUnauthenticated { next } => {
                assert_eq!(next, "/admin/sales?page=2&per_page=10");
            }
            other => panic!("expected DenyUnauthenticated, got {other:?}"),
        }
    }

    #[test]
    fn test_role_outside_allowed_set_is_unauthorized() {
        let cashier = user(Role::Cashier);
        let decision = authorize("/admin/users", Some(&cashier));
        match decision {
            AccessDecision::DenyUnauthorized { required, current } => {
                assert_eq!(required, &[Role::ManagingDirector, Role::Admin]);
                assert_eq!(current, Role::Cashier);
            }
            other => panic!("expected DenyUnauthorized, got {other:?}"),
        }
    }

    #[test]
    fn test_allowed_role_passes() {
        let cashier = user(Role::Cashier);
        assert_eq!(authorize("/admin/sales", Some(&cashier)), AccessDecision::Allow);

        let manager = user(Role::InventoryManager);
        assert_eq!(
            authorize("/admin/inventory/low-stock", Some(&manager)),
            AccessDecision::Allow
        );

        let viewer = user(Role::ReportViewer);
        assert_eq!(
            authorize("/admin/reports/sales-summary", Some(&viewer)),
            AccessDecision::Allow
        );
    }

    #[test]
    fn test_dashboard_open_to_all_staff_roles() {
        for role in Role::ALL {
            assert_eq!(
                authorize("/admin", Some(&user(role))),
                AccessDecision::Allow,
                "role {role}"
            );
        }
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        // "/admin/sales" must hit the cashier entry, not the "/admin"
        // catch-all that admits every staff role
        let viewer = user(Role::ReportViewer);
        assert!(matches!(
            authorize("/admin/sales", Some(&viewer)),
            AccessDecision::DenyUnauthorized { .. }
        ));
    }

    #[test]
    fn test_unlisted_protected_path_requires_authentication_only() {
        assert!(matches!(
            authorize("/internal/debug", None),
            AccessDecision::DenyUnauthenticated { .. }
        ));
        assert_eq!(
            authorize("/internal/debug", Some(&user(Role::ReportViewer))),
            AccessDecision::Allow
        );
    }
}
