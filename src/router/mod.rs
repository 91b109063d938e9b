//! Named screens, their access metadata, and the navigation guard.

pub mod guard;
pub mod routes;

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use thiserror::Error;

use crate::session::SessionStore;
pub use guard::{evaluate, Decision, GuardContext};
pub use routes::{Route, RouteMeta, CHANGE_PASSWORD_ROUTE, HOME_ROUTE, LOGIN_ROUTE, ROUTES};

const MAX_REDIRECTS: usize = 8;

/// Something that can move the client to another screen
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Discards navigation requests
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigation ignored");
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("No route matches '{0}'")]
    NotFound(String),

    #[error("Redirect loop while navigating to '{0}'")]
    RedirectLoop(String),
}

/// Result of a completed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub requested: String,
    pub route: &'static Route,
    /// Every intermediate target, in order (static aliases and guard redirects)
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn path(&self) -> &'static str {
        self.route.path
    }

    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

pub struct Router {
    session: Arc<SessionStore>,
    current: RwLock<Option<&'static Route>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.current().map(|r| r.path))
            .finish()
    }
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            current: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<&'static Route> {
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Work out where a transition to `path` would land, without moving
    pub fn resolve(&self, path: &str) -> Result<Navigation, RouterError> {
        let requested = routes::normalize(path);
        let ctx = GuardContext::from(&self.session.snapshot());

        let mut target = requested.clone();
        let mut redirects = Vec::new();
        loop {
            if redirects.len() > MAX_REDIRECTS {
                return Err(RouterError::RedirectLoop(requested));
            }

            let route = routes::find(&target);
            if let Some(Route { redirect: Some(alias), .. }) = route {
                target = alias.to_string();
                redirects.push(target.clone());
                continue;
            }

            let meta = route.map(|r| r.meta).unwrap_or_default();
            match guard::evaluate(&target, &meta, &ctx) {
                Decision::Allow => {
                    let route = route.ok_or_else(|| RouterError::NotFound(target.clone()))?;
                    return Ok(Navigation {
                        requested,
                        route,
                        redirects,
                    });
                }
                Decision::Redirect(to) => {
                    target = to;
                    redirects.push(target.clone());
                }
            }
        }
    }

    /// Navigate: run the guard, follow redirects, then make the landing route current
    pub fn push(&self, path: &str) -> Result<Navigation, RouterError> {
        let navigation = self.resolve(path)?;
        if navigation.was_redirected() {
            tracing::debug!(from = %navigation.requested, to = navigation.path(), "Navigation redirected");
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(navigation.route);
        Ok(navigation)
    }
}

impl Navigator for Router {
    fn navigate(&self, path: &str) {
        if let Err(e) = self.push(path) {
            tracing::warn!("Navigation to {} failed: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;
    use crate::types::{Role, UserProfile};

    fn router_for(token: Option<&str>, must_change_password: bool, role: Role) -> Router {
        let storage = MemoryStorage::new();
        if let Some(token) = token {
            use crate::session::storage::{Storage, MUST_CHANGE_PASSWORD_KEY, TOKEN_KEY, USER_KEY};
            storage.set(TOKEN_KEY, token).unwrap();
            storage
                .set(MUST_CHANGE_PASSWORD_KEY, if must_change_password { "true" } else { "false" })
                .unwrap();
            let user = UserProfile {
                id: 1,
                username: "u".into(),
                role,
                real_name: None,
                department: None,
                is_active: None,
                created_at: None,
            };
            storage.set(USER_KEY, &serde_json::to_string(&user).unwrap()).unwrap();
        }
        let session = SessionStore::rehydrate(Arc::new(storage)).unwrap();
        Router::new(Arc::new(session))
    }

    #[test]
    fn test_home_alias_lands_on_report() {
        let router = router_for(Some("T"), false, Role::Normal);
        let nav = router.push("/").unwrap();
        assert_eq!(nav.path(), "/report");
        assert_eq!(router.current().unwrap().name, "Report");
    }

    #[test]
    fn test_logged_out_lands_on_login() {
        let router = router_for(None, false, Role::Normal);
        let nav = router.push("/tasks").unwrap();
        assert_eq!(nav.path(), "/login");
        assert_eq!(nav.redirects, vec!["/login".to_string()]);
    }

    #[test]
    fn test_non_admin_bounced_home_then_report() {
        let router = router_for(Some("T"), false, Role::Normal);
        let nav = router.push("/admin/projects").unwrap();
        assert_eq!(nav.path(), "/report");
        assert_eq!(nav.redirects, vec!["/".to_string(), "/report".to_string()]);
    }

    #[test]
    fn test_flagged_admin_only_reaches_change_password() {
        let router = router_for(Some("T"), true, Role::Admin);
        for path in ["/admin/users", "/login", "/", "/summary", "/tasks"] {
            assert_eq!(router.push(path).unwrap().path(), "/change-password", "{}", path);
        }
    }

    #[test]
    fn test_summary_alias() {
        let router = router_for(Some("T"), false, Role::Normal);
        assert_eq!(router.push("/summary").unwrap().path(), "/chart");
    }

    #[test]
    fn test_unknown_route() {
        let router = router_for(Some("T"), false, Role::Normal);
        assert_eq!(router.push("/nowhere"), Err(RouterError::NotFound("/nowhere".to_string())));
        assert!(router.current().is_none());

        let flagged = router_for(Some("T"), true, Role::Normal);
        assert_eq!(flagged.push("/nowhere").unwrap().path(), "/change-password");
    }

    #[test]
    fn test_navigator_moves_router() {
        let router = router_for(None, false, Role::Normal);
        router.navigate("/login");
        assert_eq!(router.current().unwrap().path, "/login");
    }
}
