use serde::Serialize;

use super::routes::{RouteMeta, CHANGE_PASSWORD_ROUTE, HOME_ROUTE, LOGIN_ROUTE};
use crate::session::Session;
use crate::types::Role;

/// The only session facts the guard may look at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardContext {
    pub is_logged_in: bool,
    pub must_change_password: bool,
    pub role: Option<Role>,
}

impl From<&Session> for GuardContext {
    fn from(session: &Session) -> Self {
        Self {
            is_logged_in: session.is_logged_in(),
            must_change_password: session.must_change_password,
            role: session.role(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Redirect(String),
}

/// Decide a transition to `target` (a normalized path).
///
/// Checked strictly in this order:
/// 1. requires auth, logged out → `/login`
/// 2. logged in, must change password, target is not `/change-password` → `/change-password`
/// 3. requires admin, role is not admin → `/`
/// 4. target is `/login`, logged in → `/`
/// 5. allow
pub fn evaluate(target: &str, meta: &RouteMeta, ctx: &GuardContext) -> Decision {
    if meta.requires_auth && !ctx.is_logged_in {
        return Decision::Redirect(LOGIN_ROUTE.to_string());
    }
    if ctx.is_logged_in && ctx.must_change_password && target != CHANGE_PASSWORD_ROUTE {
        return Decision::Redirect(CHANGE_PASSWORD_ROUTE.to_string());
    }
    if meta.requires_admin && ctx.role != Some(Role::Admin) {
        return Decision::Redirect(HOME_ROUTE.to_string());
    }
    if target == LOGIN_ROUTE && ctx.is_logged_in {
        return Decision::Redirect(HOME_ROUTE.to_string());
    }
    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(is_logged_in: bool, must_change_password: bool, role: Option<Role>) -> GuardContext {
        GuardContext {
            is_logged_in,
            must_change_password,
            role,
        }
    }

    fn redirect(to: &str) -> Decision {
        Decision::Redirect(to.to_string())
    }

    #[test]
    fn test_logged_out_needs_login() {
        let anon = GuardContext::default();
        assert_eq!(evaluate("/tasks", &RouteMeta::AUTH, &anon), redirect("/login"));
        assert_eq!(evaluate("/admin/users", &RouteMeta::ADMIN, &anon), redirect("/login"));
        assert_eq!(evaluate("/login", &RouteMeta::PUBLIC, &anon), Decision::Allow);
    }

    #[test]
    fn test_password_change_beats_everything_else() {
        let admin = ctx(true, true, Some(Role::Admin));
        assert_eq!(evaluate("/admin/projects", &RouteMeta::ADMIN, &admin), redirect("/change-password"));
        assert_eq!(evaluate("/login", &RouteMeta::PUBLIC, &admin), redirect("/change-password"));
        assert_eq!(evaluate("/tasks", &RouteMeta::AUTH, &admin), redirect("/change-password"));
        assert_eq!(evaluate("/change-password", &RouteMeta::AUTH, &admin), Decision::Allow);

        let normal = ctx(true, true, Some(Role::Normal));
        assert_eq!(evaluate("/admin/users", &RouteMeta::ADMIN, &normal), redirect("/change-password"));
    }

    #[test]
    fn test_flag_ignored_when_logged_out() {
        // A stale flag without a token cannot exist after rehydrate, but the guard must still send to login
        let stale = ctx(false, true, None);
        assert_eq!(evaluate("/tasks", &RouteMeta::AUTH, &stale), redirect("/login"));
        assert_eq!(evaluate("/login", &RouteMeta::PUBLIC, &stale), Decision::Allow);
    }

    #[test]
    fn test_admin_routes() {
        let normal = ctx(true, false, Some(Role::Normal));
        assert_eq!(evaluate("/admin/users", &RouteMeta::ADMIN, &normal), redirect("/"));

        let no_profile = ctx(true, false, None);
        assert_eq!(evaluate("/admin/users", &RouteMeta::ADMIN, &no_profile), redirect("/"));

        let admin = ctx(true, false, Some(Role::Admin));
        assert_eq!(evaluate("/admin/users", &RouteMeta::ADMIN, &admin), Decision::Allow);
    }

    #[test]
    fn test_login_page_when_logged_in() {
        let normal = ctx(true, false, Some(Role::Normal));
        assert_eq!(evaluate("/login", &RouteMeta::PUBLIC, &normal), redirect("/"));
        assert_eq!(evaluate("/tasks", &RouteMeta::AUTH, &normal), Decision::Allow);
    }

    #[test]
    fn test_decision_is_pure_over_inputs() {
        let metas = [RouteMeta::PUBLIC, RouteMeta::AUTH, RouteMeta::ADMIN];
        let targets = ["/login", "/change-password", "/tasks", "/admin/users"];
        let roles = [None, Some(Role::Normal), Some(Role::Admin)];

        for meta in &metas {
            for target in targets {
                for logged_in in [false, true] {
                    for flag in [false, true] {
                        for role in roles {
                            let c = ctx(logged_in, flag, role);
                            let first = evaluate(target, meta, &c);
                            assert_eq!(first, evaluate(target, meta, &c));

                            let expected = if meta.requires_auth && !logged_in {
                                redirect("/login")
                            } else if logged_in && flag && target != "/change-password" {
                                redirect("/change-password")
                            } else if meta.requires_admin && role != Some(Role::Admin) {
                                redirect("/")
                            } else if target == "/login" && logged_in {
                                redirect("/")
                            } else {
                                Decision::Allow
                            };
                            assert_eq!(first, expected, "{} {:?} {:?}", target, meta, c);
                        }
                    }
                }
            }
        }
    }
}
