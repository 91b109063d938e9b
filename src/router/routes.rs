use once_cell::sync::Lazy;
use serde::Serialize;

/// Requirements a route declares for the guard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: RouteMeta = RouteMeta {
        requires_auth: false,
        requires_admin: false,
    };
    pub const AUTH: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_admin: false,
    };
    pub const ADMIN: RouteMeta = RouteMeta {
        requires_auth: true,
        requires_admin: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
    /// Static alias: navigating here lands on the target instead
    pub redirect: Option<&'static str>,
}

impl Route {
    const fn page(path: &'static str, name: &'static str, meta: RouteMeta) -> Self {
        Self {
            path,
            name,
            meta,
            redirect: None,
        }
    }

    const fn alias(path: &'static str, target: &'static str) -> Self {
        Self {
            path,
            name: "",
            meta: RouteMeta::PUBLIC,
            redirect: Some(target),
        }
    }
}

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";
pub const CHANGE_PASSWORD_ROUTE: &str = "/change-password";

pub static ROUTES: Lazy<Vec<Route>> = Lazy::new(|| {
    vec![
        Route::page(LOGIN_ROUTE, "Login", RouteMeta::PUBLIC),
        Route::alias(HOME_ROUTE, "/report"),
        Route::page("/report", "Report", RouteMeta::AUTH),
        Route::page("/daily-report", "DailyReport", RouteMeta::AUTH),
        Route::page("/daily-report/history", "DailyReportHistory", RouteMeta::AUTH),
        Route::page("/tasks", "TaskList", RouteMeta::AUTH),
        Route::alias("/summary", "/chart"),
        Route::page("/history", "History", RouteMeta::AUTH),
        Route::page("/chart", "Chart", RouteMeta::AUTH),
        Route::page("/admin/users", "AdminUsers", RouteMeta::ADMIN),
        Route::page("/admin/projects", "AdminProjects", RouteMeta::ADMIN),
        Route::page(CHANGE_PASSWORD_ROUTE, "ChangePassword", RouteMeta::AUTH),
    ]
});

/// Strip query, fragment and trailing slashes (but keep `/` itself)
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return HOME_ROUTE.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

pub fn find(path: &str) -> Option<&'static Route> {
    let path = normalize(path);
    ROUTES.iter().find(|r| r.path == path)
}
