use std::sync::Arc;

use crate::api::{AdminUsersApi, AuthApi, DailyReportApi, ProjectsApi, ReportApi, SummaryApi, TaskApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::HttpClient;
use crate::notify::{Notifier, TracingNotifier};
use crate::router::{Navigator, Router, HOME_ROUTE, LOGIN_ROUTE};
use crate::session::{LoginOutcome, SessionStore};
use crate::types::MessageResponse;

/// Everything a screen needs: the shared session, the router that guards
/// transitions, and the request pipeline wired to both.
///
/// A 401 seen by the pipeline logs the session out and moves this client's
/// router to the login screen.
#[derive(Debug)]
pub struct WorkReportClient {
    http: HttpClient,
    router: Arc<Router>,
}

impl WorkReportClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        Self::with_notifier(config, session, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let router = Arc::new(Router::new(session.clone()));
        let http = HttpClient::builder(config, session)
            .notifier(notifier)
            .navigator(router.clone())
            .build()?;

        Ok(Self { http, router })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.http.session()
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    pub fn reports(&self) -> ReportApi<'_> {
        ReportApi::new(&self.http)
    }

    pub fn daily_reports(&self) -> DailyReportApi<'_> {
        DailyReportApi::new(&self.http)
    }

    pub fn tasks(&self) -> TaskApi<'_> {
        TaskApi::new(&self.http)
    }

    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(&self.http)
    }

    pub fn summary(&self) -> SummaryApi<'_> {
        SummaryApi::new(&self.http)
    }

    pub fn users(&self) -> AdminUsersApi<'_> {
        AdminUsersApi::new(&self.http)
    }

    /// Log in, then head for the home screen (the guard may divert to the
    /// password change screen)
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let outcome = self.session().login(&self.auth(), username, password).await?;
        self.router.navigate(HOME_ROUTE);
        Ok(outcome)
    }

    pub fn logout(&self) -> Result<()> {
        self.session().logout()?;
        self.router.navigate(LOGIN_ROUTE);
        Ok(())
    }

    /// Change the password and lift the forced change flag
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<MessageResponse> {
        let response = self.auth().change_password(old_password, new_password).await?;
        self.session().clear_must_change_password()?;
        Ok(response)
    }
}
