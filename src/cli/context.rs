use std::sync::Arc;

use anyhow::Context as _;

use crate::cli::config::{client_config, get_config_dir};
use crate::client::WorkReportClient;
use crate::router::{Navigation, CHANGE_PASSWORD_ROUTE, LOGIN_ROUTE};
use crate::session::storage::FileStorage;
use crate::session::SessionStore;

/// Per-invocation wiring: durable session from the config directory, the
/// configured server and a client whose router gates every screen.
pub struct Context {
    pub client: WorkReportClient,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let storage = FileStorage::in_dir(&get_config_dir()?);
        let session = SessionStore::rehydrate(Arc::new(storage)).context("Failed to read stored session")?;
        let client = WorkReportClient::new(&client_config()?, Arc::new(session))?;

        Ok(Self { client })
    }

    /// Move to the screen a command stands for. A guard redirect means the
    /// command is not available in the current session state.
    pub fn enter(&self, path: &str) -> anyhow::Result<Navigation> {
        let navigation = self.client.router().push(path)?;
        let landed = navigation.path();

        if crate::router::routes::find(path).and_then(|r| r.redirect).unwrap_or(path) == landed {
            return Ok(navigation);
        }

        match landed {
            LOGIN_ROUTE => anyhow::bail!("Not logged in. Run 'wr auth login <username>' first"),
            CHANGE_PASSWORD_ROUTE => anyhow::bail!("Password change required. Run 'wr auth password' first"),
            _ if path == LOGIN_ROUTE => anyhow::bail!("Already logged in. Run 'wr auth logout' first"),
            _ => anyhow::bail!("Access to {} requires the admin role", path),
        }
    }
}
