pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod router;
pub mod session;
pub mod stores;
pub mod types;

pub use client::WorkReportClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use session::SessionStore;
