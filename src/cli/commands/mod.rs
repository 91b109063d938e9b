pub mod auth;
pub mod daily;
pub mod project;
pub mod report;
pub mod route;
pub mod server;
pub mod summary;
pub mod task;
pub mod user;
