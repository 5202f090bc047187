pub mod app;
pub mod config;
pub mod dispatch;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod ratings;
pub mod session;
