pub mod config;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod output;
pub mod scale;
pub mod state;
pub mod time_filter;
pub mod traffic;
