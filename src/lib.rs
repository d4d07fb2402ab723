pub mod app;
pub mod calendar;
pub mod config;
pub mod controller;
pub mod detail;
pub mod errors;
pub mod handlers;
pub mod lunar;
pub mod models;
pub mod names;
pub mod state;
pub mod storage;
pub mod surface;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_cache;
