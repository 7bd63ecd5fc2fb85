pub mod app;
pub mod calendar;
pub mod config;
pub mod dates;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{FileStorage, HistoryStore};
pub use tracker::Tracker;
