pub mod app;
pub mod backend;
pub mod compose;
pub mod config;
pub mod errors;
pub mod format;
pub mod handlers;
pub mod models;
pub mod sequence;
pub mod session;
pub mod state;
pub mod stats;
pub mod tags;
pub mod ui;

pub use app::router;
pub use backend::BackendClient;
pub use config::Config;
pub use state::AppState;
