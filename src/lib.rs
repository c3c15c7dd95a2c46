pub mod api;
pub mod app;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod view;

pub use app::router;
pub use config::Config;
pub use coordinator::{Channel, Coordinator};
pub use state::AppState;
