pub mod app;
pub mod codec;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod library;
pub mod models;
pub mod records;
pub mod scheduler;
pub mod state;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tap;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
