pub mod cli;
pub mod commands;
pub mod config;
pub mod router;
pub mod state;
pub mod toast;

pub use config::AppConfig;
pub use router::{Route, RouteGuard, Router};
pub use state::AppState;
pub use toast::TerminalToaster;
