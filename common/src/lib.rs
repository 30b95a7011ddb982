pub mod config;
pub mod messages;
pub mod models;
pub mod utils;

pub use self::config::{AuthConfig, Config};
pub use self::messages::*;
pub use self::utils::*;
