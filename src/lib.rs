pub mod combine;
pub mod config;
pub mod error;
pub mod log;
pub mod watcher;

pub use combine::Combiner;
pub use config::Config;
pub use error::{Error, Result};
pub use log::Logger;
pub use watcher::Watcher;
