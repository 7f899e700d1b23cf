// Admin is responsible for the parts of the system that sit around the
// directory rather than in it: where the config comes from and where the
// logs go.

mod config;
mod logging;


pub use config::{Config, CONFIG_ENV, CONFIG_FILE_NAME};
pub use logging::{init_logging, LOG_ENV};
