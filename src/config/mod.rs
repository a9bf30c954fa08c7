//! Publisher settings, connection definitions and environment expansion.

mod connections;
mod env_vars;
mod settings;

pub use connections::ConnectionConfig;

pub use env_vars::{expand_env_vars, expand_with};

pub use settings::{load_or_default, PublisherSettings};
