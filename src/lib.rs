pub mod cleanup;
pub mod commands;
pub mod link;
pub mod package;
pub mod resolver;
pub mod runtime;
pub mod settings;

pub use commands::{clean, link, relink};
pub use resolver::ResolutionError;
pub use settings::Settings;
