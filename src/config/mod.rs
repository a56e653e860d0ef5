//! Configuration and CLI handling

pub mod cli;
pub mod profile;
pub mod settings;

pub use cli::Cli;
pub use profile::MirrorProfile;
pub use settings::Settings;
