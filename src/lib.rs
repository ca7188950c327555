pub mod config;
pub mod context;
pub mod directive;
pub mod env;
pub mod error;
pub mod logging;
pub mod providers;
pub mod tasks;
pub mod version;

pub use context::BuildContext;
pub use error::{CiVersionError, Result};
pub use version::VersionResult;
