//! Public surface for keystone.
//!
//! Re-exports the engine, the user config loader and the presets, and adds
//! the [`Keystone`] builder that wires them together for a single pass.

mod builder;
mod error;
mod overrides;

pub use builder::{Keystone, ResolvedConfig};
pub use error::KeystoneError;
pub use overrides::parse_assignments;

/// Re-export for convenience.
pub use keystone_rs_config as config;
pub use keystone_rs_core as core;
/// Re-export for convenience.
pub use keystone_rs_presets as presets;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
