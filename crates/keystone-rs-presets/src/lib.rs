//! Ready-made schema contributors.
//!
//! Each preset returns a [`keystone_rs_core::Schema`] that is merged with the
//! project's own contributors before a pass. [`vite`] reads keys that
//! [`project`] declares, so the two are normally merged together.

pub mod project;
mod support;
pub mod vite;

pub use project::ProjectOptions;
pub use vite::ViteOptions;
