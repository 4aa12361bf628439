//! Test helpers shared across Keystone crates.

pub mod resolvers;
pub mod schemas;

pub use resolvers::{
    CountingResolver, DelayedResolver, EventLog, FailingResolver, RecordingResolver,
};
pub use schemas::{arithmetic_schema, base_schema};
