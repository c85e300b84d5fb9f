//! Core types shared by the tidal engine and the workloads it drives.
//!
//! Nothing in here touches a runtime: activity profiles are pure functions of
//! wall-clock time, and the stats types are plain snapshots.
mod config;
mod constants;
mod error;
pub mod profile;
mod query;
pub mod size_budget;
mod stats;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use profile::{ActivityProfile, Profile, PROFILE_NAMES};
pub use query::*;
pub use stats::*;
