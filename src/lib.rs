//! # dataver
//!
//! Local versioning for CSV datasets: immutable numbered snapshots with
//! derived metadata, version comparison and rollback of the current-version
//! pointer.

pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod data;
pub mod error;
pub mod hash;
pub mod index;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod persist;
pub mod progress;
pub mod rollback;
pub mod store;
pub mod version;
pub mod workspace;

pub use compare::{ComparisonReport, VersionComparator};
pub use config::Config;
pub use error::{DataverError, Result};
pub use metadata::VersionMetadata;
pub use rollback::RollbackManager;
pub use store::VersionStore;
pub use version::VersionId;
pub use workspace::Workspace;

/// Number of data rows sampled for column type inference
pub const TYPE_INFERENCE_SAMPLE_ROWS: usize = 100;

/// Default number of rows included in comparison samples
pub const DEFAULT_SAMPLE_SIZE: usize = 5;
