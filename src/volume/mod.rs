//! Split-volume output.
//!
//! A split archive is written as numbered volume files no larger than a
//! configured split length. Completed volumes take the suffixes `.z01`,
//! `.z02`, ... while the volume currently being written always lives at
//! the archive's final path, so the last volume keeps the `.zip` name.

mod config;
mod writer;

pub use config::SplitConfig;
pub use writer::SplitWriter;

/// Smallest accepted split length, in bytes.
///
/// Requesting a smaller split length fails with
/// [`Error::SplitSizeTooSmall`](crate::Error::SplitSizeTooSmall) before
/// any output file is created.
pub const MIN_SPLIT_LENGTH: u64 = 65_536;
