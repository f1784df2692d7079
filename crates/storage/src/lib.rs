//! Local storage for the rainfall pipeline.
//!
//! Provides:
//! - The on-disk layout under the data root ([`DataLayout`])
//! - Discovery of dated source files by filename pattern ([`discover`])

pub mod discovery;
pub mod error;
pub mod layout;

pub use discovery::{discover, discover_in_range, select_in_range};
pub use error::{StorageError, StorageResult};
pub use layout::DataLayout;
