pub mod client;
pub mod error;
pub mod types;

pub use client::{JobSubmitter, StatusChecker, TranscriptionClient};
pub use error::TranscriptionError;
pub use types::{JobStatus, StatusReport};
