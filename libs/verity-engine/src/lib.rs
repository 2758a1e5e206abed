//! Code execution and grading engine for coding challenges.
//!
//! Pipeline: [`sanitizer`] → [`marshal`] → [`executor`] (local or remote) →
//! [`evaluator`] → [`grader`].

pub mod error;
pub mod evaluator;
pub mod executor;
pub mod grader;
pub mod local;
pub mod marshal;
pub mod recorder;
pub mod remote;
pub mod sanitizer;

pub use error::{ExecutionError, GradingError, RecorderError, RemoteError, UnsafeSubmission};
pub use grader::Grader;
