//! Structured logging for mapper operations
//!
//! Binaries call `init` once with a [`Profile`]; libraries only emit events.
//! Each mapper operation is bracketed by [`log_op_start!`](crate::log_op_start)
//! and either [`log_op_end!`](crate::log_op_end) or
//! [`log_op_error!`](crate::log_op_error). Tests swap the subscriber for the
//! in-memory recorder returned by `init_test_capture`.
//!
//! ```rust
//! use dataaccess_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
