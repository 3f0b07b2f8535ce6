//! # playforge-error
//!
//! One error type shared by the playforge crates.
//!
//! - [`ErrorKind`] says what went wrong (`DispatchFailed`, `InferenceFailed`, ...)
//! - [`ErrorStatus`] says whether resubmitting can help
//! - the operation and context pairs say where, for logs
//! - the wrapped source keeps the underlying cause without exposing its type
//!
//! ```rust
//! use playforge_error::{Error, Result};
//!
//! fn pick(category: &str) -> Result<()> {
//!     Err(Error::dispatch_failed(category)
//!         .with_operation("generator::generate")
//!         .with_context("session_id", "s-1"))
//! }
//!
//! assert!(pick("math").is_err());
//! ```
//!
//! Foreign errors go in through `set_source` at the point they are handled;
//! there are no blanket `From` conversions.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

pub type Result<T> = std::result::Result<T, Error>;
