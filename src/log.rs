//! Feature-gated debug logging.
//!
//! With the `tracing` feature on, `debug!` is the `tracing` macro; with it
//! off, the macro expands to nothing so the retreat loops carry no logging
//! cost in release use.

#[cfg(feature = "tracing")]
pub use tracing::debug;

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::debug;
