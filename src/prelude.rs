//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::callbacks::Callbacks;
pub use crate::config::{ConnectionOptions, ConnectionOptionsBuilder, Endpoint, ValuesClauseMiss};
pub use crate::connection::{Connection, Deferred};
pub use crate::driver::{Connector, Driver, ResultCursor};
pub use crate::error::SqlReactorError;
pub use crate::event_loop::{EventLoop, ManualEventLoop};
pub use crate::results::{ResultRow, ResultSet};
pub use crate::types::{Descriptor, Interest, ResultShape, RowValues};

#[cfg(unix)]
pub use crate::event_loop::TokioEventLoop;
