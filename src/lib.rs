//! Non-blocking SQL dispatch for single-threaded reactor event loops.
//!
//! A [`Connection`] wraps a synchronous client library (a [`Driver`]) and an event loop
//! (an [`EventLoop`]). Dispatching a statement escapes its arguments, transmits it, and
//! registers a one-shot readiness callback on the driver's descriptor; control goes straight
//! back to the loop. When the descriptor turns readable the matching response handler drains
//! the result and hands it to the caller's [`Callbacks`]. Queries issued while another is in
//! flight wait in a per-connection FIFO queue.
//!
//! ```rust
//! use sql_reactor::prelude::*;
//! use sql_reactor::test_utils::{ScriptedDriver, ScriptedResponse};
//!
//! # fn main() -> Result<(), SqlReactorError> {
//! let (driver, script) = ScriptedDriver::new(Descriptor(3));
//! script.push_response(ScriptedResponse::affected(3, 41));
//!
//! let event_loop = ManualEventLoop::new();
//! let conn = Connection::new(driver, event_loop.clone());
//! conn.executemany(
//!     "INSERT INTO users (name, age) VALUES (%s, %s)",
//!     &[
//!         vec!["ann".into(), RowValues::Int(31)],
//!         vec!["bob".into(), RowValues::Int(42)],
//!         vec!["cy".into(), RowValues::Null],
//!     ],
//!     Callbacks::new(|last_id: u64| assert_eq!(last_id, 41)),
//! )?;
//! assert_eq!(
//!     script.transmitted(),
//!     vec!["INSERT INTO users (name, age) VALUES ('ann', 31), ('bob', 42), ('cy', NULL)"]
//! );
//!
//! event_loop.fire(Descriptor(3), Interest::Readable)?;
//! # Ok(()) }
//! ```

pub mod callbacks;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod event_loop;
pub mod literal;
pub mod prelude;
pub mod results;
pub mod rewrite;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use callbacks::Callbacks;
pub use config::{ConnectionOptions, ConnectionOptionsBuilder, Endpoint, ValuesClauseMiss};
pub use connection::{Connection, Deferred};
pub use driver::{Connector, Driver, ResultCursor};
pub use error::SqlReactorError;
pub use event_loop::{EventLoop, ManualEventLoop, ReadyHandler};
#[cfg(unix)]
pub use event_loop::TokioEventLoop;
pub use results::{ResultRow, ResultSet};
pub use types::{Descriptor, Interest, ResultShape, RowValues};
