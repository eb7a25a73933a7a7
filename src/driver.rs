//! Collaborator traits: the synchronous client library the dispatcher drives.
//!
//! The connection never subclasses a concrete client; it holds any value implementing
//! [`Driver`] and calls it at the two points where it touches the wire: transmitting a
//! statement, and draining the pending result once the descriptor becomes readable.

use crate::config::ConnectionOptions;
use crate::error::SqlReactorError;
use crate::literal;
use crate::types::{Descriptor, RowValues};

/// A live result-set cursor, consumed once.
pub trait ResultCursor {
    /// Column names in result order.
    fn describe(&self) -> Vec<String>;

    /// Next raw row, or `None` once the result is exhausted.
    ///
    /// # Errors
    /// Returns a driver error if the row cannot be read.
    fn fetch_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlReactorError>;
}

/// A synchronous client session the dispatcher drives without blocking.
///
/// The connection calls [`Driver::send_query`] when it dispatches a statement. Once the
/// event loop reports [`Driver::descriptor`] readable, it calls [`Driver::read_query_result`]
/// followed by either [`Driver::use_result`] or the counters ([`Driver::insert_id`],
/// [`Driver::affected_rows`]). Implementations are never called re-entrantly, and never
/// again after [`Driver::close`].
pub trait Driver {
    /// Transport handle the event loop watches.
    fn descriptor(&self) -> Descriptor;

    /// Character set negotiated for the session.
    fn character_set_name(&self) -> &str;

    /// Escape one value for inclusion in statement text.
    ///
    /// # Errors
    /// Returns `SqlReactorError::ParameterError` if the value cannot be represented.
    fn escape_literal(&self, value: &RowValues) -> Result<String, SqlReactorError> {
        literal::escape_literal(value)
    }

    /// Write a statement without waiting for its result.
    ///
    /// # Errors
    /// Returns a driver error if the statement could not be written.
    fn send_query(&mut self, statement: &str) -> Result<(), SqlReactorError>;

    /// Read the header of the pending result.
    ///
    /// # Errors
    /// Returns a driver error for transport failures or server-side statement errors.
    fn read_query_result(&mut self) -> Result<(), SqlReactorError>;

    /// Open a cursor over the rows of the result read by [`Driver::read_query_result`].
    ///
    /// # Errors
    /// Returns a driver error if the result carries no row data or cannot be opened.
    fn use_result(&mut self) -> Result<Box<dyn ResultCursor + '_>, SqlReactorError>;

    /// Auto-generated id of the most recent insert.
    fn insert_id(&self) -> u64;

    /// Rows affected by the most recent statement.
    fn affected_rows(&self) -> u64;

    /// Close the transport. Called at most once per driver.
    fn close(&mut self);
}

/// Opens drivers; owns the handshake the dispatcher never sees.
pub trait Connector {
    type Driver: Driver;

    /// # Errors
    /// Returns `SqlReactorError::ConnectionError` (or a driver error) if the session cannot be
    /// established.
    fn connect(&self, options: &ConnectionOptions) -> Result<Self::Driver, SqlReactorError>;
}
