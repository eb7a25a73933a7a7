//! The connection: one driver, one descriptor, one query on the wire at a time.

mod deferred;
mod dispatch;
mod response;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

pub use deferred::Deferred;

use crate::callbacks::Callbacks;
use crate::config::{ConnectionOptions, ValuesClauseMiss};
use crate::driver::{Connector, Driver};
use crate::error::SqlReactorError;
use crate::event_loop::EventLoop;
use crate::results::ResultRow;
use crate::types::{Descriptor, RowValues};

use dispatch::{Arguments, PendingQuery};
use response::ResponseContract;

/// Non-blocking handle over a synchronous driver.
///
/// Each dispatch method transmits its statement (or queues it behind the query already in
/// flight), registers a one-shot readiness callback with the event loop, and returns. The
/// result arrives later through the supplied [`Callbacks`].
///
/// ```rust
/// use sql_reactor::prelude::*;
/// use sql_reactor::test_utils::{ScriptedDriver, ScriptedResponse};
///
/// # fn main() -> Result<(), SqlReactorError> {
/// let (driver, script) = ScriptedDriver::new(Descriptor(7));
/// script.push_response(ScriptedResponse::rows(&["x"], vec![vec![RowValues::Int(1)]]));
///
/// let event_loop = ManualEventLoop::new();
/// let conn = Connection::new(driver, event_loop.clone());
/// conn.get("SELECT 1 AS x", &[], Callbacks::new(|row: Option<ResultRow>| {
///     assert_eq!(row.unwrap().get("x"), Some(&RowValues::Int(1)));
/// }))?;
///
/// event_loop.fire(Descriptor(7), Interest::Readable)?;
/// # Ok(()) }
/// ```
pub struct Connection<D: Driver + 'static> {
    inner: Rc<Inner<D>>,
}

impl<D: Driver + 'static> Clone for Connection<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

pub(crate) struct Inner<D: Driver + 'static> {
    state: RefCell<State<D>>,
    event_loop: Rc<dyn EventLoop>,
    values_clause_miss: Cell<ValuesClauseMiss>,
    next_query_id: Cell<u64>,
}

struct State<D> {
    driver: Option<D>,
    in_flight: Option<PendingQuery>,
    queue: VecDeque<PendingQuery>,
}

impl<D: Driver + 'static> Connection<D> {
    /// Wrap an already-open driver.
    pub fn new(driver: D, event_loop: impl EventLoop + 'static) -> Self {
        tracing::debug!(
            descriptor = %driver.descriptor(),
            charset = driver.character_set_name(),
            "connection opened"
        );
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    driver: Some(driver),
                    in_flight: None,
                    queue: VecDeque::new(),
                }),
                event_loop: Rc::new(event_loop),
                values_clause_miss: Cell::new(ValuesClauseMiss::default()),
                next_query_id: Cell::new(0),
            }),
        }
    }

    /// Open a driver through `connector` and wrap it.
    ///
    /// # Errors
    /// Returns whatever the connector reports when the session cannot be established.
    pub fn connect<C>(
        connector: &C,
        options: &ConnectionOptions,
        event_loop: impl EventLoop + 'static,
    ) -> Result<Self, SqlReactorError>
    where
        C: Connector<Driver = D>,
    {
        let driver = connector.connect(options)?;
        let conn = Self::new(driver, event_loop);
        conn.set_values_clause_miss(options.values_clause_miss);
        Ok(conn)
    }

    /// Choose what batched dispatches do when their statement has no `VALUES (...)` group.
    ///
    /// Applies to dispatches made after the call; queued statements are already rendered.
    pub fn set_values_clause_miss(&self, policy: ValuesClauseMiss) {
        self.inner.values_clause_miss.set(policy);
    }

    /// Returns the rows of `query`, in result order.
    ///
    /// # Errors
    /// Returns an error only when the dispatch failed synchronously and `callbacks` has no
    /// error handler to receive it.
    pub fn query(
        &self,
        query: &str,
        params: &[RowValues],
        callbacks: Callbacks<Vec<ResultRow>>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Single(params),
            ResponseContract::Collection(callbacks),
        )
    }

    /// Returns the single row of `query`, or `None`.
    ///
    /// More than one row is a [`SqlReactorError::MultipleRows`] failure.
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn get(
        &self,
        query: &str,
        params: &[RowValues],
        callbacks: Callbacks<Option<ResultRow>>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Single(params),
            ResponseContract::Item(callbacks),
        )
    }

    /// Alias of [`Connection::execute_lastrowid`].
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn execute(
        &self,
        query: &str,
        params: &[RowValues],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.execute_lastrowid(query, params, callbacks)
    }

    /// Executes `query`, returning the auto-generated id of the last inserted row.
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn execute_lastrowid(
        &self,
        query: &str,
        params: &[RowValues],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Single(params),
            ResponseContract::LastInsertId(callbacks),
        )
    }

    /// Executes `query`, returning the number of affected rows.
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn execute_rowcount(
        &self,
        query: &str,
        params: &[RowValues],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Single(params),
            ResponseContract::RowCount(callbacks),
        )
    }

    /// Alias of [`Connection::executemany_lastrowid`].
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn executemany(
        &self,
        query: &str,
        param_sets: &[Vec<RowValues>],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.executemany_lastrowid(query, param_sets, callbacks)
    }

    /// Expands the `VALUES (...)` group of `query` once per tuple and sends a single statement.
    /// Returns the last insert id reported for it.
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn executemany_lastrowid(
        &self,
        query: &str,
        param_sets: &[Vec<RowValues>],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Batch(param_sets),
            ResponseContract::LastInsertId(callbacks),
        )
    }

    /// Batched form of [`Connection::execute_rowcount`].
    ///
    /// # Errors
    /// Same as [`Connection::query`].
    pub fn executemany_rowcount(
        &self,
        query: &str,
        param_sets: &[Vec<RowValues>],
        callbacks: Callbacks<u64>,
    ) -> Result<(), SqlReactorError> {
        self.inner.dispatch(
            query,
            Arguments::Batch(param_sets),
            ResponseContract::RowCount(callbacks),
        )
    }

    /// Deregister from the event loop and close the transport.
    ///
    /// The query in flight and every queued query fail with
    /// [`SqlReactorError::ConnectionClosed`]. Calling `close` again does nothing.
    pub fn close(&self) {
        self.inner.close();
    }

    /// True once [`Connection::close`] ran (or the driver was otherwise released).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.borrow().driver.is_none()
    }

    /// Queries dispatched but not yet delivered (in flight plus queued).
    #[must_use]
    pub fn pending(&self) -> usize {
        let state = self.inner.state.borrow();
        usize::from(state.in_flight.is_some()) + state.queue.len()
    }

    /// Descriptor the event loop watches, or `None` after close.
    #[must_use]
    pub fn descriptor(&self) -> Option<Descriptor> {
        self.inner.state.borrow().driver.as_ref().map(Driver::descriptor)
    }

    /// Character set the driver negotiated, or `None` after close.
    #[must_use]
    pub fn character_set(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .driver
            .as_ref()
            .map(|driver| driver.character_set_name().to_string())
    }
}

impl<D: Driver + 'static> fmt::Debug for Connection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("descriptor", &self.descriptor())
            .field("pending", &self.pending())
            .finish()
    }
}

impl<D: Driver + 'static> Inner<D> {
    fn close(&self) {
        let (mut driver, in_flight, queued) = {
            let mut state = self.state.borrow_mut();
            let Some(driver) = state.driver.take() else {
                return;
            };
            (
                driver,
                state.in_flight.take(),
                std::mem::take(&mut state.queue),
            )
        };

        let descriptor = driver.descriptor();
        self.event_loop.remove_handler(descriptor);
        driver.close();
        tracing::debug!(%descriptor, "connection closed");

        for pending in in_flight.into_iter().chain(queued) {
            let query_id = pending.id;
            if let Err(err) = pending.contract.fail(SqlReactorError::ConnectionClosed) {
                tracing::warn!(query_id, error = %err, "query abandoned by close");
            }
        }
    }
}

impl<D: Driver + 'static> Drop for Inner<D> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.driver.is_some() {
            let abandoned = usize::from(state.in_flight.is_some()) + state.queue.len();
            tracing::debug!(abandoned, "connection dropped");
            self.close();
        }
    }
}
