//! Response handlers: drain one pending result and route it to the caller.

use std::rc::Weak;

use super::Inner;
use crate::callbacks::Callbacks;
use crate::driver::Driver;
use crate::error::SqlReactorError;
use crate::event_loop::ReadyHandler;
use crate::results::{ResultRow, materialize_rows};
use crate::types::ResultShape;

/// Expected result shape plus the caller's handlers for one dispatch.
pub(crate) enum ResponseContract {
    Item(Callbacks<Option<ResultRow>>),
    Collection(Callbacks<Vec<ResultRow>>),
    LastInsertId(Callbacks<u64>),
    RowCount(Callbacks<u64>),
}

impl ResponseContract {
    pub(crate) fn shape(&self) -> ResultShape {
        match self {
            ResponseContract::Item(_) => ResultShape::Item,
            ResponseContract::Collection(_) => ResultShape::Collection,
            ResponseContract::LastInsertId(_) => ResultShape::LastInsertId,
            ResponseContract::RowCount(_) => ResultShape::RowCount,
        }
    }

    /// Read the pending result through `driver` and interpret it for this shape.
    ///
    /// Nothing is delivered yet; the returned [`Settlement`] runs the callback once the
    /// caller no longer holds connection state.
    pub(crate) fn resolve<D: Driver + ?Sized>(self, driver: &mut D) -> Settlement {
        match self {
            ResponseContract::Item(callbacks) => Settlement::new(callbacks, drain_item(driver)),
            ResponseContract::Collection(callbacks) => {
                Settlement::new(callbacks, drain_rows(driver))
            }
            ResponseContract::LastInsertId(callbacks) => Settlement::new(
                callbacks,
                driver.read_query_result().map(|()| driver.insert_id()),
            ),
            ResponseContract::RowCount(callbacks) => Settlement::new(
                callbacks,
                driver.read_query_result().map(|()| driver.affected_rows()),
            ),
        }
    }

    pub(crate) fn fail(self, err: SqlReactorError) -> Result<(), SqlReactorError> {
        match self {
            ResponseContract::Item(callbacks) => callbacks.fail(err),
            ResponseContract::Collection(callbacks) => callbacks.fail(err),
            ResponseContract::LastInsertId(callbacks) => callbacks.fail(err),
            ResponseContract::RowCount(callbacks) => callbacks.fail(err),
        }
    }
}

/// An interpreted outcome bound to the callback that will receive it.
pub(crate) struct Settlement {
    succeeded: bool,
    deliver: Box<dyn FnOnce() -> Result<(), SqlReactorError>>,
}

impl Settlement {
    fn new<T: 'static>(callbacks: Callbacks<T>, outcome: Result<T, SqlReactorError>) -> Self {
        Self {
            succeeded: outcome.is_ok(),
            deliver: Box::new(move || callbacks.settle(outcome)),
        }
    }

    pub(crate) fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub(crate) fn deliver(self) -> Result<(), SqlReactorError> {
        (self.deliver)()
    }
}

fn drain_rows<D: Driver + ?Sized>(driver: &mut D) -> Result<Vec<ResultRow>, SqlReactorError> {
    driver.read_query_result()?;
    let mut cursor = driver.use_result()?;
    Ok(materialize_rows(cursor.as_mut())?.into_rows())
}

fn drain_item<D: Driver + ?Sized>(driver: &mut D) -> Result<Option<ResultRow>, SqlReactorError> {
    let mut rows = drain_rows(driver)?;
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        count => Err(SqlReactorError::MultipleRows { count }),
    }
}

/// One-shot readiness callback for whatever query is in flight on `conn`.
pub(super) fn readiness_handler<D: Driver + 'static>(conn: Weak<Inner<D>>) -> ReadyHandler {
    Box::new(move |descriptor, _interest| match conn.upgrade() {
        Some(inner) => inner.on_readable(descriptor),
        None => Ok(()),
    })
}
