//! Future-returning forms of the dispatch methods.
//!
//! The statement is dispatched immediately, exactly like the callback forms; the returned
//! [`Deferred`] resolves once the readiness callback delivers. Awaiting still requires the
//! event loop to run, so with [`TokioEventLoop`](crate::event_loop::TokioEventLoop) the future
//! must be awaited inside the same `LocalSet`.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::Connection;
use crate::callbacks::Callbacks;
use crate::driver::Driver;
use crate::error::SqlReactorError;
use crate::results::ResultRow;
use crate::types::RowValues;

/// Result of a dispatch, resolved by the event loop.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Deferred<T> {
    rejected: Option<SqlReactorError>,
    receiver: oneshot::Receiver<Result<T, SqlReactorError>>,
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, SqlReactorError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(err) = this.rejected.take() {
            return Poll::Ready(Err(err));
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(SqlReactorError::ConnectionClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn bridge<T: 'static>() -> (Callbacks<T>, oneshot::Receiver<Result<T, SqlReactorError>>) {
    let (tx, rx) = oneshot::channel::<Result<T, SqlReactorError>>();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let tx_err = Rc::clone(&tx);
    let callbacks = Callbacks::new(move |value: T| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(Ok(value));
        }
    })
    .on_error(move |err: SqlReactorError| {
        if let Some(tx) = tx_err.borrow_mut().take() {
            let _ = tx.send(Err(err));
        }
    });
    (callbacks, rx)
}

fn deferred<T: 'static>(
    dispatch: impl FnOnce(Callbacks<T>) -> Result<(), SqlReactorError>,
) -> Deferred<T> {
    let (callbacks, receiver) = bridge();
    Deferred {
        rejected: dispatch(callbacks).err(),
        receiver,
    }
}

impl<D: Driver + 'static> Connection<D> {
    /// Future form of [`Connection::query`].
    pub fn query_async(&self, query: &str, params: &[RowValues]) -> Deferred<Vec<ResultRow>> {
        deferred(|callbacks| self.query(query, params, callbacks))
    }

    /// Future form of [`Connection::get`].
    pub fn get_async(&self, query: &str, params: &[RowValues]) -> Deferred<Option<ResultRow>> {
        deferred(|callbacks| self.get(query, params, callbacks))
    }

    /// Future form of [`Connection::execute`].
    pub fn execute_async(&self, query: &str, params: &[RowValues]) -> Deferred<u64> {
        deferred(|callbacks| self.execute(query, params, callbacks))
    }

    /// Future form of [`Connection::execute_lastrowid`].
    pub fn execute_lastrowid_async(&self, query: &str, params: &[RowValues]) -> Deferred<u64> {
        deferred(|callbacks| self.execute_lastrowid(query, params, callbacks))
    }

    /// Future form of [`Connection::execute_rowcount`].
    pub fn execute_rowcount_async(&self, query: &str, params: &[RowValues]) -> Deferred<u64> {
        deferred(|callbacks| self.execute_rowcount(query, params, callbacks))
    }

    /// Future form of [`Connection::executemany`].
    pub fn executemany_async(&self, query: &str, param_sets: &[Vec<RowValues>]) -> Deferred<u64> {
        deferred(|callbacks| self.executemany(query, param_sets, callbacks))
    }

    /// Future form of [`Connection::executemany_lastrowid`].
    pub fn executemany_lastrowid_async(
        &self,
        query: &str,
        param_sets: &[Vec<RowValues>],
    ) -> Deferred<u64> {
        deferred(|callbacks| self.executemany_lastrowid(query, param_sets, callbacks))
    }

    /// Future form of [`Connection::executemany_rowcount`].
    pub fn executemany_rowcount_async(
        &self,
        query: &str,
        param_sets: &[Vec<RowValues>],
    ) -> Deferred<u64> {
        deferred(|callbacks| self.executemany_rowcount(query, param_sets, callbacks))
    }
}
