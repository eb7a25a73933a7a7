use std::rc::Rc;

use super::Inner;
use super::response::{ResponseContract, readiness_handler};
use crate::driver::Driver;
use crate::error::SqlReactorError;
use crate::rewrite::{render_batch, render_statement};
use crate::types::{Descriptor, Interest, RowValues};

pub(crate) enum Arguments<'a> {
    Single(&'a [RowValues]),
    Batch(&'a [Vec<RowValues>]),
}

/// A rewritten statement waiting for (or awaiting) its result.
pub(crate) struct PendingQuery {
    pub(crate) id: u64,
    pub(crate) statement: String,
    pub(crate) contract: ResponseContract,
}

impl<D: Driver + 'static> Inner<D> {
    pub(super) fn dispatch(
        self: &Rc<Self>,
        template: &str,
        args: Arguments<'_>,
        contract: ResponseContract,
    ) -> Result<(), SqlReactorError> {
        let rendered = {
            let state = self.state.borrow();
            match state.driver.as_ref() {
                None => Err(SqlReactorError::ConnectionClosed),
                Some(driver) => {
                    let escape = |value: &RowValues| driver.escape_literal(value);
                    match args {
                        Arguments::Single(params) => render_statement(template, params, escape),
                        Arguments::Batch(sets) => {
                            render_batch(template, sets, self.values_clause_miss.get(), escape)
                        }
                    }
                }
            }
        };
        let statement = match rendered {
            Ok(statement) => statement,
            Err(err) => {
                tracing::debug!(shape = ?contract.shape(), error = %err, "dispatch rejected");
                return contract.fail(err);
            }
        };

        let id = self.next_query_id.get();
        self.next_query_id.set(id + 1);
        let pending = PendingQuery {
            id,
            statement,
            contract,
        };

        let ready = {
            let mut state = self.state.borrow_mut();
            if state.in_flight.is_some() || !state.queue.is_empty() {
                tracing::debug!(
                    query_id = id,
                    shape = ?pending.contract.shape(),
                    queued = state.queue.len() + 1,
                    "query queued behind in-flight request"
                );
                state.queue.push_back(pending);
                None
            } else {
                Some(pending)
            }
        };

        match ready {
            Some(pending) => self.start(pending),
            None => Ok(()),
        }
    }

    /// Transmit `pending` and arm the readiness callback for it.
    fn start(self: &Rc<Self>, pending: PendingQuery) -> Result<(), SqlReactorError> {
        let sent = {
            let mut state = self.state.borrow_mut();
            match state.driver.as_mut() {
                None => Err(SqlReactorError::ConnectionClosed),
                Some(driver) => driver
                    .send_query(&pending.statement)
                    .map(|()| driver.descriptor()),
            }
        };
        let descriptor = match sent {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::debug!(query_id = pending.id, error = %err, "transmit failed");
                return pending.contract.fail(err);
            }
        };
        tracing::trace!(
            query_id = pending.id,
            statement = %pending.statement,
            %descriptor,
            "statement sent"
        );

        self.state.borrow_mut().in_flight = Some(pending);
        let handler = readiness_handler(Rc::downgrade(self));
        if let Err(err) = self
            .event_loop
            .add_handler(descriptor, Interest::Readable, handler)
        {
            let pending = self.state.borrow_mut().in_flight.take();
            return match pending {
                Some(pending) => pending.contract.fail(err),
                None => Err(err),
            };
        }
        Ok(())
    }

    /// Readiness on the descriptor: finish the query in flight, then start the next one.
    pub(super) fn on_readable(
        self: &Rc<Self>,
        descriptor: Descriptor,
    ) -> Result<(), SqlReactorError> {
        let resolved = {
            let mut state = self.state.borrow_mut();
            let Some(pending) = state.in_flight.take() else {
                tracing::trace!(%descriptor, "readiness with nothing in flight");
                return Ok(());
            };
            let id = pending.id;
            match state.driver.as_mut() {
                Some(driver) => Ok((id, pending.contract.resolve(driver))),
                None => Err(pending),
            }
        };
        self.event_loop.remove_handler(descriptor);

        let mut unhandled = None;
        match resolved {
            Ok((query_id, settlement)) => {
                tracing::debug!(query_id, ok = settlement.succeeded(), "query settled");
                if let Err(err) = settlement.deliver() {
                    keep_first(&mut unhandled, err);
                }
            }
            Err(pending) => {
                if let Err(err) = pending.contract.fail(SqlReactorError::ConnectionClosed) {
                    keep_first(&mut unhandled, err);
                }
            }
        }

        if let Err(err) = self.pump() {
            keep_first(&mut unhandled, err);
        }
        unhandled.map_or(Ok(()), Err)
    }

    /// Start queued queries until one is in flight or the queue is empty.
    fn pump(self: &Rc<Self>) -> Result<(), SqlReactorError> {
        let mut unhandled = None;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                if state.in_flight.is_some() {
                    break;
                }
                state.queue.pop_front()
            };
            let Some(pending) = next else {
                break;
            };
            if let Err(err) = self.start(pending) {
                keep_first(&mut unhandled, err);
            }
        }
        unhandled.map_or(Ok(()), Err)
    }
}

fn keep_first(slot: &mut Option<SqlReactorError>, err: SqlReactorError) {
    if slot.is_some() {
        tracing::error!(error = %err, "additional unhandled query failure");
    } else {
        *slot = Some(err);
    }
}
