//! Event-loop collaborator: "call me when this descriptor is ready".

mod manual;
#[cfg(unix)]
mod tokio_loop;

use std::rc::Rc;

pub use manual::ManualEventLoop;
#[cfg(unix)]
pub use tokio_loop::TokioEventLoop;

use crate::error::SqlReactorError;
use crate::types::{Descriptor, Interest};

/// Readiness callback. `Err` is a failure the dispatched query had no error handler for;
/// the loop decides how to report it.
pub type ReadyHandler = Box<dyn FnMut(Descriptor, Interest) -> Result<(), SqlReactorError>>;

pub trait EventLoop {
    /// Register `handler` for `interest` on `descriptor`, replacing any existing registration
    /// for that descriptor.
    ///
    /// # Errors
    /// Returns an error if the loop cannot watch the descriptor.
    fn add_handler(
        &self,
        descriptor: Descriptor,
        interest: Interest,
        handler: ReadyHandler,
    ) -> Result<(), SqlReactorError>;

    /// Drop the registration for `descriptor`; no-op when none exists.
    fn remove_handler(&self, descriptor: Descriptor);
}

impl<L: EventLoop + ?Sized> EventLoop for Rc<L> {
    fn add_handler(
        &self,
        descriptor: Descriptor,
        interest: Interest,
        handler: ReadyHandler,
    ) -> Result<(), SqlReactorError> {
        (**self).add_handler(descriptor, interest, handler)
    }

    fn remove_handler(&self, descriptor: Descriptor) {
        (**self).remove_handler(descriptor);
    }
}
