use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{EventLoop, ReadyHandler};
use crate::error::SqlReactorError;
use crate::types::{Descriptor, Interest};

struct Registration {
    interest: Interest,
    handler: Rc<RefCell<ReadyHandler>>,
}

/// Event loop driven by the host: readiness is whatever the host says it is.
///
/// Clones share the same registrations, so a host can hand one clone to a connection and
/// keep another to call [`ManualEventLoop::fire`] from its own poll loop (or from tests).
#[derive(Clone, Default)]
pub struct ManualEventLoop {
    registrations: Rc<RefCell<HashMap<Descriptor, Registration>>>,
}

impl ManualEventLoop {
    /// Create a loop with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `interest` readiness on `descriptor` and run the registered handler, if any.
    ///
    /// # Errors
    /// Returns whatever the handler returned: a failure no error callback received.
    pub fn fire(&self, descriptor: Descriptor, interest: Interest) -> Result<(), SqlReactorError> {
        let handler = {
            let registrations = self.registrations.borrow();
            match registrations.get(&descriptor) {
                Some(reg) if reg.interest == interest => Rc::clone(&reg.handler),
                _ => {
                    tracing::trace!(%descriptor, ?interest, "readiness with no matching handler");
                    return Ok(());
                }
            }
        };
        let mut handler = handler.borrow_mut();
        (*handler)(descriptor, interest)
    }

    /// True while a handler is registered for `descriptor`.
    #[must_use]
    pub fn is_registered(&self, descriptor: Descriptor) -> bool {
        self.registrations.borrow().contains_key(&descriptor)
    }

    /// Number of descriptors with a registered handler.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registrations.borrow().len()
    }
}

impl EventLoop for ManualEventLoop {
    fn add_handler(
        &self,
        descriptor: Descriptor,
        interest: Interest,
        handler: ReadyHandler,
    ) -> Result<(), SqlReactorError> {
        let previous = self.registrations.borrow_mut().insert(
            descriptor,
            Registration {
                interest,
                handler: Rc::new(RefCell::new(handler)),
            },
        );
        if previous.is_some() {
            tracing::debug!(%descriptor, "replaced existing readiness handler");
        }
        Ok(())
    }

    fn remove_handler(&self, descriptor: Descriptor) {
        let removed = self.registrations.borrow_mut().remove(&descriptor);
        drop(removed);
    }
}
