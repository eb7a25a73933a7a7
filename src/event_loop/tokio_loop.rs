use std::cell::RefCell;
use std::collections::HashMap;
use std::future::poll_fn;
use std::os::fd::{AsRawFd, RawFd};
use std::rc::{Rc, Weak};
use std::task::Poll;

use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{EventLoop, ReadyHandler};
use crate::error::SqlReactorError;
use crate::types::{Descriptor, Interest};

/// Borrowed view of a descriptor owned by the driver.
struct RawDescriptor(RawFd);

impl AsRawFd for RawDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

struct Watch {
    generation: u64,
    interest: Interest,
    source: AsyncFd<RawDescriptor>,
    handler: Rc<RefCell<ReadyHandler>>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Watches {
    by_descriptor: HashMap<Descriptor, Watch>,
    next_generation: u64,
}

/// [`EventLoop`] backed by tokio's reactor.
///
/// Every registration spawns a local task, so the loop must be used from inside a
/// [`tokio::task::LocalSet`]. Handler failures are logged and forwarded on the channel
/// returned by [`TokioEventLoop::new`].
#[derive(Clone)]
pub struct TokioEventLoop {
    watches: Rc<RefCell<Watches>>,
    errors: mpsc::UnboundedSender<SqlReactorError>,
}

impl TokioEventLoop {
    /// Create the loop and the receiving end of its failure channel.
    ///
    /// # Returns
    ///
    /// The loop, plus a receiver yielding every failure a dispatch had no error handler for
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SqlReactorError>) {
        let (errors, receiver) = mpsc::unbounded_channel();
        (
            Self {
                watches: Rc::new(RefCell::new(Watches::default())),
                errors,
            },
            receiver,
        )
    }
}

impl EventLoop for TokioEventLoop {
    fn add_handler(
        &self,
        descriptor: Descriptor,
        interest: Interest,
        handler: ReadyHandler,
    ) -> Result<(), SqlReactorError> {
        // the reactor refuses a descriptor that is still registered
        self.remove_handler(descriptor);

        let tokio_interest = match interest {
            Interest::Readable => tokio::io::Interest::READABLE,
            Interest::Writable => tokio::io::Interest::WRITABLE,
        };
        let source = AsyncFd::with_interest(RawDescriptor(descriptor.0), tokio_interest)?;

        let generation = {
            let mut watches = self.watches.borrow_mut();
            watches.next_generation += 1;
            watches.next_generation
        };
        let task = tokio::task::spawn_local(watch(
            Rc::downgrade(&self.watches),
            self.errors.clone(),
            descriptor,
            generation,
        ));

        self.watches.borrow_mut().by_descriptor.insert(
            descriptor,
            Watch {
                generation,
                interest,
                source,
                handler: Rc::new(RefCell::new(handler)),
                task,
            },
        );
        tracing::trace!(%descriptor, ?interest, generation, "watching descriptor");
        Ok(())
    }

    fn remove_handler(&self, descriptor: Descriptor) {
        let removed = self.watches.borrow_mut().by_descriptor.remove(&descriptor);
        if let Some(watch) = removed {
            watch.task.abort();
            tracing::trace!(%descriptor, generation = watch.generation, "stopped watching descriptor");
        }
    }
}

async fn watch(
    watches: Weak<RefCell<Watches>>,
    errors: mpsc::UnboundedSender<SqlReactorError>,
    descriptor: Descriptor,
    generation: u64,
) {
    loop {
        let ready = poll_fn(|cx| {
            let Some(watches) = watches.upgrade() else {
                return Poll::Ready(None);
            };
            let watches = watches.borrow();
            let Some(watch) = watches
                .by_descriptor
                .get(&descriptor)
                .filter(|w| w.generation == generation)
            else {
                return Poll::Ready(None);
            };
            let polled = match watch.interest {
                Interest::Readable => watch.source.poll_read_ready(cx),
                Interest::Writable => watch.source.poll_write_ready(cx),
            };
            match polled {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Ok(mut guard)) => {
                    guard.clear_ready();
                    Poll::Ready(Some(Ok((watch.interest, Rc::clone(&watch.handler)))))
                }
                Poll::Ready(Err(err)) => Poll::Ready(Some(Err(err))),
            }
        })
        .await;

        match ready {
            None => return,
            Some(Err(err)) => {
                tracing::error!(%descriptor, error = %err, "readiness polling failed");
                let _ = errors.send(SqlReactorError::Io(err));
                return;
            }
            Some(Ok((interest, handler))) => {
                let outcome = {
                    let mut handler = handler.borrow_mut();
                    (*handler)(descriptor, interest)
                };
                if let Err(err) = outcome {
                    tracing::error!(%descriptor, error = %err, "unhandled query failure");
                    let _ = errors.send(err);
                }
            }
        }
    }
}
