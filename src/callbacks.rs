use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::SqlReactorError;

pub type SuccessCallback<T> = Box<dyn FnOnce(T)>;
pub type ErrorCallback = Box<dyn FnOnce(SqlReactorError)>;

/// The two handler slots a dispatch accepts.
///
/// Exactly one of them runs per dispatch. A dispatch without `on_error` hands its failure back
/// to whoever drives the readiness callback (the event loop) instead.
///
/// ```rust
/// use sql_reactor::prelude::*;
///
/// let callbacks = Callbacks::new(|rows: Vec<ResultRow>| println!("{} rows", rows.len()))
///     .on_error(|err| eprintln!("query failed: {err}"));
/// # let _ = callbacks;
/// ```
pub struct Callbacks<T> {
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> Callbacks<T> {
    /// Handlers with only a success slot; failures go to the event loop.
    #[must_use]
    pub fn new(on_success: impl FnOnce(T) + 'static) -> Self {
        Self {
            on_success: Some(Box::new(on_success)),
            on_error: None,
        }
    }

    /// No handlers: the value is discarded, failures surface to the event loop.
    #[must_use]
    pub fn none() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }

    /// Replace the success handler.
    #[must_use]
    pub fn on_success(mut self, on_success: impl FnOnce(T) + 'static) -> Self {
        self.on_success = Some(Box::new(on_success));
        self
    }

    /// Set the handler that receives every failure of this dispatch.
    #[must_use]
    pub fn on_error(mut self, on_error: impl FnOnce(SqlReactorError) + 'static) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// True when failures will reach an error handler rather than the event loop.
    #[must_use]
    pub fn has_error_handler(&self) -> bool {
        self.on_error.is_some()
    }

    /// Route an outcome to the matching slot.
    ///
    /// Returns `Err` when the outcome was a failure nobody handled, or when the chosen
    /// callback panicked.
    pub(crate) fn settle(self, outcome: Result<T, SqlReactorError>) -> Result<(), SqlReactorError> {
        match outcome {
            Ok(value) => match self.on_success {
                Some(on_success) => guarded(move || on_success(value)),
                None => Ok(()),
            },
            Err(err) => self.fail(err),
        }
    }

    pub(crate) fn fail(self, err: SqlReactorError) -> Result<(), SqlReactorError> {
        match self.on_error {
            Some(on_error) => guarded(move || on_error(err)),
            None => Err(err),
        }
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

fn guarded(f: impl FnOnce()) -> Result<(), SqlReactorError> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| SqlReactorError::CallbackFailed(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "callback panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn success_runs_only_success() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (a, b) = (Rc::clone(&seen), Rc::clone(&seen));
        let cb = Callbacks::new(move |v: u64| a.borrow_mut().push(format!("ok {v}")))
            .on_error(move |e| b.borrow_mut().push(format!("err {e}")));
        assert!(cb.settle(Ok(3)).is_ok());
        assert_eq!(*seen.borrow(), vec!["ok 3".to_string()]);
    }

    #[test]
    fn unhandled_failure_is_returned() {
        let cb: Callbacks<u64> = Callbacks::new(|_| panic!("must not run"));
        let err = cb.settle(Err(SqlReactorError::ConnectionClosed)).unwrap_err();
        assert!(matches!(err, SqlReactorError::ConnectionClosed));
    }

    #[test]
    fn panicking_success_is_not_rerouted() {
        let hit = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&hit);
        let cb = Callbacks::new(|_: u64| panic!("boom")).on_error(move |_| *flag.borrow_mut() = true);
        let err = cb.settle(Ok(1)).unwrap_err();
        assert!(matches!(err, SqlReactorError::CallbackFailed(ref m) if m == "boom"));
        assert!(!*hit.borrow());
    }
}
