use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::ConnectionOptions;
use crate::driver::{Connector, Driver, ResultCursor};
use crate::error::SqlReactorError;
use crate::types::{Descriptor, RowValues};

/// What the fake server answers to the next statement.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<RowValues>>,
    },
    Affected {
        rows: u64,
        insert_id: u64,
    },
    Error(String),
}

impl ScriptedResponse {
    #[must_use]
    pub fn rows(columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        ScriptedResponse::Rows {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        }
    }

    #[must_use]
    pub fn affected(rows: u64, insert_id: u64) -> Self {
        ScriptedResponse::Affected { rows, insert_id }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        ScriptedResponse::Error(message.into())
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<ScriptedResponse>,
    current: Option<ScriptedResponse>,
    transmitted: Vec<String>,
    init_commands: Vec<String>,
    fail_next_send: Option<String>,
    result_reads: usize,
    close_calls: usize,
}

/// Test-side view of a [`ScriptedDriver`]: queue answers, inspect what was sent.
#[derive(Clone)]
pub struct ScriptHandle {
    script: Rc<RefCell<Script>>,
}

impl ScriptHandle {
    pub fn push_response(&self, response: ScriptedResponse) {
        self.script.borrow_mut().responses.push_back(response);
    }

    /// Make the next `send_query` fail with a driver error.
    pub fn fail_next_send(&self, message: impl Into<String>) {
        self.script.borrow_mut().fail_next_send = Some(message.into());
    }

    #[must_use]
    pub fn transmitted(&self) -> Vec<String> {
        self.script.borrow().transmitted.clone()
    }

    #[must_use]
    pub fn init_commands(&self) -> Vec<String> {
        self.script.borrow().init_commands.clone()
    }

    #[must_use]
    pub fn result_reads(&self) -> usize {
        self.script.borrow().result_reads
    }

    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.script.borrow().close_calls
    }
}

/// [`Driver`] that answers from a script instead of a socket.
pub struct ScriptedDriver {
    descriptor: Descriptor,
    charset: String,
    script: Rc<RefCell<Script>>,
}

impl ScriptedDriver {
    #[must_use]
    pub fn new(descriptor: Descriptor) -> (Self, ScriptHandle) {
        let script = Rc::new(RefCell::new(Script::default()));
        (
            Self {
                descriptor,
                charset: "utf8".to_string(),
                script: Rc::clone(&script),
            },
            ScriptHandle { script },
        )
    }
}

impl Driver for ScriptedDriver {
    fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    fn character_set_name(&self) -> &str {
        &self.charset
    }

    fn send_query(&mut self, statement: &str) -> Result<(), SqlReactorError> {
        let mut script = self.script.borrow_mut();
        if script.close_calls > 0 {
            return Err(SqlReactorError::DriverError("server has gone away".into()));
        }
        if let Some(message) = script.fail_next_send.take() {
            return Err(SqlReactorError::DriverError(message));
        }
        script.transmitted.push(statement.to_string());
        Ok(())
    }

    fn read_query_result(&mut self) -> Result<(), SqlReactorError> {
        let mut script = self.script.borrow_mut();
        script.result_reads += 1;
        match script.responses.pop_front() {
            Some(ScriptedResponse::Error(message)) => Err(SqlReactorError::DriverError(message)),
            Some(response) => {
                script.current = Some(response);
                Ok(())
            }
            None => Err(SqlReactorError::DriverError(
                "no result pending on connection".into(),
            )),
        }
    }

    fn use_result(&mut self) -> Result<Box<dyn ResultCursor + '_>, SqlReactorError> {
        match self.script.borrow_mut().current.take() {
            Some(ScriptedResponse::Rows { columns, rows }) => Ok(Box::new(ScriptedCursor {
                columns,
                rows: rows.into(),
            })),
            _ => Err(SqlReactorError::DriverError(
                "statement did not return a result set".into(),
            )),
        }
    }

    fn insert_id(&self) -> u64 {
        match self.script.borrow().current {
            Some(ScriptedResponse::Affected { insert_id, .. }) => insert_id,
            _ => 0,
        }
    }

    fn affected_rows(&self) -> u64 {
        match &self.script.borrow().current {
            Some(ScriptedResponse::Affected { rows, .. }) => *rows,
            Some(ScriptedResponse::Rows { rows, .. }) => rows.len() as u64,
            _ => 0,
        }
    }

    fn close(&mut self) {
        self.script.borrow_mut().close_calls += 1;
    }
}

struct ScriptedCursor {
    columns: Vec<String>,
    rows: VecDeque<Vec<RowValues>>,
}

impl ResultCursor for ScriptedCursor {
    fn describe(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn fetch_row(&mut self) -> Result<Option<Vec<RowValues>>, SqlReactorError> {
        Ok(self.rows.pop_front())
    }
}

/// [`Connector`] handing out a [`ScriptedDriver`] that shares one script.
pub struct ScriptedConnector {
    descriptor: Descriptor,
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnector {
    #[must_use]
    pub fn new(descriptor: Descriptor) -> (Self, ScriptHandle) {
        let script = Rc::new(RefCell::new(Script::default()));
        (
            Self {
                descriptor,
                script: Rc::clone(&script),
            },
            ScriptHandle { script },
        )
    }
}

impl Connector for ScriptedConnector {
    type Driver = ScriptedDriver;

    fn connect(&self, options: &ConnectionOptions) -> Result<ScriptedDriver, SqlReactorError> {
        options.endpoint()?;
        self.script
            .borrow_mut()
            .init_commands
            .extend(options.init_commands());
        Ok(ScriptedDriver {
            descriptor: self.descriptor,
            charset: options.charset.clone(),
            script: Rc::clone(&self.script),
        })
    }
}
