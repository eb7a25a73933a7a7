use std::time::Duration;

use crate::error::SqlReactorError;
use crate::literal::quote_string;

pub const DEFAULT_PORT: u16 = 3306;

/// What a batched dispatch does when its statement has no `VALUES (...)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuesClauseMiss {
    /// Transmit the statement as written; the argument tuples are not applied.
    #[default]
    SendUnmodified,
    /// Fail the dispatch with a parameter error.
    Reject,
}

/// Where the connector should reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp { host: String, port: u16 },
    UnixSocket(String),
}

/// Options for opening a connection.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// `host`, `host:port`, or a UNIX socket path (anything containing `/`).
    pub host: String,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub charset: String,
    /// Applied with `SET time_zone` right after connecting.
    pub time_zone: String,
    /// Applied with `SET SESSION sql_mode` when present.
    pub sql_mode: Option<String>,
    /// Handshake timeout handed to the connector; `None` uses the client default.
    pub connect_timeout: Option<Duration>,
    pub values_clause_miss: ValuesClauseMiss,
}

impl ConnectionOptions {
    /// Options with the session defaults: `utf8`, time zone `+0:00`, `TRADITIONAL` sql_mode.
    #[must_use]
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            user: None,
            password: None,
            charset: "utf8".to_string(),
            time_zone: "+0:00".to_string(),
            sql_mode: Some("TRADITIONAL".to_string()),
            connect_timeout: None,
            values_clause_miss: ValuesClauseMiss::default(),
        }
    }

    /// Start a fluent builder.
    #[must_use]
    pub fn builder(
        host: impl Into<String>,
        database: impl Into<String>,
    ) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::new(host, database)
    }

    /// Resolve `host` into a TCP address or socket path.
    ///
    /// # Errors
    /// Returns `SqlReactorError::ConfigError` if the host is empty or the port does not parse.
    pub fn endpoint(&self) -> Result<Endpoint, SqlReactorError> {
        if self.host.contains('/') {
            return Ok(Endpoint::UnixSocket(self.host.clone()));
        }
        let (host, port) = match self.host.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|e| {
                    SqlReactorError::ConfigError(format!("invalid port in host '{}': {e}", self.host))
                })?;
                (host, port)
            }
            None => (self.host.as_str(), DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(SqlReactorError::ConfigError("host must not be empty".to_string()));
        }
        Ok(Endpoint::Tcp {
            host: host.to_string(),
            port,
        })
    }

    /// Session statements a connector runs right after the handshake.
    #[must_use]
    pub fn init_commands(&self) -> Vec<String> {
        let mut commands = vec![format!("SET time_zone = {}", quote_string(&self.time_zone))];
        if let Some(mode) = &self.sql_mode {
            commands.push(format!("SET SESSION sql_mode = {}", quote_string(mode)));
        }
        commands
    }
}

/// Fluent builder for [`ConnectionOptions`].
#[derive(Debug, Clone)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            opts: ConnectionOptions::new(host, database),
        }
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = charset.into();
        self
    }

    #[must_use]
    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.opts.time_zone = time_zone.into();
        self
    }

    /// `None` leaves the server's sql_mode alone.
    #[must_use]
    pub fn sql_mode(mut self, sql_mode: Option<String>) -> Self {
        self.opts.sql_mode = sql_mode;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.opts.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn values_clause_miss(mut self, policy: ValuesClauseMiss) -> Self {
        self.opts.values_clause_miss = policy;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }
}
