//! Facade and connection configuration.

use crate::error::{OrmError, OrmResult};
use crate::reconcile::TableDefaults;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Configuration for [`crate::Orm`].
#[derive(Debug, Clone)]
pub struct OrmConfig {
    /// Reconcile a table's schema before the first write to it.
    pub auto_create_table: bool,
    /// Delay between keep-alive polls.
    pub keep_alive_interval: Duration,
    /// Engine and charset for CREATE TABLE when the entity names none.
    pub table_defaults: TableDefaults,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            auto_create_table: false,
            keep_alive_interval: Duration::from_secs(10),
            table_defaults: TableDefaults::default(),
            max_sql_log_length: Some(200),
        }
    }
}

impl OrmConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable automatic table reconciliation.
    pub fn auto_create_table(mut self, enabled: bool) -> Self {
        self.auto_create_table = enabled;
        self
    }

    /// Set the keep-alive poll interval.
    pub fn keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set the default table engine.
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.table_defaults.engine = engine.into();
        self
    }

    /// Set the default table charset.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.table_defaults.charset = charset.into();
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_log_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

/// MySQL connection parameters.
///
/// ```toml
/// host = "db.internal"
/// user = "app"
/// password = "secret"
/// database = "shop"
///
/// [params]
/// timezone = "+00:00"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectParams {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    /// Extra query parameters; merged over `charset=utf8mb4` and
    /// `parseTime=true`.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            params: BTreeMap::new(),
        }
    }
}

impl ConnectParams {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parse parameters from TOML text.
    pub fn from_toml_str(raw: &str) -> OrmResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Query parameters in effect, defaults included.
    pub fn effective_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::from([
            ("charset".to_string(), "utf8mb4".to_string()),
            ("parseTime".to_string(), "true".to_string()),
        ]);
        params.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Render a `mysql://` connection URL.
    ///
    /// An empty host or port falls back to `localhost:3306`; a database name
    /// is required.
    pub fn url(&self) -> OrmResult<Url> {
        if self.database.is_empty() {
            return Err(OrmError::Config("database name required".to_string()));
        }
        let host = if self.host.is_empty() {
            "localhost"
        } else {
            self.host.as_str()
        };
        let port = if self.port == 0 { default_port() } else { self.port };

        let mut url = Url::parse(&format!("mysql://{host}:{port}"))?;
        if !self.user.is_empty() {
            url.set_username(&self.user)
                .map_err(|_| OrmError::Config(format!("invalid user name '{}'", self.user)))?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| OrmError::Config("invalid password".to_string()))?;
        }
        url.path_segments_mut()
            .map_err(|_| OrmError::Config(format!("cannot set database on '{host}'")))?
            .push(&self.database);
        url.query_pairs_mut().extend_pairs(self.effective_params());
        Ok(url)
    }
}
