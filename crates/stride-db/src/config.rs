use std::env;

/// Where to find the stride database.
///
/// The URL comes from `STRIDE_DATABASE_URL` when set, otherwise a local
/// default. Everything else (`database_name`, `maintenance_url`) is derived
/// from the URL's path component.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    /// Connection URL used when nothing else is configured.
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/stride";

    /// Build a config from `STRIDE_DATABASE_URL`, falling back to the
    /// default.
    pub fn from_env() -> Self {
        let database_url =
            env::var("STRIDE_DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self { database_url }
    }

    /// Build a config from an explicit URL (tests, CLI flags).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Split the URL at its last `/` into the server part and the database
    /// name. `None` when there is no non-empty database name.
    fn split(&self) -> Option<(&str, &str)> {
        let pos = self.database_url.rfind('/')?;
        let name = &self.database_url[pos + 1..];
        if name.is_empty() {
            return None;
        }
        Some((&self.database_url[..pos], name))
    }

    /// The database name named by the URL, if any.
    pub fn database_name(&self) -> Option<&str> {
        self.split().map(|(_, name)| name)
    }

    /// URL of the `postgres` maintenance database on the same server.
    ///
    /// `CREATE DATABASE` cannot run against the database being created, so
    /// first-run setup connects here instead.
    pub fn maintenance_url(&self) -> String {
        match self.split() {
            Some((server, _)) => format!("{server}/postgres"),
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
