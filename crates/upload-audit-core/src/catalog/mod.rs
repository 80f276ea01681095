pub mod sources;

use crate::config::redact_url;
use crate::error::Error;
use config::ConfigError;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Nullable, Text};
use diesel::sqlite::SqliteConnection;
use diesel::ConnectionError;
use std::path::Path;
use tracing::debug;

pub use sources::{collect_urls, SourceOutcome, SourceStatus, UrlCollection};

/// The database holding the storefront records. One connection is held for
/// a whole audit run and released when the catalog is dropped.
pub enum Catalog {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

#[derive(Debug, PartialEq, Eq)]
enum Backend {
    Postgres,
    Sqlite(String),
}

#[derive(QueryableByName)]
struct UrlRow {
    #[diesel(sql_type = Nullable<Text>)]
    url: Option<String>,
}

fn backend_for(database_url: &str) -> Result<Backend, Error> {
    let url = database_url.trim();
    if url.is_empty() {
        return Err(ConfigError::Message(
            "database_url is not set (use DATABASE_URL or UPLOAD_AUDIT_DATABASE_URL)".to_string(),
        )
        .into());
    }

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        return Ok(Backend::Postgres);
    }
    if let Some(path) = url.strip_prefix("sqlite://") {
        return Ok(Backend::Sqlite(path.to_string()));
    }
    if let Some(path) = url.strip_prefix("sqlite:") {
        return Ok(Backend::Sqlite(path.to_string()));
    }
    if url.starts_with("file:") {
        return Ok(Backend::Sqlite(url.to_string()));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        return Err(ConfigError::Message(format!(
            "unsupported database scheme '{}'",
            scheme
        ))
        .into());
    }
    Ok(Backend::Sqlite(url.to_string()))
}

/// Opens the catalog named by `database_url`.
///
/// `postgres://` and `postgresql://` URLs use PostgreSQL; `sqlite://path`,
/// `file:` URIs and bare paths use SQLite. A SQLite file must already exist.
pub fn connect(database_url: &str) -> Result<Catalog, Error> {
    let connection_error = |source| Error::Connection {
        url: redact_url(database_url),
        source,
    };

    match backend_for(database_url)? {
        Backend::Postgres => {
            debug!("Connecting to PostgreSQL at {}", redact_url(database_url));
            PgConnection::establish(database_url.trim())
                .map(Catalog::Postgres)
                .map_err(connection_error)
        }
        Backend::Sqlite(path) => {
            if path != ":memory:" && !path.starts_with("file:") && !Path::new(&path).is_file() {
                return Err(connection_error(ConnectionError::BadConnection(format!(
                    "database file {} does not exist",
                    path
                ))));
            }
            debug!("Opening SQLite database {}", path);
            SqliteConnection::establish(&path)
                .map(Catalog::Sqlite)
                .map_err(connection_error)
        }
    }
}

/// Checks that a configured table or column name is a plain identifier.
pub fn validate_identifier(name: &str) -> Result<&str, Error> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}

impl Catalog {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Catalog::Postgres(_) => "postgres",
            Catalog::Sqlite(_) => "sqlite",
        }
    }

    /// Quotes a validated identifier. SQLite reads an unresolved `"name"` as
    /// a string literal, so it gets brackets instead.
    pub fn quote_identifier(&self, name: &str) -> Result<String, Error> {
        let name = validate_identifier(name)?;
        Ok(match self {
            Catalog::Postgres(_) => format!("\"{}\"", name),
            Catalog::Sqlite(_) => format!("[{}]", name),
        })
    }

    /// Non-empty values of `table.column`.
    pub fn load_column(&mut self, table: &str, column: &str) -> Result<Vec<String>, Error> {
        let table = self.quote_identifier(table)?;
        let column = self.quote_identifier(column)?;
        let sql = format!(
            "SELECT {column} AS url FROM {table} WHERE {column} IS NOT NULL AND {column} <> ''",
            column = column,
            table = table
        );

        let rows: Vec<UrlRow> = match self {
            Catalog::Postgres(conn) => sql_query(sql.as_str()).load(conn)?,
            Catalog::Sqlite(conn) => sql_query(sql.as_str()).load(conn)?,
        };

        Ok(rows.into_iter().filter_map(|row| row.url).collect())
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        debug!("Releasing {} connection", self.backend_name());
    }
}
