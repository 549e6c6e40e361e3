//! SQLite bootstrap for the profile store.
//!
//! # Responsibility
//! - Open file or in-memory connections with the profile schema installed.
//! - Report every bootstrap and schema failure through one `DbError`.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Profile rows are never touched on a connection that fails
//!   `schema::verify_schema`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build of the service.
    SchemaTooNew { found: u32, supported: u32 },
    /// The connection never went through `open_db`/`open_db_in_memory`.
    SchemaNotInstalled,
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "profile schema version {found} is newer than supported {supported}"
            ),
            Self::SchemaNotInstalled => {
                f.write_str("profile schema is not installed; open the database with db::open_db")
            }
            Self::MissingTable(table) => write!(f, "missing profile table `{table}`"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
