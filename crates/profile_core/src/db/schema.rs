//! Profile schema installation and checks.
//!
//! The service has a single schema: `profiles` plus one `addresses` row
//! per profile. A fresh database (version 0) gets it installed in one
//! transaction; a database stamped with a later version is refused.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Version stamped into `PRAGMA user_version` once the schema is installed.
pub const SCHEMA_VERSION: u32 = 1;

/// Tables every profile store connection must have.
pub const PROFILE_TABLES: &[&str] = &["profiles", "addresses"];

const PROFILE_SCHEMA_SQL: &str = include_str!("profile_schema.sql");

/// Installs the profile schema on a fresh database; no-op when present.
pub fn install_schema(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(PROFILE_SCHEMA_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            Ok(())
        }
        SCHEMA_VERSION => Ok(()),
        found => Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}

/// Checks that `conn` carries the installed profile schema.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    match schema_version(conn)? {
        SCHEMA_VERSION => {}
        0 => return Err(DbError::SchemaNotInstalled),
        found => {
            return Err(DbError::SchemaTooNew {
                found,
                supported: SCHEMA_VERSION,
            })
        }
    }

    for &table in PROFILE_TABLES {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
