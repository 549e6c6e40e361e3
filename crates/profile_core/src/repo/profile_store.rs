//! Profile store contract and SQLite adapter.
//!
//! # Responsibility
//! - Translate `ProfileEntity` records to and from `profiles`/`addresses`
//!   rows.
//! - Keep SQL and rusqlite details inside the persistence boundary.
//!
//! # Invariants
//! - Profile and address rows are written and removed in one transaction.
//! - Delete removes the address row before the profile row and removes
//!   nothing unless both exist.
//! - No rusqlite error type crosses this boundary; failures surface as the
//!   opaque `StoreError`.

use crate::db::schema::verify_schema;
use crate::db::DbResult;
use crate::model::profile::{AddressEntity, ProfileEntity};
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

const PROFILE_SELECT_SQL: &str = "SELECT
    p.id,
    p.first_name,
    p.last_name,
    p.email,
    p.phone_number,
    a.user_id AS address_user_id,
    a.address,
    a.postal_code,
    a.city
FROM profiles p
LEFT JOIN addresses a ON a.user_id = p.id";

pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque failure reported by a profile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Result of a delete attempt. Missing rows leave storage untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    ProfileMissing,
    AddressMissing,
}

/// Durable profile storage keyed by profile id.
///
/// Every call returns only after commit or failure.
pub trait ProfileStore: Send + Sync {
    /// Inserts a profile and its address row.
    fn insert(&self, profile: &ProfileEntity) -> StoreResult<()>;
    /// Point lookup joined with the address row.
    fn find(&self, id: &str) -> StoreResult<Option<ProfileEntity>>;
    /// Full scan joined with address rows, ordered by id.
    fn scan(&self) -> StoreResult<Vec<ProfileEntity>>;
    /// Overwrites the profile row and upserts its address row.
    fn update(&self, profile: &ProfileEntity) -> StoreResult<()>;
    /// Removes address then profile, all-or-nothing.
    fn delete(&self, id: &str) -> StoreResult<DeleteOutcome>;
}

impl<S: ProfileStore + ?Sized> ProfileStore for std::sync::Arc<S> {
    fn insert(&self, profile: &ProfileEntity) -> StoreResult<()> {
        (**self).insert(profile)
    }

    fn find(&self, id: &str) -> StoreResult<Option<ProfileEntity>> {
        (**self).find(id)
    }

    fn scan(&self) -> StoreResult<Vec<ProfileEntity>> {
        (**self).scan()
    }

    fn update(&self, profile: &ProfileEntity) -> StoreResult<()> {
        (**self).update(profile)
    }

    fn delete(&self, id: &str) -> StoreResult<DeleteOutcome> {
        (**self).delete(id)
    }
}

/// SQLite-backed profile store.
///
/// Owns its connection behind a mutex so one store can serve concurrent
/// callers; statements are serialized on that connection.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl SqliteProfileStore {
    /// Wraps a connection returned by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// Fails with the `DbError` from `verify_schema` when the connection
    /// lacks the installed profile schema.
    pub fn try_new(conn: Connection) -> DbResult<Self> {
        verify_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=store_lock module=store status=error error_code=lock_poisoned");
            StoreError::new("profile store connection lock poisoned")
        })
    }
}

impl ProfileStore for SqliteProfileStore {
    fn insert(&self, profile: &ProfileEntity) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO profiles (
                id,
                first_name,
                last_name,
                email,
                phone_number
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                profile.id.as_str(),
                profile.first_name.as_str(),
                profile.last_name.as_str(),
                profile.email.as_str(),
                profile.phone_number.as_str(),
            ],
        )?;

        let address = profile
            .address
            .clone()
            .unwrap_or_else(|| AddressEntity::empty_for(profile.id.as_str()));
        tx.execute(
            "INSERT INTO addresses (user_id, address, postal_code, city)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                profile.id.as_str(),
                address.address.as_deref(),
                address.postal_code.as_deref(),
                address.city.as_deref(),
            ],
        )?;

        tx.commit()?;
        debug!("event=store_insert module=store status=ok");
        Ok(())
    }

    fn find(&self, id: &str) -> StoreResult<Option<ProfileEntity>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{PROFILE_SELECT_SQL} WHERE p.id = ?1;"))?;
        let profile = stmt.query_row([id], parse_profile_row).optional()?;
        Ok(profile)
    }

    fn scan(&self) -> StoreResult<Vec<ProfileEntity>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{PROFILE_SELECT_SQL} ORDER BY p.id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut profiles = Vec::new();

        while let Some(row) = rows.next()? {
            profiles.push(parse_profile_row(row)?);
        }

        debug!(
            "event=store_scan module=store status=ok count={}",
            profiles.len()
        );
        Ok(profiles)
    }

    fn update(&self, profile: &ProfileEntity) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE profiles
             SET
                first_name = ?1,
                last_name = ?2,
                email = ?3,
                phone_number = ?4
             WHERE id = ?5;",
            params![
                profile.first_name.as_str(),
                profile.last_name.as_str(),
                profile.email.as_str(),
                profile.phone_number.as_str(),
                profile.id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::new(format!(
                "no profile row matched id `{}`",
                profile.id
            )));
        }

        if let Some(address) = &profile.address {
            upsert_address(&tx, profile.id.as_str(), address)?;
        }

        tx.commit()?;
        debug!("event=store_update module=store status=ok");
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<DeleteOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if !row_exists(&tx, "SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1);", id)? {
            return Ok(DeleteOutcome::ProfileMissing);
        }
        if !row_exists(
            &tx,
            "SELECT EXISTS(SELECT 1 FROM addresses WHERE user_id = ?1);",
            id,
        )? {
            return Ok(DeleteOutcome::AddressMissing);
        }

        tx.execute("DELETE FROM addresses WHERE user_id = ?1;", [id])?;
        tx.execute("DELETE FROM profiles WHERE id = ?1;", [id])?;
        tx.commit()?;

        debug!("event=store_delete module=store status=ok");
        Ok(DeleteOutcome::Deleted)
    }
}

fn upsert_address(tx: &Transaction<'_>, user_id: &str, address: &AddressEntity) -> StoreResult<()> {
    tx.execute(
        "INSERT INTO addresses (user_id, address, postal_code, city)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            address = excluded.address,
            postal_code = excluded.postal_code,
            city = excluded.city;",
        params![
            user_id,
            address.address.as_deref(),
            address.postal_code.as_deref(),
            address.city.as_deref(),
        ],
    )?;
    Ok(())
}

fn row_exists(tx: &Transaction<'_>, sql: &str, id: &str) -> StoreResult<bool> {
    let exists: i64 = tx.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}

fn parse_profile_row(row: &Row<'_>) -> rusqlite::Result<ProfileEntity> {
    let address = match row.get::<_, Option<String>>("address_user_id")? {
        Some(user_id) => Some(AddressEntity {
            user_id,
            address: row.get("address")?,
            postal_code: row.get("postal_code")?,
            city: row.get("city")?,
        }),
        None => None,
    };

    Ok(ProfileEntity {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
        address,
    })
}
