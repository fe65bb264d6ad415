//! Database types and global state for the membership store

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use heed::types::{Bytes, SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::debug;

use crate::config::DEFAULT_MAP_SIZE;
use crate::error::{err, AuthzError, Result};
use crate::invitation::Invitation;
use crate::membership::Membership;

/// organization/user -> membership record
pub type DbMembers = Database<Bytes, SerdeJson<Membership>>;
/// user/organization -> joined_at (epoch ms)
pub type DbIndex = Database<Bytes, U64<byteorder::BigEndian>>;
/// sha256(token) -> invitation
pub type DbInvites = Database<Str, SerdeJson<Invitation>>;
/// organization/email -> sha256(token) of the latest invitation
pub type DbInviteIdx = Database<Bytes, Str>;

/// All database handles
pub struct Dbs {
    pub members: DbMembers,
    pub by_user: DbIndex,
    pub invites: DbInvites,
    pub invites_by_org: DbInviteIdx,
}

// Global state
pub static ENV: OnceLock<Env> = OnceLock::new();
pub static DBS: OnceLock<Dbs> = OnceLock::new();
pub static TEST_LOCK: Mutex<()> = Mutex::new(());
static INIT_LOCK: Mutex<()> = Mutex::new(());
pub static INIT_PATH: OnceLock<String> = OnceLock::new();

/// Get the database handles, or error if not initialized
#[inline]
pub fn dbs() -> Result<&'static Dbs> {
    DBS.get().ok_or(AuthzError::NotInitialized)
}

/// Get the environment, or error if not initialized
#[inline]
pub fn env() -> Result<&'static Env> {
    ENV.get().ok_or(AuthzError::NotInitialized)
}

/// Execute a read-only operation
#[inline]
pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(dbs()?, &env()?.read_txn().map_err(err)?)
}

/// Execute a read-write operation in one transaction; nothing is written if `f` fails
pub fn write<T, F: FnOnce(&Dbs, &mut RwTxn) -> Result<T>>(f: F) -> Result<T> {
    let mut txn = env()?.write_txn().map_err(err)?;
    let r = f(dbs()?, &mut txn)?;
    txn.commit().map_err(err)?;
    Ok(r)
}

/// Initialize the database with the default map size
pub fn init(path: &str) -> Result<()> {
    init_with_map_size(path, DEFAULT_MAP_SIZE)
}

/// Initialize the database. Idempotent for the same path.
pub fn init_with_map_size(path: &str, map_size: usize) -> Result<()> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    if let Some(p) = INIT_PATH.get() {
        return if p == path {
            Ok(())
        } else {
            Err(AuthzError::AlreadyInitialized(p.clone()))
        };
    }
    std::fs::create_dir_all(path).map_err(err)?;
    // SAFETY: LMDB requires no other processes access this path concurrently during open.
    let e = unsafe {
        EnvOpenOptions::new()
            .map_size(map_size)
            .max_dbs(4)
            .open(Path::new(path))
            .map_err(err)?
    };
    let mut tx = e.write_txn().map_err(err)?;
    let d = Dbs {
        members: e.create_database(&mut tx, Some("members")).map_err(err)?,
        by_user: e.create_database(&mut tx, Some("by_user")).map_err(err)?,
        invites: e.create_database(&mut tx, Some("invites")).map_err(err)?,
        invites_by_org: e.create_database(&mut tx, Some("invites_by_org")).map_err(err)?,
    };
    tx.commit().map_err(err)?;
    let _ = (ENV.set(e), DBS.set(d), INIT_PATH.set(path.to_string()));
    debug!(path, map_size, "membership store opened");
    Ok(())
}

/// Clear all databases (for testing)
pub fn clear_all() -> Result<()> {
    write(|d, tx| {
        d.members.clear(tx).map_err(err)?;
        d.by_user.clear(tx).map_err(err)?;
        d.invites.clear(tx).map_err(err)?;
        d.invites_by_org.clear(tx).map_err(err)
    })
}

/// Get the test lock (for single-threaded tests)
pub fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

/// Milliseconds since the Unix epoch
pub(crate) fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
