//! Connection lifecycle
//!
//! A `SqliteDataResource` names a database and opens it on `acquire`. The
//! connection is closed on `release` or when the resource is dropped.
//! Handlers borrow the open connection through `handle()`.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::errors::{from_rusqlite, resource_unavailable, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    File(PathBuf),
    Memory,
}

/// An SQLite database that can be opened and closed
#[derive(Debug)]
pub struct SqliteDataResource {
    location: Location,
    connection: Option<Connection>,
}

impl SqliteDataResource {
    /// Resource backed by the database file at `path`; nothing is opened yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            connection: None,
        }
    }

    /// Resource backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            connection: None,
        }
    }

    /// Human-readable location, `:memory:` for in-memory databases
    pub fn location(&self) -> String {
        match &self.location {
            Location::File(path) => path.display().to_string(),
            Location::Memory => ":memory:".to_string(),
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the database and apply connection settings
    ///
    /// Acquiring an already acquired resource is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ResourceUnavailable` carrying the native error text when the
    /// database cannot be opened or configured.
    pub fn acquire(&mut self) -> Result<()> {
        if self.connection.is_some() {
            tracing::debug!(location = %self.location(), "resource already acquired");
            return Ok(());
        }

        let opened = match &self.location {
            Location::File(path) => Connection::open(path),
            Location::Memory => Connection::open_in_memory(),
        };
        let conn = opened.map_err(|e| {
            tracing::error!(
                location = %self.location(),
                error = %e,
                "cannot open database"
            );
            resource_unavailable(&self.location(), &e.to_string())
        })?;

        // A failed configure drops `conn`, closing the half-opened handle
        Self::configure(&conn).map_err(|e| {
            tracing::error!(
                location = %self.location(),
                error = %e,
                "cannot configure database"
            );
            resource_unavailable(&self.location(), e.message())
        })?;

        tracing::debug!(location = %self.location(), "resource acquired");
        self.connection = Some(conn);
        Ok(())
    }

    /// Close the connection; releasing a released resource is a no-op
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if SQLite refuses to close the handle. The
    /// resource counts as released either way.
    pub fn release(&mut self) -> Result<()> {
        let Some(conn) = self.connection.take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, e)| {
            tracing::warn!(location = %self.location(), error = %e, "error closing database");
            from_rusqlite(e).with_op("release")
        })?;
        tracing::debug!(location = %self.location(), "resource released");
        Ok(())
    }

    /// Borrow the open connection
    ///
    /// # Errors
    ///
    /// Returns `ResourceUnavailable` when the resource is not acquired.
    pub fn handle(&self) -> Result<&Connection> {
        self.connection
            .as_ref()
            .ok_or_else(|| resource_unavailable(&self.location(), "resource is not acquired"))
    }

    /// Apply the per-connection settings every handler relies on
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if a pragma cannot be applied.
    pub fn configure(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(from_rusqlite)?;
        Ok(())
    }
}

impl Drop for SqliteDataResource {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(location = %self.location(), error = %e, "error closing database on drop");
            }
        }
    }
}
