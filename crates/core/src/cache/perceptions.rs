//! Perception rows: extracted text keyed by fingerprint.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    pub namespace: String,
    pub fingerprint: String,
    /// The argument as classified (absolute path or canonical URL).
    pub source: String,
    /// Adapter that produced `contents`.
    pub source_type: String,
    pub contents: String,
    /// RFC 3339 timestamp of the extraction.
    pub extracted_at: String,
}

impl CacheDb {
    /// Insert or replace the perception for its `(namespace, fingerprint)`.
    pub async fn upsert_perception(&self, perception: &Perception) -> Result<(), Error> {
        let p = perception.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO perceptions (namespace, fingerprint, source, source_type, contents, extracted_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(namespace, fingerprint) DO UPDATE SET
                        source = excluded.source,
                        source_type = excluded.source_type,
                        contents = excluded.contents,
                        extracted_at = excluded.extracted_at",
                    params![p.namespace, p.fingerprint, p.source, p.source_type, p.contents, p.extracted_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a perception by namespace and fingerprint.
    ///
    /// Returns None if no entry exists.
    pub async fn get_perception(&self, namespace: &str, fingerprint: &str) -> Result<Option<Perception>, Error> {
        let namespace = namespace.to_string();
        let fingerprint = fingerprint.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Perception>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT namespace, fingerprint, source, source_type, contents, extracted_at
                    FROM perceptions WHERE namespace = ?1 AND fingerprint = ?2",
                )?;

                let result = stmt.query_row(params![namespace, fingerprint], |row| {
                    Ok(Perception {
                        namespace: row.get(0)?,
                        fingerprint: row.get(1)?,
                        source: row.get(2)?,
                        source_type: row.get(3)?,
                        contents: row.get(4)?,
                        extracted_at: row.get(5)?,
                    })
                });

                match result {
                    Ok(p) => Ok(Some(p)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a perception. Returns whether a row was removed.
    pub async fn delete_perception(&self, namespace: &str, fingerprint: &str) -> Result<bool, Error> {
        let namespace = namespace.to_string();
        let fingerprint = fingerprint.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM perceptions WHERE namespace = ?1 AND fingerprint = ?2",
                    params![namespace, fingerprint],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of perceptions stored under a namespace.
    pub async fn count_perceptions(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM perceptions WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
