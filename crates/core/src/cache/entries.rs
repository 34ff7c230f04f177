//! SQLite implementation of [`EntryStore`].

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

use super::connection::CacheDb;
use super::storage::{CacheStats, EntryStore, StoredEntry};
use crate::Error;

#[async_trait]
impl EntryStore for CacheDb {
    async fn load_validators(&self, url: &str) -> Result<Option<(String, String)>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<(String, String)>, Error> {
                let result = conn.query_row(
                    "SELECT etag, last_modified FROM entries WHERE url = ?1",
                    params![url],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                );

                match result {
                    Ok(pair) => Ok(Some(pair)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn load_body(&self, url: &str) -> Result<Option<String>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT body FROM entries WHERE url = ?1", params![url], |row| row.get(0));

                match result {
                    Ok(body) => Ok(Some(body)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn replace(&self, entry: StoredEntry) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE url = ?1", params![&entry.url])?;
                tx.execute(
                    "INSERT INTO entries (url, etag, last_modified, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        &entry.url,
                        &entry.etag,
                        &entry.last_modified,
                        &entry.body,
                        &entry.fetched_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn delete(&self, url: &str) -> Result<bool, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM entries WHERE url = ?1", params![url])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_all(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn stats(&self) -> Result<CacheStats, Error> {
        self.conn
            .call(|conn| -> Result<CacheStats, Error> {
                let stats = conn.query_row(
                    "SELECT COUNT(*), COALESCE(SUM(LENGTH(body)), 0), MIN(fetched_at), MAX(fetched_at)
                     FROM entries",
                    [],
                    |row| {
                        Ok(CacheStats {
                            entries: row.get(0)?,
                            stored_bytes: row.get(1)?,
                            oldest: row.get(2)?,
                            newest: row.get(3)?,
                        })
                    },
                )?;
                Ok(stats)
            })
            .await
            .map_err(Error::from)
    }
}
