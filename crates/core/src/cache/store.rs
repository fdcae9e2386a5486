//! Key-value operations on the cache database.
//!
//! Each call runs as one statement or one transaction on the background
//! connection, so it is atomic with respect to other callers of the same
//! handle. Nothing spans two calls.

use super::connection::CacheDb;
use crate::Error;
use chrono::Utc;
use tokio_rusqlite::{params, rusqlite};

const UPSERT: &str = "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at";

fn check_key(key: &str) -> Result<(), Error> {
    if key.is_empty() { Err(Error::InvalidInput("cache key cannot be empty".into())) } else { Ok(()) }
}

impl CacheDb {
    /// Get the bytes stored under `key`.
    ///
    /// Returns None if the key doesn't exist.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Vec<u8>>, Error> {
                let result = conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0));

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        check_key(key)?;
        let key = key.to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(UPSERT, params![key, value, now])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several pairs in one transaction: either all are written or none.
    pub async fn set_all(&self, pairs: Vec<(String, Vec<u8>)>) -> Result<(), Error> {
        for (key, _) in &pairs {
            check_key(key)?;
        }
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(UPSERT)?;
                    for (key, value) in &pairs {
                        stmt.execute(params![key, value, now])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let db = CacheDb::open_in_memory().await.unwrap();

        assert!(matches!(db.set("", b"x".to_vec()).await, Err(Error::InvalidInput(_))));

        let pairs = vec![("a".to_string(), b"1".to_vec()), (String::new(), b"2".to_vec())];
        assert!(matches!(db.set_all(pairs).await, Err(Error::InvalidInput(_))));
        assert!(db.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set("6931XE130", b"{\"street\":\"Kerkstraat\"}".to_vec()).await.unwrap();

        let value = db.get("6931XE130").await.unwrap().unwrap();
        assert_eq!(value, b"{\"street\":\"Kerkstraat\"}");
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set("key", b"old".to_vec()).await.unwrap();
        db.set("key", b"new".to_vec()).await.unwrap();

        assert_eq!(db.get("key").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_keys_are_case_sensitive() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set("6931XE130", b"upper".to_vec()).await.unwrap();

        assert!(db.get("6931xe130").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_all_writes_every_pair() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.set_all(vec![("a".into(), b"1".to_vec()), ("b".into(), b"2".to_vec())])
            .await
            .unwrap();

        assert_eq!(db.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(db.get("b").await.unwrap(), Some(b"2".to_vec()));
    }
}
