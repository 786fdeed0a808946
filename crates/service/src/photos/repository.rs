use async_trait::async_trait;

use models::{NewPhoto, Photo};

use crate::errors::RepoError;

/// Repository abstraction for photo metadata rows.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Insert one row and return it as stored by the backend.
    async fn insert(&self, table: &str, photo: &NewPhoto) -> Result<Photo, RepoError>;

    /// All rows, unfiltered, in backend order.
    async fn select_all(&self, table: &str) -> Result<Vec<Photo>, RepoError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockPhotoRepository {
        tables: Mutex<HashMap<String, Vec<Photo>>>, // key: table name
        fail_inserts: AtomicBool,
        fail_selects: AtomicBool,
        insert_calls: AtomicUsize,
    }

    impl MockPhotoRepository {
        pub fn set_fail_inserts(&self, fail: bool) {
            self.fail_inserts.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_selects(&self, fail: bool) {
            self.fail_selects.store(fail, Ordering::SeqCst);
        }

        pub fn insert_calls(&self) -> usize {
            self.insert_calls.load(Ordering::SeqCst)
        }

        pub fn rows(&self, table: &str) -> Vec<Photo> {
            let tables = self.tables.lock().unwrap();
            tables.get(table).cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl PhotoRepository for MockPhotoRepository {
        async fn insert(&self, table: &str, photo: &NewPhoto) -> Result<Photo, RepoError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(RepoError::Status { status: 500, body: "insert rejected".into() });
            }
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            let mut row = serde_json::Map::new();
            row.insert("id".into(), serde_json::json!(rows.len() + 1));
            row.insert("url".into(), serde_json::json!(photo.url));
            row.insert("created_at".into(), serde_json::json!(chrono::Utc::now().to_rfc3339()));
            let row = Photo::from_row(row);
            rows.push(row.clone());
            Ok(row)
        }

        async fn select_all(&self, table: &str) -> Result<Vec<Photo>, RepoError> {
            if self.fail_selects.load(Ordering::SeqCst) {
                return Err(RepoError::Status { status: 500, body: "select rejected".into() });
            }
            Ok(self.rows(table))
        }
    }
}
