use std::{collections::HashMap, path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// JSON file-backed document collection keyed by string id.
///
/// Persists a `HashMap<String, V>` to a single JSON file and offers the CRUD
/// surface the repositories need. Intended for prototype services where a
/// real database is overkill; the whole collection is rewritten on every
/// mutation.
#[derive(Clone)]
pub struct DocStore<V> {
    inner: Arc<RwLock<HashMap<String, V>>>,
    file_path: PathBuf,
}

impl<V> DocStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    /// Open the collection at a path. Creates the file with an empty map if
    /// missing; an unreadable file starts empty rather than failing startup.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<String, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<String, V> = HashMap::new();
                let data =
                    serde_json::to_vec(&empty).map_err(|e| ServiceError::Store(e.to_string()))?;
                fs::write(&file_path, data)
                    .await
                    .map_err(|e| ServiceError::Store(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn save(&self) -> Result<(), ServiceError> {
        let map = self.inner.read().await;
        let data = serde_json::to_vec(&*map).map_err(|e| ServiceError::Store(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Store(e.to_string()))?;
        Ok(())
    }

    /// All documents, in no particular order; callers sort.
    pub async fn list(&self) -> Vec<V> {
        let map = self.inner.read().await;
        map.values().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<V> {
        let map = self.inner.read().await;
        map.get(id).cloned()
    }

    /// Insert or replace a document and persist.
    pub async fn insert(&self, id: String, doc: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(id, doc);
        drop(map);
        self.save().await
    }

    /// Remove a document and persist; returns the removed document.
    pub async fn remove(&self, id: &str) -> Result<Option<V>, ServiceError> {
        let mut map = self.inner.write().await;
        let removed = map.remove(id);
        drop(map);
        self.save().await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("doc_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn crud_round_trip_persists_across_reopen() -> anyhow::Result<()> {
        let path = temp_path();
        let store = DocStore::<String>::open(&path).await?;

        assert!(store.list().await.is_empty());

        store.insert("a".into(), "first".into()).await?;
        store.insert("b".into(), "second".into()).await?;
        assert_eq!(store.get("a").await.as_deref(), Some("first"));

        let removed = store.remove("b").await?;
        assert_eq!(removed.as_deref(), Some("second"));
        assert!(store.remove("b").await?.is_none());

        let reopened = DocStore::<String>::open(&path).await?;
        assert_eq!(reopened.list().await.len(), 1);
        assert_eq!(reopened.get("a").await.as_deref(), Some("first"));

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() -> anyhow::Result<()> {
        let path = temp_path();
        tokio::fs::write(&path, b"not json").await?;
        let store = DocStore::<String>::open(&path).await?;
        assert!(store.list().await.is_empty());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
