//! Edit-session drafts: unsaved entity state kept between requests.

use crate::error::AppError;
use crate::store::{DraftKey, DraftStore, SAVE_SLOT};
use serde_json::{Map, Value};

pub struct DraftService<'a> {
    store: &'a dyn DraftStore,
}

impl<'a> DraftService<'a> {
    pub fn new(store: &'a dyn DraftStore) -> Self {
        DraftService { store }
    }

    /// Merge `fields` into the draft for `(kind, id)`. With `use_for_save` the merged
    /// draft is also copied into the save slot. Returns the merged draft.
    pub async fn save(
        &self,
        kind: &str,
        id: &str,
        fields: Map<String, Value>,
        use_for_save: bool,
    ) -> Result<Value, AppError> {
        let key = DraftKey::new(kind, id);
        let mut draft = match self.store.get(&key).await? {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        draft.extend(fields);
        let draft = Value::Object(draft);
        self.store.put(&key, &draft).await?;
        if use_for_save {
            self.store.put(&key.slot(SAVE_SLOT), &draft).await?;
        }
        tracing::debug!(kind, id, use_for_save, "draft saved");
        Ok(draft)
    }

    /// Current draft. A pending save-slot copy is consumed once the draft is read.
    pub async fn load(&self, kind: &str, id: &str) -> Result<Option<Value>, AppError> {
        let key = DraftKey::new(kind, id);
        let draft = self.store.get(&key).await?;
        if draft.is_some() {
            let save_key = key.slot(SAVE_SLOT);
            if self.store.get(&save_key).await?.is_some() {
                self.store.remove(&save_key).await?;
            }
        }
        Ok(draft)
    }

    /// Drop the draft and its save slot. True when anything existed.
    pub async fn discard(&self, kind: &str, id: &str) -> Result<bool, AppError> {
        let key = DraftKey::new(kind, id);
        let draft = self.store.remove(&key).await?;
        let saved = self.store.remove(&key.slot(SAVE_SLOT)).await?;
        Ok(draft || saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDraftStore;
    use serde_json::json;

    fn fields(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn saves_merge_into_the_existing_draft() {
        let store = MemoryDraftStore::new();
        let drafts = DraftService::new(&store);
        drafts.save("thumbnail", "5", fields(json!({"name": "a", "quality": 80})), false).await.unwrap();
        let merged = drafts.save("thumbnail", "5", fields(json!({"quality": 90})), false).await.unwrap();
        assert_eq!(merged, json!({"name": "a", "quality": 90}));
        assert_eq!(drafts.load("thumbnail", "5").await.unwrap(), Some(merged));
    }

    #[tokio::test]
    async fn save_slot_is_consumed_on_load() {
        let store = MemoryDraftStore::new();
        let drafts = DraftService::new(&store);
        drafts.save("tag", "1", fields(json!({"name": "ga"})), true).await.unwrap();
        let save_key = DraftKey::new("tag", "1").slot(SAVE_SLOT);
        assert!(store.get(&save_key).await.unwrap().is_some());

        drafts.load("tag", "1").await.unwrap();
        assert!(store.get(&save_key).await.unwrap().is_none());
        assert!(drafts.load("tag", "1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn discard_removes_both_slots() {
        let store = MemoryDraftStore::new();
        let drafts = DraftService::new(&store);
        drafts.save("tag", "1", fields(json!({"name": "ga"})), true).await.unwrap();
        assert!(drafts.discard("tag", "1").await.unwrap());
        assert!(drafts.load("tag", "1").await.unwrap().is_none());
        assert!(!drafts.discard("tag", "1").await.unwrap());
    }
}
