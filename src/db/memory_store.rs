// src/db/memory_store.rs

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch, WriteOp},
};

type Rows = Vec<(String, Value)>;

// Implementação em memória (testes e execução sem disco)
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Rows>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(rows: &mut HashMap<Collection, Rows>, op: WriteOp) {
    match op {
        WriteOp::Upsert { collection, id, data } => {
            let entries = rows.entry(collection).or_default();
            match entries.iter_mut().find(|(existing, _)| *existing == id) {
                Some(entry) => entry.1 = data,
                None => entries.push((id, data)),
            }
        }
        WriteOp::Delete { collection, id } => {
            if let Some(entries) = rows.get_mut(&collection) {
                entries.retain(|(existing, _)| *existing != id);
            }
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        let rows = self.collections.lock().await;
        Ok(rows
            .get(&collection)
            .map(|entries| entries.iter().map(|(_, v)| v.clone()).collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, AppError> {
        let rows = self.collections.lock().await;
        Ok(rows
            .get(&collection)
            .and_then(|entries| entries.iter().find(|(existing, _)| existing == id))
            .map(|(_, v)| v.clone()))
    }

    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
        let mut rows = self.collections.lock().await;
        apply(
            &mut rows,
            WriteOp::Upsert {
                collection,
                id: id.to_string(),
                data,
            },
        );
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let mut rows = self.collections.lock().await;
        let Some(entries) = rows.get_mut(&collection) else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|(existing, _)| existing != id);
        Ok(entries.len() != before)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        // Um único lock cobre o lote inteiro: nenhuma leitura vê metade dele.
        let mut rows = self.collections.lock().await;
        for op in batch.into_ops() {
            apply(&mut rows, op);
        }
        Ok(())
    }
}
