// src/db/repository.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, sync::Arc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch},
    models::{
        crm::Client,
        inventory::{Material, Product},
        quotes::Quote,
    },
};

/// Entidade persistida em uma coleção do `RecordStore`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn record_id(&self) -> Uuid;
}

impl Record for Client {
    const COLLECTION: Collection = Collection::Clients;
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Record for Material {
    const COLLECTION: Collection = Collection::Materials;
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Record for Quote {
    const COLLECTION: Collection = Collection::Quotes;
    fn record_id(&self) -> Uuid {
        self.id
    }
}

// Repositório tipado sobre o armazenamento genérico
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

pub type ClientRepository = Repository<Client>;
pub type MaterialRepository = Repository<Material>;
pub type ProductRepository = Repository<Product>;
pub type QuoteRepository = Repository<Quote>;

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<T>, AppError> {
        self.store
            .list(T::COLLECTION)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(AppError::from))
            .collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<T>, AppError> {
        self.store
            .get(T::COLLECTION, &id.to_string())
            .await?
            .map(|value| serde_json::from_value(value).map_err(AppError::from))
            .transpose()
    }

    /// Insere se o id é novo, senão substitui.
    pub async fn save(&self, record: &T) -> Result<(), AppError> {
        let data = serde_json::to_value(record)?;
        self.store
            .upsert(T::COLLECTION, &record.record_id().to_string(), data)
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.store.delete(T::COLLECTION, &id.to_string()).await
    }

    // ---
    // Escritas em lote (aplicadas depois com `commit`)
    // ---

    pub fn stage_save(batch: &mut WriteBatch, record: &T) -> Result<(), AppError> {
        let data = serde_json::to_value(record)?;
        batch.upsert(T::COLLECTION, record.record_id().to_string(), data);
        Ok(())
    }

    pub fn stage_delete(batch: &mut WriteBatch, id: Uuid) {
        batch.delete(T::COLLECTION, id.to_string());
    }

    pub async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.commit(batch).await
    }
}

impl Repository<Material> {
    /// Grava a nova quantidade em estoque e carimba `updatedAt`.
    /// Retorna `None` se o material não existe.
    pub async fn set_stock(&self, id: Uuid, quantity: Decimal) -> Result<Option<Material>, AppError> {
        let Some(mut material) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        material.stock = quantity;
        material.updated_at = Utc::now();
        self.save(&material).await?;
        Ok(Some(material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryStore;

    fn material(name: &str, stock: i64) -> Material {
        let now = Utc::now();
        Material {
            id: Uuid::new_v4(),
            name: name.to_string(),
            stock: Decimal::from(stock),
            minimum_stock: Decimal::from(10),
            unit: "ml".to_string(),
            unit_cost: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let repo = MaterialRepository::new(Arc::new(MemoryStore::new()));
        let ink = material("Tinta", 50);
        repo.save(&ink).await.unwrap();

        assert_eq!(repo.get_by_id(ink.id).await.unwrap(), Some(ink.clone()));
        assert_eq!(repo.get_all().await.unwrap(), vec![ink]);
    }

    #[tokio::test]
    async fn test_set_stock_stamps_updated_at() {
        let repo = MaterialRepository::new(Arc::new(MemoryStore::new()));
        let ink = material("Tinta", 50);
        repo.save(&ink).await.unwrap();

        let updated = repo.set_stock(ink.id, Decimal::from(7)).await.unwrap().unwrap();
        assert_eq!(updated.stock, Decimal::from(7));
        assert!(updated.updated_at >= ink.updated_at);
        assert!(repo.set_stock(Uuid::new_v4(), Decimal::ONE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_record_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert(Collection::Materials, "x", serde_json::json!({"id": "x"}))
            .await
            .unwrap();
        let repo = MaterialRepository::new(store);
        assert!(repo.get_all().await.is_err());
    }
}
