// src/db/record_store.rs

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::common::error::AppError;

// As quatro coleções persistidas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Clients,
    Materials,
    Products,
    Quotes,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Clients,
        Collection::Materials,
        Collection::Products,
        Collection::Quotes,
    ];

    /// Chave de armazenamento (mantém os nomes usados pelo frontend).
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Clients => "app_clientes",
            Collection::Materials => "app_itens",
            Collection::Products => "app_produtos",
            Collection::Quotes => "app_orcamentos",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Upsert {
        collection: Collection,
        id: String,
        data: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

/// Conjunto de escritas aplicado de forma atômica (tudo ou nada).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, collection: Collection, id: impl Into<String>, data: Value) -> &mut Self {
        self.ops.push(WriteOp::Upsert {
            collection,
            id: id.into(),
            data,
        });
        self
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Armazenamento chave/valor por coleção.
///
/// Os registros são documentos JSON identificados por `id`; `list` devolve
/// na ordem de inserção (substituir um registro não muda sua posição).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, AppError>;

    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError>;

    /// Retorna `false` se o id não existia.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError>;

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError>;
}
