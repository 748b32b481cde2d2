// src/db/sqlite_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{
    sqlite::{SqlitePool, SqlitePoolOptions},
    Executor, Sqlite,
};
use std::time::Duration;

use crate::{
    common::error::AppError,
    db::record_store::{Collection, RecordStore, WriteBatch, WriteOp},
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Conecta ao arquivo (ou à memória) indicado em `DATABASE_URL`.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        // Cada conexão ":memory:" é um banco separado: uma só conexão na pool.
        let in_memory = database_url.contains(":memory:");

        let mut options = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .acquire_timeout(Duration::from_secs(3));
        if in_memory {
            // Fechar a conexão apagaria o banco.
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect(database_url).await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!().run(&self.pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
        Ok(())
    }
}

// ---
// Funções de "Escrita" genéricas no executor (pool ou transação)
// ---

async fn upsert_record<'e, E>(
    executor: E,
    collection: Collection,
    id: &str,
    data: &Value,
) -> Result<(), AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    // UPSERT: se o id já existe, troca só o documento e mantém a posição (seq).
    sqlx::query(
        r#"
        INSERT INTO records (collection, id, seq, data)
        VALUES (
            ?1,
            ?2,
            (SELECT COALESCE(MAX(seq), 0) + 1 FROM records WHERE collection = ?1),
            ?3
        )
        ON CONFLICT (collection, id)
        DO UPDATE SET data = excluded.data
        "#,
    )
    .bind(collection.key())
    .bind(id)
    .bind(serde_json::to_string(data)?)
    .execute(executor)
    .await?;

    Ok(())
}

async fn delete_record<'e, E>(executor: E, collection: Collection, id: &str) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM records WHERE collection = ?1 AND id = ?2")
        .bind(collection.key())
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        let rows: Vec<String> = sqlx::query_scalar(
            "SELECT data FROM records WHERE collection = ?1 ORDER BY seq ASC",
        )
        .bind(collection.key())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
            .collect()
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, AppError> {
        let row: Option<String> = sqlx::query_scalar(
            "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
        )
        .bind(collection.key())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|raw| serde_json::from_str(&raw).map_err(AppError::from))
            .transpose()
    }

    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
        upsert_record(&self.pool, collection, id, &data).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        delete_record(&self.pool, collection, id).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        // Se qualquer escrita falhar, o drop do `tx` faz o rollback.
        let mut tx = self.pool.begin().await?;

        for op in batch.ops() {
            match op {
                WriteOp::Upsert { collection, id, data } => {
                    upsert_record(&mut *tx, *collection, id, data).await?;
                }
                WriteOp::Delete { collection, id } => {
                    delete_record(&mut *tx, *collection, id).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
