// src/services/inventory_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::field_error},
    db::{MaterialRepository, ProductRepository, WriteBatch},
    models::inventory::{Material, MaterialInput, Product},
    services::product_service::{index_by_id, resolve_composition, ReferencePolicy},
};

// Sentido da movimentação gerada por um orçamento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Consume, // Aprovação: sai do estoque
    Restore, // Exclusão/cancelamento: volta ao estoque
}

/// Trava compartilhada por toda escrita que altera o estoque dos materiais.
/// Quem lê materiais para regravá-los precisa segurá-la até o commit.
pub type StockLock = Arc<Mutex<()>>;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub material_id: Uuid,
    pub before: Decimal,
    pub after: Decimal,
}

/// Nova quantidade após aplicar um delta; nunca fica abaixo de zero.
pub fn clamp_stock(stock: Decimal, delta: Decimal) -> Decimal {
    (stock + delta).max(Decimal::ZERO)
}

/// Cópia de trabalho dos materiais durante uma transição.
///
/// Os deltas se acumulam aqui; nada é gravado até `stage` colocar os
/// materiais alterados no lote que será confirmado junto com o orçamento.
pub struct StockLedger {
    materials: HashMap<Uuid, Material>,
    touched: Vec<Uuid>,
    now: DateTime<Utc>,
}

impl StockLedger {
    pub fn new(materials: Vec<Material>, now: DateTime<Utc>) -> Self {
        Self {
            materials: index_by_id(materials, |m| m.id),
            touched: Vec::new(),
            now,
        }
    }

    pub fn stock_of(&self, material_id: Uuid) -> Option<Decimal> {
        self.materials.get(&material_id).map(|m| m.stock)
    }

    /// `max(0, estoque + delta)`. `None` se o material não existe.
    pub fn apply_delta(&mut self, material_id: Uuid, delta: Decimal) -> Option<StockChange> {
        let material = self.materials.get_mut(&material_id)?;
        let before = material.stock;
        material.stock = clamp_stock(before, delta);
        material.updated_at = self.now;

        if !self.touched.contains(&material_id) {
            self.touched.push(material_id);
        }

        Some(StockChange {
            material_id,
            before,
            after: material.stock,
        })
    }

    /// Movimenta o estoque de `units` unidades do produto, segundo a composição.
    pub fn move_product(
        &mut self,
        product: &Product,
        units: u32,
        direction: StockDirection,
        policy: ReferencePolicy,
    ) -> Result<Vec<StockChange>, AppError> {
        let components = resolve_composition(product, &self.materials, policy)?;
        let units = Decimal::from(units);

        let mut changes = Vec::with_capacity(components.len());
        for component in components {
            let quantity = component.quantity_per_unit * units;
            let delta = match direction {
                StockDirection::Consume => -quantity,
                StockDirection::Restore => quantity,
            };
            if let Some(change) = self.apply_delta(component.material.id, delta) {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    /// Coloca os materiais alterados no lote. Retorna quantos foram alterados.
    pub fn stage(&self, batch: &mut WriteBatch) -> Result<usize, AppError> {
        for id in &self.touched {
            if let Some(material) = self.materials.get(id) {
                MaterialRepository::stage_save(batch, material)?;
            }
        }
        Ok(self.touched.len())
    }
}

#[derive(Clone)]
pub struct InventoryService {
    material_repo: MaterialRepository,
    product_repo: ProductRepository,
    stock_lock: StockLock,
}

impl InventoryService {
    pub fn new(
        material_repo: MaterialRepository,
        product_repo: ProductRepository,
        stock_lock: StockLock,
    ) -> Self {
        Self {
            material_repo,
            product_repo,
            stock_lock,
        }
    }

    pub async fn list_materials(&self) -> Result<Vec<Material>, AppError> {
        self.material_repo.get_all().await
    }

    pub async fn get_material(&self, id: Uuid) -> Result<Material, AppError> {
        self.material_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))
    }

    /// Materiais com estoque no mínimo ou abaixo (mínimo 0 não gera alerta).
    pub async fn list_low_stock(&self) -> Result<Vec<Material>, AppError> {
        Ok(self
            .material_repo
            .get_all()
            .await?
            .into_iter()
            .filter(Material::is_low_stock)
            .collect())
    }

    // --- CREATE MATERIAL ---
    pub async fn create_material(&self, input: MaterialInput) -> Result<Material, AppError> {
        input.validate()?;

        let now = Utc::now();
        let material = Material {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            stock: input.stock,
            minimum_stock: input.minimum_stock,
            unit: input.unit.trim().to_string(),
            unit_cost: input.unit_cost,
            created_at: now,
            updated_at: now,
        };

        self.material_repo.save(&material).await?;
        tracing::info!("📦 Item '{}' cadastrado com estoque {}", material.name, material.stock);
        Ok(material)
    }

    // --- UPDATE MATERIAL ---
    pub async fn update_material(&self, id: Uuid, input: MaterialInput) -> Result<Material, AppError> {
        input.validate()?;
        let _guard = self.stock_lock.lock().await;
        let existing = self.get_material(id).await?;

        let material = Material {
            name: input.name.trim().to_string(),
            stock: input.stock,
            minimum_stock: input.minimum_stock,
            unit: input.unit.trim().to_string(),
            unit_cost: input.unit_cost,
            updated_at: Utc::now(),
            ..existing
        };

        self.material_repo.save(&material).await?;
        tracing::info!("📦 Item '{}' atualizado", material.name);
        Ok(material)
    }

    /// Ajuste manual do estoque: valor absoluto, nunca negativo.
    pub async fn update_stock(&self, id: Uuid, quantity: Decimal) -> Result<Material, AppError> {
        if quantity < Decimal::ZERO {
            return Err(AppError::ValidationError(field_error(
                "stock",
                "range",
                "O valor não pode ser negativo.",
            )));
        }

        let _guard = self.stock_lock.lock().await;
        let material = self
            .material_repo
            .set_stock(id, quantity)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        tracing::info!("📦 Estoque de '{}' ajustado para {}", material.name, material.stock);
        Ok(material)
    }

    /// Aplica um delta com piso zero em um único material.
    pub async fn apply_delta(&self, id: Uuid, delta: Decimal) -> Result<StockChange, AppError> {
        let _guard = self.stock_lock.lock().await;
        let material = self.get_material(id).await?;
        let before = material.stock;
        let after = clamp_stock(before, delta);

        self.material_repo.set_stock(id, after).await?;
        Ok(StockChange {
            material_id: id,
            before,
            after,
        })
    }

    // --- DELETE MATERIAL ---
    pub async fn delete_material(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.stock_lock.lock().await;
        let material = self.get_material(id).await?;

        let in_use = self
            .product_repo
            .get_all()
            .await?
            .iter()
            .any(|p| p.composition.iter().any(|c| c.material_id == id));
        if in_use {
            return Err(AppError::MaterialInUse(id));
        }

        self.material_repo.delete(id).await?;
        tracing::info!("🗑️ Item '{}' excluído", material.name);
        Ok(())
    }
}
