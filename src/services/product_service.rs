// src/services/product_service.rs

use chrono::Utc;
use std::{collections::HashMap, fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, ProductRepository, QuoteRepository},
    models::{
        crm::non_empty,
        inventory::{Material, Product, ProductInput, ResolvedComponent},
    },
};

/// O que fazer quando um id referenciado (produto, material) não existe mais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Ignora a entrada (comportamento histórico do sistema).
    #[default]
    SkipMissing,
    /// Falha com NotFound antes de qualquer escrita.
    Strict,
}

impl FromStr for ReferencePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" | "skip_missing" => Ok(ReferencePolicy::SkipMissing),
            "strict" => Ok(ReferencePolicy::Strict),
            other => Err(anyhow::anyhow!("Política de referência desconhecida: {other}")),
        }
    }
}

impl fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferencePolicy::SkipMissing => f.write_str("skip"),
            ReferencePolicy::Strict => f.write_str("strict"),
        }
    }
}

/// Ficha técnica do produto, na ordem cadastrada, com os materiais resolvidos.
pub fn resolve_composition(
    product: &Product,
    materials: &HashMap<Uuid, Material>,
    policy: ReferencePolicy,
) -> Result<Vec<ResolvedComponent>, AppError> {
    let mut resolved = Vec::with_capacity(product.composition.len());

    for entry in &product.composition {
        match materials.get(&entry.material_id) {
            Some(material) => resolved.push(ResolvedComponent {
                material: material.clone(),
                quantity_per_unit: entry.quantity_per_unit,
            }),
            None if policy == ReferencePolicy::Strict => {
                return Err(AppError::MaterialNotFound(entry.material_id));
            }
            None => {
                tracing::warn!(
                    "⚠️ Material {} da composição de '{}' não encontrado; entrada ignorada.",
                    entry.material_id,
                    product.name
                );
            }
        }
    }

    Ok(resolved)
}

pub(crate) fn index_by_id<T, F>(records: Vec<T>, id: F) -> HashMap<Uuid, T>
where
    F: Fn(&T) -> Uuid,
{
    records.into_iter().map(|r| (id(&r), r)).collect()
}

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    material_repo: MaterialRepository,
    quote_repo: QuoteRepository,
}

impl ProductService {
    pub fn new(
        product_repo: ProductRepository,
        material_repo: MaterialRepository,
        quote_repo: QuoteRepository,
    ) -> Self {
        Self {
            product_repo,
            material_repo,
            quote_repo,
        }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.get_all().await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    // --- CREATE PRODUCT ---
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, AppError> {
        input.validate()?;
        self.ensure_materials_exist(&input).await?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: non_empty(input.description),
            price: input.price,
            category: non_empty(input.category),
            composition: input.composition,
            created_at: now,
            updated_at: now,
        };

        self.product_repo.save(&product).await?;
        tracing::info!("📦 Produto '{}' cadastrado ({})", product.name, product.id);
        Ok(product)
    }

    // --- UPDATE PRODUCT ---
    pub async fn update_product(&self, id: Uuid, input: ProductInput) -> Result<Product, AppError> {
        input.validate()?;
        let existing = self.get_product(id).await?;
        self.ensure_materials_exist(&input).await?;

        let product = Product {
            name: input.name.trim().to_string(),
            description: non_empty(input.description),
            price: input.price,
            category: non_empty(input.category),
            composition: input.composition,
            updated_at: Utc::now(),
            ..existing
        };

        self.product_repo.save(&product).await?;
        tracing::info!("📦 Produto '{}' atualizado", product.name);
        Ok(product)
    }

    // --- DELETE PRODUCT ---
    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let product = self.get_product(id).await?;

        let in_use = self
            .quote_repo
            .get_all()
            .await?
            .iter()
            .any(|q| q.items.iter().any(|i| i.product_id == id));
        if in_use {
            return Err(AppError::ProductInUse(id));
        }

        self.product_repo.delete(id).await?;
        tracing::info!("🗑️ Produto '{}' excluído", product.name);
        Ok(())
    }

    /// Composição resolvida para exibição (materiais removidos são ignorados).
    pub async fn get_composition(&self, id: Uuid) -> Result<Vec<ResolvedComponent>, AppError> {
        let product = self.get_product(id).await?;
        let materials = index_by_id(self.material_repo.get_all().await?, |m| m.id);
        resolve_composition(&product, &materials, ReferencePolicy::SkipMissing)
    }

    async fn ensure_materials_exist(&self, input: &ProductInput) -> Result<(), AppError> {
        if input.composition.is_empty() {
            return Ok(());
        }
        let materials = index_by_id(self.material_repo.get_all().await?, |m| m.id);
        match input
            .composition
            .iter()
            .find(|entry| !materials.contains_key(&entry.material_id))
        {
            Some(missing) => Err(AppError::MaterialNotFound(missing.material_id)),
            None => Ok(()),
        }
    }
}
