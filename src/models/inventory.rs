// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::{validate_not_blank, validate_not_negative, validate_positive};

// --- 1. Materiais (insumos com controle de estoque) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    #[schema(example = "Tinta Sublimática Ciano")]
    pub name: String,

    // Quantidade física atual
    #[schema(example = 50.0)]
    pub stock: Decimal,

    // 0 significa "sem alerta"
    #[schema(example = 10.0)]
    pub minimum_stock: Decimal,

    #[schema(example = "ml")]
    pub unit: String,

    #[schema(example = 0.15)]
    pub unit_cost: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub fn is_low_stock(&self) -> bool {
        self.minimum_stock > Decimal::ZERO && self.stock <= self.minimum_stock
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInput {
    #[validate(custom(function = "validate_not_blank", message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    pub minimum_stock: Decimal,

    #[validate(custom(function = "validate_not_blank", message = "A unidade é obrigatória."))]
    #[schema(example = "un")]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_cost: Option<Decimal>,
}

// --- 2. Composição (ficha técnica) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompositionEntry {
    pub material_id: Uuid,

    // Consumo por unidade vendida (pode ser fracionado, ex: 0.5 m)
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = 0.5)]
    pub quantity_per_unit: Decimal,
}

// --- 3. Produtos ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Caneca Personalizada")]
    pub name: String,
    pub description: Option<String>,

    // Preço de venda unitário
    #[schema(example = 25.0)]
    pub price: Decimal,

    #[schema(example = "Brindes")]
    pub category: Option<String>,

    #[serde(default)]
    pub composition: Vec<CompositionEntry>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(custom(function = "validate_not_blank", message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,

    pub category: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub composition: Vec<CompositionEntry>,
}

// Linha da composição já resolvida contra o cadastro de materiais
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedComponent {
    pub material: Material,
    pub quantity_per_unit: Decimal,
}

// Ajuste manual de estoque
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdatePayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub stock: Decimal,
}
