// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::inventory::{Material, Product};

// Indicadores do dashboard, recalculados a cada consulta
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_billed: Decimal,      // Orçamentos pagos
    pub to_be_billed: Decimal,      // Orçamentos em andamento
    pub open_quotes: usize,         // Orçamentos ainda em aberto
    pub best_sellers: Vec<BestSellerEntry>,
    pub low_stock: Vec<LowStockEntry>,
    pub recent_sales: Vec<SaleEntry>,
    pub total_cost: Decimal,        // Custo dos materiais consumidos
    pub total_profit: Decimal,      // Faturado - custo
}

// Ranking dos produtos mais vendidos (top 5)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BestSellerEntry {
    pub product: Product,
    pub quantity_sold: u64,
    pub total_billed: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockEntry {
    pub material: Material,
    pub percent_of_minimum: Decimal,
}

// Vendas dos últimos 30 dias
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    pub date: NaiveDate,
    pub value: Decimal,
}
