// src/models/quotes.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

// Os valores seriais seguem os rótulos usados pelo frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum QuoteStatus {
    #[serde(rename = "orcamento")]
    Draft,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "pago")]
    Paid,
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "orcamento",
            QuoteStatus::InProgress => "em_andamento",
            QuoteStatus::Paid => "pago",
            QuoteStatus::Cancelled => "cancelado",
        }
    }

    /// Transições permitidas pela máquina de estados.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::InProgress)
                | (QuoteStatus::InProgress, QuoteStatus::Paid)
                | (QuoteStatus::Draft, QuoteStatus::Cancelled)
                | (QuoteStatus::InProgress, QuoteStatus::Cancelled)
        )
    }

    /// Estados em que o estoque já foi abatido.
    pub fn holds_stock(&self) -> bool {
        matches!(self, QuoteStatus::InProgress)
    }

    /// Estados que contam como venda no dashboard.
    pub fn is_sale(&self) -> bool {
        matches!(self, QuoteStatus::InProgress | QuoteStatus::Paid)
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Orçamento ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 3)]
    pub quantity: u32,
    // Preço do produto no momento em que o item foi adicionado
    #[schema(example = 25.0)]
    pub unit_price: Decimal,
    #[schema(example = 75.0)]
    pub total_value: Decimal,
}

impl QuoteItem {
    pub fn new(product_id: Uuid, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            unit_price,
            total_value: unit_price * Decimal::from(quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub client_id: Uuid,
    pub items: Vec<QuoteItem>,
    #[schema(example = 75.0)]
    pub total_value: Decimal,
    pub status: QuoteStatus,
    pub notes: Option<String>,
    // Só existe quando status = cancelado
    pub cancellation_reason: Option<String>,
    #[schema(example = "2026-11-30")]
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Código curto exibido nas telas e na impressão.
    pub fn display_code(&self) -> String {
        self.id.simple().to_string()[..8].to_uppercase()
    }

    pub fn items_total(items: &[QuoteItem]) -> Decimal {
        items.iter().map(|i| i.total_value).sum()
    }
}

// --- Entrada (criação / edição) ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemInput {
    #[validate(required(message = "O produto é obrigatório."))]
    pub product_id: Option<Uuid>,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 3)]
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    #[validate(required(message = "O cliente é obrigatório."))]
    pub client_id: Option<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<QuoteItemInput>,

    pub notes: Option<String>,

    #[validate(required(message = "O prazo de validade é obrigatório."))]
    pub valid_until: Option<NaiveDate>,
}

// --- Aprovação parcial ---

/// Rascunho transitório de aprovação: nunca é persistido.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDraft {
    pub quote_id: Uuid,
    pub lines: Vec<ApprovalLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLine {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub approved: bool,
    pub approved_quantity: u32,
}

impl ApprovalDraft {
    pub fn for_quote(quote: &Quote) -> Self {
        Self {
            quote_id: quote.id,
            lines: quote
                .items
                .iter()
                .map(|item| ApprovalLine {
                    item_id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    approved: false,
                    approved_quantity: 0,
                })
                .collect(),
        }
    }

    /// Converte o rascunho nas decisões enviadas ao `approve`.
    pub fn decisions(&self) -> Vec<ApprovalDecision> {
        self.lines
            .iter()
            .map(|line| ApprovalDecision {
                item_id: line.item_id,
                approved: line.approved,
                approved_quantity: line.approved_quantity,
            })
            .collect()
    }

    pub fn approve_line(&mut self, item_id: Uuid, approved_quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.approved = true;
            line.approved_quantity = approved_quantity;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    pub item_id: Uuid,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub approved_quantity: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    pub items: Vec<ApprovalDecision>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelPayload {
    #[serde(default)]
    #[schema(example = "Cliente desistiu do pedido")]
    pub reason: String,
}

// --- Listagem ---

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFilter {
    pub status: Option<QuoteStatus>,
    // Busca por código, nome do cliente ou data de validade (dd/mm/aaaa)
    pub search: Option<String>,
}

// Orçamento com o nome do cliente para a listagem
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    #[serde(flatten)]
    pub quote: Quote,
    pub code: String,
    // "Cliente não encontrado" quando a referência está quebrada
    pub client_name: String,
}
