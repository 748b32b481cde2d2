// src/services/quote_service.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::field_error},
    db::{ClientRepository, MaterialRepository, ProductRepository, QuoteRepository, WriteBatch},
    models::{
        crm::non_empty,
        inventory::Product,
        quotes::{
            ApprovalDecision, ApprovalDraft, Quote, QuoteFilter, QuoteInput, QuoteItem,
            QuoteStatus, QuoteSummary,
        },
    },
    services::{
        inventory_service::{StockDirection, StockLedger, StockLock},
        product_service::{index_by_id, ReferencePolicy},
    },
};

const MISSING_CLIENT_LABEL: &str = "Cliente não encontrado";

/// Motor do ciclo de vida do orçamento.
///
/// Toda transição valida tudo antes de escrever e grava o orçamento junto com
/// as alterações de estoque em um único `WriteBatch`. O `transition_lock` é a
/// mesma trava de estoque do `InventoryService`: serializa as transições entre
/// si e contra os ajustes manuais de estoque.
#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    product_repo: ProductRepository,
    material_repo: MaterialRepository,
    client_repo: ClientRepository,
    policy: ReferencePolicy,
    transition_lock: StockLock,
}

impl QuoteService {
    pub fn new(
        quote_repo: QuoteRepository,
        product_repo: ProductRepository,
        material_repo: MaterialRepository,
        client_repo: ClientRepository,
        policy: ReferencePolicy,
        stock_lock: StockLock,
    ) -> Self {
        Self {
            quote_repo,
            product_repo,
            material_repo,
            client_repo,
            policy,
            transition_lock: stock_lock,
        }
    }

    pub async fn get_quote(&self, id: Uuid) -> Result<Quote, AppError> {
        self.quote_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::QuoteNotFound(id))
    }

    // --- LISTAGEM ---
    pub async fn list_quotes(&self, filter: &QuoteFilter) -> Result<Vec<QuoteSummary>, AppError> {
        let quotes = self.quote_repo.get_all().await?;
        let clients: HashMap<Uuid, String> = self
            .client_repo
            .get_all()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let summaries = quotes
            .into_iter()
            .filter(|q| filter.status.is_none_or(|status| q.status == status))
            .map(|quote| {
                let client_name = clients.get(&quote.client_id).cloned();
                (quote, client_name)
            })
            .filter(|(quote, client_name)| {
                search.is_none_or(|term| matches_search(quote, client_name.as_deref(), term))
            })
            .map(|(quote, client_name)| QuoteSummary {
                code: quote.display_code(),
                client_name: client_name.unwrap_or_else(|| MISSING_CLIENT_LABEL.to_string()),
                quote,
            })
            .collect();

        Ok(summaries)
    }

    // --- CREATE ---
    pub async fn create_quote(&self, input: QuoteInput) -> Result<Quote, AppError> {
        let (client_id, valid_until) = validate_input(&input)?;
        let items = self.price_items(&input).await?;

        let now = Utc::now();
        let quote = Quote {
            id: Uuid::new_v4(),
            client_id,
            total_value: Quote::items_total(&items),
            items,
            status: QuoteStatus::Draft,
            notes: non_empty(input.notes),
            cancellation_reason: None,
            valid_until,
            created_at: now,
            updated_at: now,
        };

        self.quote_repo.save(&quote).await?;
        tracing::info!(
            "📝 Orçamento {} criado com {} item(ns), total {}",
            quote.display_code(),
            quote.items.len(),
            quote.total_value
        );
        Ok(quote)
    }

    // --- EDIT ---
    pub async fn update_quote(&self, id: Uuid, input: QuoteInput) -> Result<Quote, AppError> {
        let _guard = self.transition_lock.lock().await;

        let existing = self.get_quote(id).await?;
        if existing.status != QuoteStatus::Draft {
            return Err(AppError::QuoteNotEditable(existing.status));
        }

        let (client_id, valid_until) = validate_input(&input)?;
        let items = self.price_items(&input).await?;

        let quote = Quote {
            client_id,
            total_value: Quote::items_total(&items),
            items,
            notes: non_empty(input.notes),
            valid_until,
            updated_at: Utc::now(),
            ..existing
        };

        self.quote_repo.save(&quote).await?;
        tracing::info!("📝 Orçamento {} atualizado", quote.display_code());
        Ok(quote)
    }

    /// Rascunho de aprovação com todas as linhas desmarcadas.
    pub async fn start_approval(&self, id: Uuid) -> Result<ApprovalDraft, AppError> {
        let quote = self.get_quote(id).await?;
        ensure_transition(quote.status, QuoteStatus::InProgress)?;
        if quote.items.is_empty() {
            return Err(AppError::NothingToApprove);
        }
        Ok(ApprovalDraft::for_quote(&quote))
    }

    // --- APPROVE (aprovação parcial) ---
    pub async fn approve_quote(
        &self,
        id: Uuid,
        decisions: Vec<ApprovalDecision>,
    ) -> Result<Quote, AppError> {
        let _guard = self.transition_lock.lock().await;

        let mut quote = self.get_quote(id).await?;
        ensure_transition(quote.status, QuoteStatus::InProgress)?;
        if quote.items.is_empty() {
            return Err(AppError::NothingToApprove);
        }

        let approved = approved_quantities(&quote, &decisions)?;

        let products = index_by_id(self.product_repo.get_all().await?, |p| p.id);
        let now = Utc::now();
        let mut ledger = StockLedger::new(self.material_repo.get_all().await?, now);

        let mut kept = Vec::with_capacity(approved.len());
        for item in &quote.items {
            let Some(&quantity) = approved.get(&item.id) else {
                continue;
            };
            if let Some(product) = self.lookup_product(&products, item.product_id)? {
                ledger.move_product(product, quantity, StockDirection::Consume, self.policy)?;
            }
            kept.push(QuoteItem {
                quantity,
                total_value: item.unit_price * Decimal::from(quantity),
                ..item.clone()
            });
        }

        quote.items = kept;
        quote.total_value = Quote::items_total(&quote.items);
        quote.status = QuoteStatus::InProgress;
        quote.updated_at = now;

        let mut batch = WriteBatch::new();
        QuoteRepository::stage_save(&mut batch, &quote)?;
        let touched = ledger.stage(&mut batch)?;
        self.quote_repo.commit(batch).await?;

        tracing::info!(
            "✅ Orçamento {} aprovado: {} item(ns), total {}, {} material(is) baixados",
            quote.display_code(),
            quote.items.len(),
            quote.total_value,
            touched
        );
        Ok(quote)
    }

    // --- PAY ---
    pub async fn mark_paid(&self, id: Uuid) -> Result<Quote, AppError> {
        let _guard = self.transition_lock.lock().await;

        let mut quote = self.get_quote(id).await?;
        ensure_transition(quote.status, QuoteStatus::Paid)?;

        quote.status = QuoteStatus::Paid;
        quote.updated_at = Utc::now();
        self.quote_repo.save(&quote).await?;

        tracing::info!("💰 Orçamento {} marcado como pago", quote.display_code());
        Ok(quote)
    }

    // --- CANCEL ---
    /// Cancelar um orçamento em andamento devolve o estoque, como na exclusão.
    pub async fn cancel_quote(&self, id: Uuid, reason: &str) -> Result<Quote, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::MissingCancellationReason);
        }

        let _guard = self.transition_lock.lock().await;

        let mut quote = self.get_quote(id).await?;
        ensure_transition(quote.status, QuoteStatus::Cancelled)?;

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        let restocked = if quote.status.holds_stock() {
            let ledger = self.restock(&quote, now).await?;
            ledger.stage(&mut batch)?
        } else {
            0
        };

        quote.status = QuoteStatus::Cancelled;
        quote.cancellation_reason = Some(reason.to_string());
        quote.updated_at = now;

        QuoteRepository::stage_save(&mut batch, &quote)?;
        self.quote_repo.commit(batch).await?;

        tracing::info!(
            "🚫 Orçamento {} cancelado ({} material(is) devolvidos): {}",
            quote.display_code(),
            restocked,
            reason
        );
        Ok(quote)
    }

    // --- DELETE ---
    pub async fn delete_quote(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.transition_lock.lock().await;

        let quote = self.get_quote(id).await?;
        if quote.status == QuoteStatus::Paid {
            return Err(AppError::PaidQuoteLocked);
        }

        let mut batch = WriteBatch::new();
        let restocked = if quote.status.holds_stock() {
            let ledger = self.restock(&quote, Utc::now()).await?;
            ledger.stage(&mut batch)?
        } else {
            0
        };

        QuoteRepository::stage_delete(&mut batch, quote.id);
        self.quote_repo.commit(batch).await?;

        tracing::info!(
            "🗑️ Orçamento {} excluído ({} material(is) devolvidos)",
            quote.display_code(),
            restocked
        );
        Ok(())
    }

    // ---
    // Auxiliares
    // ---

    /// Captura o preço atual de cada produto (o item não acompanha mudanças futuras).
    async fn price_items(&self, input: &QuoteInput) -> Result<Vec<QuoteItem>, AppError> {
        let products = index_by_id(self.product_repo.get_all().await?, |p| p.id);

        input
            .items
            .iter()
            .filter_map(|item| item.product_id.map(|pid| (pid, item.quantity)))
            .map(|(product_id, quantity)| {
                let product = products
                    .get(&product_id)
                    .ok_or(AppError::ProductNotFound(product_id))?;
                Ok(QuoteItem::new(product_id, quantity, product.price))
            })
            .collect()
    }

    /// Devolve ao estoque tudo o que o orçamento consumiu na aprovação.
    async fn restock(&self, quote: &Quote, now: DateTime<Utc>) -> Result<StockLedger, AppError> {
        let products = index_by_id(self.product_repo.get_all().await?, |p| p.id);
        let mut ledger = StockLedger::new(self.material_repo.get_all().await?, now);

        for item in &quote.items {
            if let Some(product) = self.lookup_product(&products, item.product_id)? {
                ledger.move_product(product, item.quantity, StockDirection::Restore, self.policy)?;
            }
        }
        Ok(ledger)
    }

    fn lookup_product<'a>(
        &self,
        products: &'a HashMap<Uuid, Product>,
        product_id: Uuid,
    ) -> Result<Option<&'a Product>, AppError> {
        match products.get(&product_id) {
            Some(product) => Ok(Some(product)),
            None if self.policy == ReferencePolicy::Strict => {
                Err(AppError::ProductNotFound(product_id))
            }
            None => {
                tracing::warn!(
                    "⚠️ Produto {} não encontrado; movimentação de estoque ignorada.",
                    product_id
                );
                Ok(None)
            }
        }
    }
}

fn ensure_transition(from: QuoteStatus, to: QuoteStatus) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { from, to })
    }
}

// Campos obrigatórios, depois a lista de itens
fn validate_input(input: &QuoteInput) -> Result<(Uuid, NaiveDate), AppError> {
    input.validate()?;
    if input.items.is_empty() {
        return Err(AppError::QuoteWithoutItems);
    }
    let Some(client_id) = input.client_id else {
        return Err(AppError::ValidationError(field_error(
            "client_id",
            "required",
            "O cliente é obrigatório.",
        )));
    };
    let Some(valid_until) = input.valid_until else {
        return Err(AppError::ValidationError(field_error(
            "valid_until",
            "required",
            "O prazo de validade é obrigatório.",
        )));
    };
    Ok((client_id, valid_until))
}

/// Quantidade aprovada por item. Itens ausentes das decisões contam como
/// não aprovados.
fn approved_quantities(
    quote: &Quote,
    decisions: &[ApprovalDecision],
) -> Result<HashMap<Uuid, u32>, AppError> {
    let items: HashMap<Uuid, &QuoteItem> = quote.items.iter().map(|i| (i.id, i)).collect();
    let mut seen = HashSet::with_capacity(decisions.len());
    let mut approved = HashMap::new();

    for decision in decisions {
        let item = items
            .get(&decision.item_id)
            .ok_or(AppError::UnknownApprovalItem(decision.item_id))?;
        if !seen.insert(decision.item_id) {
            return Err(AppError::DuplicateApprovalItem(decision.item_id));
        }
        if !decision.approved {
            continue;
        }
        if decision.approved_quantity == 0 || decision.approved_quantity > item.quantity {
            return Err(AppError::InvalidApprovedQuantity {
                item_id: item.id,
                approved: decision.approved_quantity,
                max: item.quantity,
            });
        }
        approved.insert(item.id, decision.approved_quantity);
    }

    if approved.is_empty() {
        return Err(AppError::NoItemsSelected);
    }
    Ok(approved)
}

fn matches_search(quote: &Quote, client_name: Option<&str>, term: &str) -> bool {
    quote.display_code().contains(&term.to_uppercase())
        || client_name.is_some_and(|name| name.to_lowercase().contains(&term.to_lowercase()))
        || quote.valid_until.format("%d/%m/%Y").to_string().contains(term)
}
