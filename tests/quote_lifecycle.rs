// tests/quote_lifecycle.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use orcasystem::{
    common::error::{AppError, ErrorKind},
    db::{
        ClientRepository, Collection, MaterialRepository, MemoryStore, ProductRepository,
        QuoteRepository, RecordStore, WriteBatch,
    },
    models::{
        inventory::{CompositionEntry, Material, MaterialInput, ProductInput},
        quotes::{ApprovalDecision, QuoteInput, QuoteItemInput, QuoteStatus},
    },
    services::{
        dashboard_service::compute_metrics, InventoryService, ProductService, QuoteService,
        ReferencePolicy, StockLock,
    },
};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

struct Fixture {
    store: Arc<dyn RecordStore>,
    inventory: InventoryService,
    products: ProductService,
    quotes: QuoteService,
}

fn fixture(policy: ReferencePolicy) -> Fixture {
    fixture_over(Arc::new(MemoryStore::new()), policy)
}

fn fixture_over(store: Arc<dyn RecordStore>, policy: ReferencePolicy) -> Fixture {
    let clients = ClientRepository::new(store.clone());
    let materials = MaterialRepository::new(store.clone());
    let products = ProductRepository::new(store.clone());
    let quotes = QuoteRepository::new(store.clone());

    let stock_lock = StockLock::default();

    Fixture {
        inventory: InventoryService::new(materials.clone(), products.clone(), stock_lock.clone()),
        products: ProductService::new(products.clone(), materials.clone(), quotes.clone()),
        quotes: QuoteService::new(quotes, products, materials, clients, policy, stock_lock),
        store,
    }
}

impl Fixture {
    async fn material(&self, name: &str, stock: i64) -> Material {
        self.inventory
            .create_material(MaterialInput {
                name: name.to_string(),
                stock: Decimal::from(stock),
                minimum_stock: Decimal::from(10),
                unit: "ml".to_string(),
                unit_cost: Some(Decimal::ONE),
            })
            .await
            .unwrap()
    }

    async fn product(&self, name: &str, price: i64, composition: &[(Uuid, i64)]) -> Uuid {
        self.products
            .create_product(ProductInput {
                name: name.to_string(),
                description: None,
                price: Decimal::from(price),
                category: None,
                composition: composition
                    .iter()
                    .map(|(material_id, qty)| CompositionEntry {
                        material_id: *material_id,
                        quantity_per_unit: Decimal::from(*qty),
                    })
                    .collect(),
            })
            .await
            .unwrap()
            .id
    }

    async fn stock(&self, material_id: Uuid) -> Decimal {
        self.inventory.get_material(material_id).await.unwrap().stock
    }

    async fn all_stock(&self) -> Vec<Decimal> {
        self.inventory
            .list_materials()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.stock)
            .collect()
    }
}

fn quote_input(items: &[(Uuid, u32)]) -> QuoteInput {
    QuoteInput {
        client_id: Some(Uuid::new_v4()),
        items: items
            .iter()
            .map(|(product_id, quantity)| QuoteItemInput {
                product_id: Some(*product_id),
                quantity: *quantity,
            })
            .collect(),
        notes: Some("Entrega na sexta".to_string()),
        valid_until: NaiveDate::from_ymd_opt(2026, 12, 31),
    }
}

fn approve(item_id: Uuid, qty: u32) -> ApprovalDecision {
    ApprovalDecision {
        item_id,
        approved: true,
        approved_quantity: qty,
    }
}

fn reject(item_id: Uuid) -> ApprovalDecision {
    ApprovalDecision {
        item_id,
        approved: false,
        approved_quantity: 0,
    }
}

#[tokio::test]
async fn ink_and_mug_end_to_end() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let ink = f.material("Ink", 50).await;
    let mug = f.product("Mug", 25, &[(ink.id, 5)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(mug, 3)])).await.unwrap();
    assert_eq!(quote.status, QuoteStatus::Draft);
    assert_eq!(quote.total_value, Decimal::from(75));

    let item_id = quote.items[0].id;
    let approved = f.quotes.approve_quote(quote.id, vec![approve(item_id, 3)]).await.unwrap();
    assert_eq!(approved.status, QuoteStatus::InProgress);
    assert_eq!(f.stock(ink.id).await, Decimal::from(35));

    let paid = f.quotes.mark_paid(quote.id).await.unwrap();
    assert_eq!(paid.status, QuoteStatus::Paid);
    assert_eq!(f.stock(ink.id).await, Decimal::from(35));

    let err = f.quotes.delete_quote(quote.id).await.unwrap_err();
    assert!(matches!(err, AppError::PaidQuoteLocked));
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(f.quotes.get_quote(quote.id).await.unwrap(), paid);
    assert_eq!(f.stock(ink.id).await, Decimal::from(35));
}

#[tokio::test]
async fn partial_approval_keeps_only_the_approved_portion() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m_a = f.material("Tinta A", 100).await;
    let m_b = f.material("Tinta B", 100).await;
    let a = f.product("A", 12, &[(m_a.id, 2)]).await;
    let b = f.product("B", 30, &[(m_b.id, 3)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 10), (b, 5)])).await.unwrap();
    let (item_a, item_b) = (quote.items[0].id, quote.items[1].id);

    let approved = f
        .quotes
        .approve_quote(quote.id, vec![approve(item_a, 4), reject(item_b)])
        .await
        .unwrap();

    assert_eq!(approved.items.len(), 1);
    assert_eq!(approved.items[0].id, item_a);
    assert_eq!(approved.items[0].quantity, 4);
    assert_eq!(approved.items[0].total_value, Decimal::from(48));
    assert_eq!(approved.total_value, Decimal::from(48));
    assert_eq!(approved.status, QuoteStatus::InProgress);

    assert_eq!(f.stock(m_a.id).await, Decimal::from(92));
    assert_eq!(f.stock(m_b.id).await, Decimal::from(100));
}

#[tokio::test]
async fn deleting_an_in_progress_quote_restores_stock() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 20).await;
    let a = f.product("A", 10, &[(m.id, 2)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 4)])).await.unwrap();
    f.quotes
        .approve_quote(quote.id, vec![approve(quote.items[0].id, 4)])
        .await
        .unwrap();
    assert_eq!(f.stock(m.id).await, Decimal::from(12));

    f.quotes.delete_quote(quote.id).await.unwrap();
    assert_eq!(f.stock(m.id).await, Decimal::from(20));
    assert!(matches!(
        f.quotes.get_quote(quote.id).await,
        Err(AppError::QuoteNotFound(_))
    ));
}

#[tokio::test]
async fn approval_with_nothing_selected_changes_nothing() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 50).await;
    let a = f.product("A", 10, &[(m.id, 1)]).await;
    let b = f.product("B", 10, &[(m.id, 1)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 2), (b, 3)])).await.unwrap();
    let decisions = quote.items.iter().map(|i| reject(i.id)).collect();

    let err = f.quotes.approve_quote(quote.id, decisions).await.unwrap_err();
    assert!(matches!(err, AppError::NoItemsSelected));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(f.stock(m.id).await, Decimal::from(50));
    assert_eq!(f.quotes.get_quote(quote.id).await.unwrap(), quote);
}

#[tokio::test]
async fn approval_clamps_stock_at_zero() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 3).await;
    let a = f.product("A", 10, &[(m.id, 2)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 5)])).await.unwrap();
    f.quotes
        .approve_quote(quote.id, vec![approve(quote.items[0].id, 5)])
        .await
        .unwrap();

    assert_eq!(f.stock(m.id).await, Decimal::ZERO);
}

#[tokio::test]
async fn create_validates_before_writing() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;

    let err = f.quotes.create_quote(quote_input(&[])).await.unwrap_err();
    assert!(matches!(err, AppError::QuoteWithoutItems));

    let mut missing_client = quote_input(&[(a, 1)]);
    missing_client.client_id = None;
    let err = f.quotes.create_quote(missing_client).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = f.quotes.create_quote(quote_input(&[(a, 0)])).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = f.quotes.create_quote(quote_input(&[(Uuid::new_v4(), 1)])).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let listed = f.quotes.list_quotes(&Default::default()).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn created_quote_round_trips_through_the_store() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 7, &[]).await;
    let created = f.quotes.create_quote(quote_input(&[(a, 3)])).await.unwrap();

    let reloaded = QuoteRepository::new(f.store.clone())
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .find(|q| q.id == created.id)
        .unwrap();

    assert_eq!(reloaded, created);
    assert_eq!(reloaded.items[0].unit_price, Decimal::from(7));
    assert_eq!(reloaded.total_value, Decimal::from(21));
}

#[tokio::test]
async fn unit_price_is_a_snapshot() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;
    let quote = f.quotes.create_quote(quote_input(&[(a, 2)])).await.unwrap();

    f.products
        .update_product(
            a,
            ProductInput {
                name: "A".to_string(),
                description: None,
                price: Decimal::from(99),
                category: None,
                composition: vec![],
            },
        )
        .await
        .unwrap();

    let reloaded = f.quotes.get_quote(quote.id).await.unwrap();
    assert_eq!(reloaded.items[0].unit_price, Decimal::from(10));
    assert_eq!(reloaded.total_value, Decimal::from(20));
}

#[tokio::test]
async fn edit_is_only_allowed_while_open() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;
    let quote = f.quotes.create_quote(quote_input(&[(a, 1)])).await.unwrap();

    let edited = f.quotes.update_quote(quote.id, quote_input(&[(a, 5)])).await.unwrap();
    assert_eq!(edited.total_value, Decimal::from(50));
    assert_eq!(edited.created_at, quote.created_at);
    assert_eq!(edited.status, QuoteStatus::Draft);

    f.quotes
        .approve_quote(quote.id, vec![approve(edited.items[0].id, 5)])
        .await
        .unwrap();

    let err = f.quotes.update_quote(quote.id, quote_input(&[(a, 1)])).await.unwrap_err();
    assert!(matches!(err, AppError::QuoteNotEditable(QuoteStatus::InProgress)));
}

#[tokio::test]
async fn only_reachable_transitions_are_allowed() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;
    let quote = f.quotes.create_quote(quote_input(&[(a, 1)])).await.unwrap();

    // orcamento -> pago não existe
    let err = f.quotes.mark_paid(quote.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let approved = f
        .quotes
        .approve_quote(quote.id, vec![approve(quote.items[0].id, 1)])
        .await
        .unwrap();

    // Aprovar de novo não é permitido
    let err = f
        .quotes
        .approve_quote(quote.id, vec![approve(approved.items[0].id, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Policy);

    f.quotes.mark_paid(quote.id).await.unwrap();

    // pago é terminal
    let err = f.quotes.cancel_quote(quote.id, "desistiu").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition { from: QuoteStatus::Paid, to: QuoteStatus::Cancelled }
    ));
}

#[tokio::test]
async fn cancel_requires_a_reason_and_restocks_in_progress_quotes() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 30).await;
    let a = f.product("A", 10, &[(m.id, 3)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 4)])).await.unwrap();
    f.quotes
        .approve_quote(quote.id, vec![approve(quote.items[0].id, 4)])
        .await
        .unwrap();
    assert_eq!(f.stock(m.id).await, Decimal::from(18));

    let err = f.quotes.cancel_quote(quote.id, "   ").await.unwrap_err();
    assert!(matches!(err, AppError::MissingCancellationReason));

    let cancelled = f.quotes.cancel_quote(quote.id, "Cliente desistiu").await.unwrap();
    assert_eq!(cancelled.status, QuoteStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Cliente desistiu"));
    assert_eq!(f.stock(m.id).await, Decimal::from(30));

    // Excluir um cancelado não devolve de novo
    f.quotes.delete_quote(quote.id).await.unwrap();
    assert_eq!(f.stock(m.id).await, Decimal::from(30));
}

#[tokio::test]
async fn cancelling_an_open_quote_does_not_touch_stock() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 30).await;
    let a = f.product("A", 10, &[(m.id, 3)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 4)])).await.unwrap();
    f.quotes.cancel_quote(quote.id, "Sem retorno").await.unwrap();
    assert_eq!(f.stock(m.id).await, Decimal::from(30));
}

#[tokio::test]
async fn missing_product_follows_the_reference_policy() {
    for policy in [ReferencePolicy::SkipMissing, ReferencePolicy::Strict] {
        let f = fixture(policy);
        let m = f.material("M", 40).await;
        let a = f.product("A", 10, &[(m.id, 1)]).await;
        let b = f.product("B", 10, &[(m.id, 2)]).await;

        let quote = f.quotes.create_quote(quote_input(&[(a, 2), (b, 3)])).await.unwrap();

        // Remove o produto B por fora do serviço (referência quebrada)
        ProductRepository::new(f.store.clone()).delete(b).await.unwrap();

        let decisions = quote.items.iter().map(|i| approve(i.id, i.quantity)).collect();
        let result = f.quotes.approve_quote(quote.id, decisions).await;

        match policy {
            ReferencePolicy::SkipMissing => {
                let approved = result.unwrap();
                assert_eq!(approved.items.len(), 2);
                assert_eq!(f.stock(m.id).await, Decimal::from(38));
            }
            ReferencePolicy::Strict => {
                assert!(matches!(result, Err(AppError::ProductNotFound(id)) if id == b));
                assert_eq!(f.stock(m.id).await, Decimal::from(40));
                assert_eq!(
                    f.quotes.get_quote(quote.id).await.unwrap().status,
                    QuoteStatus::Draft
                );
            }
        }
    }
}

#[tokio::test]
async fn approval_draft_starts_unselected() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;
    let quote = f.quotes.create_quote(quote_input(&[(a, 6)])).await.unwrap();

    let mut draft = f.quotes.start_approval(quote.id).await.unwrap();
    assert!(draft.lines.iter().all(|l| !l.approved && l.approved_quantity == 0));

    draft.approve_line(quote.items[0].id, 2);
    let approved = f.quotes.approve_quote(quote.id, draft.decisions()).await.unwrap();
    assert_eq!(approved.items[0].quantity, 2);
    assert_eq!(approved.total_value, Decimal::from(20));
}

#[tokio::test]
async fn totals_stay_consistent_after_every_transition() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 1000).await;
    let a = f.product("A", 3, &[(m.id, 1)]).await;
    let b = f.product("B", 7, &[(m.id, 2)]).await;

    let quote = f.quotes.create_quote(quote_input(&[(a, 4), (b, 9)])).await.unwrap();
    let edited = f.quotes.update_quote(quote.id, quote_input(&[(a, 5), (b, 2)])).await.unwrap();
    let approved = f
        .quotes
        .approve_quote(quote.id, vec![approve(edited.items[0].id, 3), approve(edited.items[1].id, 2)])
        .await
        .unwrap();
    let paid = f.quotes.mark_paid(quote.id).await.unwrap();

    for q in [quote, edited, approved, paid] {
        let sum: Decimal = q.items.iter().map(|i| i.total_value).sum();
        assert_eq!(q.total_value, sum);
        for item in &q.items {
            assert_eq!(item.total_value, item.unit_price * Decimal::from(item.quantity));
        }
    }

    // 3*1 + 2*2
    assert_eq!(f.stock(m.id).await, Decimal::from(993));
}

async fn metrics_snapshot(
    store: &Arc<dyn RecordStore>,
    now: chrono::DateTime<Utc>,
) -> orcasystem::models::dashboard::DashboardMetrics {
    let quotes = QuoteRepository::new(store.clone()).get_all().await.unwrap();
    let products = ProductRepository::new(store.clone()).get_all().await.unwrap();
    let materials = MaterialRepository::new(store.clone()).get_all().await.unwrap();
    compute_metrics(&quotes, &products, &materials, now)
}

#[tokio::test]
async fn metrics_are_idempotent_without_mutation() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 10).await;
    let a = f.product("A", 10, &[(m.id, 1)]).await;
    let quote = f.quotes.create_quote(quote_input(&[(a, 8)])).await.unwrap();
    f.quotes
        .approve_quote(quote.id, vec![approve(quote.items[0].id, 8)])
        .await
        .unwrap();

    let now = Utc::now();
    let first = metrics_snapshot(&f.store, now).await;
    let second = metrics_snapshot(&f.store, now).await;

    assert_eq!(first, second);
    assert_eq!(first.to_be_billed, Decimal::from(80));
    assert_eq!(first.low_stock.len(), 1);
    assert_eq!(f.all_stock().await, vec![Decimal::from(2)]);
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 10).await;
    let a = f.product("A", 10, &[(m.id, 1)]).await;
    f.quotes.create_quote(quote_input(&[(a, 1)])).await.unwrap();

    assert!(matches!(
        f.inventory.delete_material(m.id).await,
        Err(AppError::MaterialInUse(_))
    ));
    assert!(matches!(
        f.products.delete_product(a).await,
        Err(AppError::ProductInUse(_))
    ));
}

#[tokio::test]
async fn manual_stock_edit_rejects_negative_values() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let m = f.material("M", 10).await;

    let err = f.inventory.update_stock(m.id, Decimal::from(-1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(f.stock(m.id).await, Decimal::from(10));

    let updated = f.inventory.update_stock(m.id, Decimal::from(4)).await.unwrap();
    assert_eq!(updated.stock, Decimal::from(4));

    let change = f.inventory.apply_delta(m.id, Decimal::from(-9)).await.unwrap();
    assert_eq!(change.before, Decimal::from(4));
    assert_eq!(change.after, Decimal::ZERO);
}

#[tokio::test]
async fn list_filters_by_status_and_search() {
    let f = fixture(ReferencePolicy::SkipMissing);
    let a = f.product("A", 10, &[]).await;
    let open = f.quotes.create_quote(quote_input(&[(a, 1)])).await.unwrap();
    let other = f.quotes.create_quote(quote_input(&[(a, 2)])).await.unwrap();
    f.quotes
        .approve_quote(other.id, vec![approve(other.items[0].id, 2)])
        .await
        .unwrap();

    let all = f.quotes.list_quotes(&Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].quote.id, open.id);
    assert_eq!(all[0].client_name, "Cliente não encontrado");

    let filter = orcasystem::models::quotes::QuoteFilter {
        status: Some(QuoteStatus::InProgress),
        search: None,
    };
    let in_progress = f.quotes.list_quotes(&filter).await.unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].quote.id, other.id);

    let filter = orcasystem::models::quotes::QuoteFilter {
        status: None,
        search: Some(open.display_code().to_lowercase()),
    };
    let found = f.quotes.list_quotes(&filter).await.unwrap();
    assert!(found.iter().any(|s| s.quote.id == open.id));
}

// Cede a vez ao executor antes de cada chamada, como um banco real faria.
struct YieldingStore(MemoryStore);

#[async_trait]
impl RecordStore for YieldingStore {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>, AppError> {
        tokio::task::yield_now().await;
        self.0.list(collection).await
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, AppError> {
        tokio::task::yield_now().await;
        self.0.get(collection, id).await
    }

    async fn upsert(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
        tokio::task::yield_now().await;
        self.0.upsert(collection, id, data).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        tokio::task::yield_now().await;
        self.0.delete(collection, id).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), AppError> {
        tokio::task::yield_now().await;
        self.0.commit(batch).await
    }
}

#[tokio::test]
async fn concurrent_stock_adjustment_is_not_lost_during_approval() {
    let f = fixture_over(Arc::new(YieldingStore(MemoryStore::new())), ReferencePolicy::SkipMissing);
    let ink = f.material("Ink", 50).await;
    let mug = f.product("Mug", 25, &[(ink.id, 5)]).await;
    let quote = f.quotes.create_quote(quote_input(&[(mug, 3)])).await.unwrap();
    let item_id = quote.items[0].id;

    let (approved, adjusted) = tokio::join!(
        f.quotes.approve_quote(quote.id, vec![approve(item_id, 3)]),
        f.inventory.apply_delta(ink.id, Decimal::from(100)),
    );
    approved.unwrap();
    adjusted.unwrap();

    assert_eq!(f.stock(ink.id).await, Decimal::from(135));
}

#[tokio::test]
async fn concurrent_manual_stock_edit_is_not_lost_during_restock() {
    let f = fixture_over(Arc::new(YieldingStore(MemoryStore::new())), ReferencePolicy::SkipMissing);
    let ink = f.material("Ink", 50).await;
    let mug = f.product("Mug", 25, &[(ink.id, 5)]).await;
    let quote = f.quotes.create_quote(quote_input(&[(mug, 2)])).await.unwrap();
    let item_id = quote.items[0].id;
    f.quotes.approve_quote(quote.id, vec![approve(item_id, 2)]).await.unwrap();
    assert_eq!(f.stock(ink.id).await, Decimal::from(40));

    // A exclusão devolve 10; a edição manual roda depois e fixa 7.
    let (deleted, edited) = tokio::join!(
        f.quotes.delete_quote(quote.id),
        f.inventory.update_stock(ink.id, Decimal::from(7)),
    );
    deleted.unwrap();
    edited.unwrap();

    assert_eq!(f.stock(ink.id).await, Decimal::from(7));
}
