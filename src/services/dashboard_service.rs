// src/services/dashboard_service.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, ProductRepository, QuoteRepository},
    models::{
        dashboard::{BestSellerEntry, DashboardMetrics, LowStockEntry, SaleEntry},
        inventory::{Material, Product},
        quotes::{Quote, QuoteStatus},
    },
    services::product_service::{index_by_id, resolve_composition, ReferencePolicy},
};

const BEST_SELLERS_LIMIT: usize = 5;
const RECENT_SALES_DAYS: i64 = 30;

#[derive(Clone)]
pub struct DashboardService {
    quote_repo: QuoteRepository,
    product_repo: ProductRepository,
    material_repo: MaterialRepository,
}

impl DashboardService {
    pub fn new(
        quote_repo: QuoteRepository,
        product_repo: ProductRepository,
        material_repo: MaterialRepository,
    ) -> Self {
        Self {
            quote_repo,
            product_repo,
            material_repo,
        }
    }

    pub async fn get_metrics(&self) -> Result<DashboardMetrics, AppError> {
        let quotes = self.quote_repo.get_all().await?;
        let products = self.product_repo.get_all().await?;
        let materials = self.material_repo.get_all().await?;

        Ok(compute_metrics(&quotes, &products, &materials, Utc::now()))
    }
}

/// Indicadores do dashboard. Função pura: não lê nem escreve no armazenamento.
pub fn compute_metrics(
    quotes: &[Quote],
    products: &[Product],
    materials: &[Material],
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let sum_status = |status: QuoteStatus| -> Decimal {
        quotes
            .iter()
            .filter(|q| q.status == status)
            .map(|q| q.total_value)
            .sum()
    };

    let total_billed = sum_status(QuoteStatus::Paid);
    let to_be_billed = sum_status(QuoteStatus::InProgress);
    let open_quotes = quotes.iter().filter(|q| q.status == QuoteStatus::Draft).count();

    let sales: Vec<&Quote> = quotes.iter().filter(|q| q.status.is_sale()).collect();

    let product_index = index_by_id(products.to_vec(), |p| p.id);
    let material_index = index_by_id(materials.to_vec(), |m| m.id);

    let total_cost = sales_cost(&sales, &product_index, &material_index);

    DashboardMetrics {
        total_billed,
        to_be_billed,
        open_quotes,
        best_sellers: best_sellers(&sales, &product_index),
        low_stock: low_stock(materials),
        recent_sales: recent_sales(&sales, now),
        total_cost,
        total_profit: total_billed - total_cost,
    }
}

// Agrupa por produto na ordem em que aparecem; o sort estável mantém essa
// ordem em caso de empate.
fn best_sellers(sales: &[&Quote], products: &HashMap<Uuid, Product>) -> Vec<BestSellerEntry> {
    let mut order: Vec<Uuid> = Vec::new();
    let mut totals: HashMap<Uuid, (u64, Decimal)> = HashMap::new();

    for item in sales.iter().flat_map(|q| q.items.iter()) {
        let entry = totals.entry(item.product_id).or_insert_with(|| {
            order.push(item.product_id);
            (0, Decimal::ZERO)
        });
        entry.0 += u64::from(item.quantity);
        entry.1 += item.total_value;
    }

    let mut ranking: Vec<BestSellerEntry> = order
        .into_iter()
        .filter_map(|product_id| {
            let product = products.get(&product_id)?;
            let (quantity_sold, total_billed) = totals[&product_id];
            Some(BestSellerEntry {
                product: product.clone(),
                quantity_sold,
                total_billed,
            })
        })
        .collect();

    ranking.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    ranking.truncate(BEST_SELLERS_LIMIT);
    ranking
}

fn low_stock(materials: &[Material]) -> Vec<LowStockEntry> {
    let hundred = Decimal::ONE_HUNDRED;
    let mut alerts: Vec<LowStockEntry> = materials
        .iter()
        .filter(|m| m.is_low_stock())
        .map(|m| LowStockEntry {
            material: m.clone(),
            percent_of_minimum: m.stock / m.minimum_stock * hundred,
        })
        .collect();

    alerts.sort_by(|a, b| a.percent_of_minimum.cmp(&b.percent_of_minimum));
    alerts
}

fn recent_sales(sales: &[&Quote], now: DateTime<Utc>) -> Vec<SaleEntry> {
    let since = now - Duration::days(RECENT_SALES_DAYS);
    let mut entries: Vec<SaleEntry> = sales
        .iter()
        .filter(|q| q.created_at > since)
        .map(|q| SaleEntry {
            date: q.created_at.date_naive(),
            value: q.total_value,
        })
        .collect();

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    entries
}

fn sales_cost(
    sales: &[&Quote],
    products: &HashMap<Uuid, Product>,
    materials: &HashMap<Uuid, Material>,
) -> Decimal {
    let mut total = Decimal::ZERO;

    for item in sales.iter().flat_map(|q| q.items.iter()) {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };
        // SkipMissing nunca falha
        let components =
            resolve_composition(product, materials, ReferencePolicy::SkipMissing).unwrap_or_default();
        for component in components {
            let unit_cost = component.material.unit_cost.unwrap_or(Decimal::ZERO);
            total += unit_cost * component.quantity_per_unit * Decimal::from(item.quantity);
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{inventory::CompositionEntry, quotes::QuoteItem};
    use chrono::NaiveDate;

    fn material(stock: i64, minimum: i64, cost: Option<Decimal>) -> Material {
        let now = Utc::now();
        Material {
            id: Uuid::new_v4(),
            name: "Tinta".to_string(),
            stock: Decimal::from(stock),
            minimum_stock: Decimal::from(minimum),
            unit: "ml".to_string(),
            unit_cost: cost,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(name: &str, price: i64, composition: Vec<CompositionEntry>) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: Decimal::from(price),
            category: None,
            composition,
            created_at: now,
            updated_at: now,
        }
    }

    fn quote(status: QuoteStatus, items: Vec<QuoteItem>, created_at: DateTime<Utc>) -> Quote {
        Quote {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            total_value: Quote::items_total(&items),
            items,
            status,
            notes: None,
            cancellation_reason: None,
            valid_until: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_totals_by_status() {
        let now = Utc::now();
        let p = product("Caneca", 25, vec![]);
        let quotes = vec![
            quote(QuoteStatus::Paid, vec![QuoteItem::new(p.id, 2, p.price)], now),
            quote(QuoteStatus::InProgress, vec![QuoteItem::new(p.id, 1, p.price)], now),
            quote(QuoteStatus::Draft, vec![QuoteItem::new(p.id, 9, p.price)], now),
            quote(QuoteStatus::Cancelled, vec![QuoteItem::new(p.id, 4, p.price)], now),
        ];

        let m = compute_metrics(&quotes, &[p.clone()], &[], now);
        assert_eq!(m.total_billed, Decimal::from(50));
        assert_eq!(m.to_be_billed, Decimal::from(25));
        assert_eq!(m.open_quotes, 1);
        assert_eq!(m.best_sellers.len(), 1);
        assert_eq!(m.best_sellers[0].quantity_sold, 3);
        assert_eq!(m.best_sellers[0].total_billed, Decimal::from(75));
    }

    #[test]
    fn test_cost_and_profit() {
        let now = Utc::now();
        let ink = material(50, 10, Some(Decimal::new(15, 2)));
        let free = material(50, 10, None);
        let mug = product(
            "Caneca",
            25,
            vec![
                CompositionEntry { material_id: ink.id, quantity_per_unit: Decimal::from(5) },
                CompositionEntry { material_id: free.id, quantity_per_unit: Decimal::ONE },
                CompositionEntry { material_id: Uuid::new_v4(), quantity_per_unit: Decimal::ONE },
            ],
        );
        let quotes = vec![quote(QuoteStatus::Paid, vec![QuoteItem::new(mug.id, 2, mug.price)], now)];

        let m = compute_metrics(&quotes, &[mug], &[ink, free], now);
        // 0.15 * 5 * 2
        assert_eq!(m.total_cost, Decimal::new(150, 2));
        assert_eq!(m.total_profit, Decimal::new(4850, 2));
    }

    #[test]
    fn test_best_sellers_ranking_and_limit() {
        let now = Utc::now();
        let products: Vec<Product> = (0..7).map(|i| product(&format!("P{i}"), 10, vec![])).collect();
        let items: Vec<QuoteItem> = products
            .iter()
            .enumerate()
            .map(|(i, p)| QuoteItem::new(p.id, i as u32 + 1, p.price))
            .collect();
        let mut with_ghost = items.clone();
        with_ghost.push(QuoteItem::new(Uuid::new_v4(), 100, Decimal::ONE));
        let quotes = vec![quote(QuoteStatus::InProgress, with_ghost, now)];

        let m = compute_metrics(&quotes, &products, &[], now);
        assert_eq!(m.best_sellers.len(), 5);
        assert_eq!(m.best_sellers[0].product.name, "P6");
        assert_eq!(m.best_sellers[4].product.name, "P2");
    }

    #[test]
    fn test_low_stock_sorted_most_depleted_first() {
        let half = material(5, 10, None);
        let empty = material(0, 10, None);
        let fine = material(20, 10, None);
        let no_minimum = material(0, 0, None);

        let m = compute_metrics(&[], &[], &[half.clone(), empty.clone(), fine, no_minimum], Utc::now());
        assert_eq!(m.low_stock.len(), 2);
        assert_eq!(m.low_stock[0].material.id, empty.id);
        assert_eq!(m.low_stock[0].percent_of_minimum, Decimal::ZERO);
        assert_eq!(m.low_stock[1].percent_of_minimum, Decimal::from(50));
    }

    #[test]
    fn test_recent_sales_window_and_order() {
        let now = Utc::now();
        let p = product("Caneca", 25, vec![]);
        let item = || vec![QuoteItem::new(p.id, 1, p.price)];
        let quotes = vec![
            quote(QuoteStatus::Paid, item(), now - Duration::days(5)),
            quote(QuoteStatus::InProgress, item(), now - Duration::days(1)),
            quote(QuoteStatus::Paid, item(), now - Duration::days(40)),
            quote(QuoteStatus::Draft, item(), now),
        ];

        let m = compute_metrics(&quotes, &[p.clone()], &[], now);
        assert_eq!(m.recent_sales.len(), 2);
        assert_eq!(m.recent_sales[0].date, (now - Duration::days(1)).date_naive());
        assert_eq!(m.recent_sales[1].date, (now - Duration::days(5)).date_naive());
    }

    #[test]
    fn test_metrics_are_idempotent() {
        let now = Utc::now();
        let ink = material(8, 10, Some(Decimal::ONE));
        let mug = product(
            "Caneca",
            25,
            vec![CompositionEntry { material_id: ink.id, quantity_per_unit: Decimal::from(2) }],
        );
        let quotes = vec![quote(QuoteStatus::Paid, vec![QuoteItem::new(mug.id, 3, mug.price)], now)];
        let products = vec![mug];
        let materials = vec![ink];

        assert_eq!(
            compute_metrics(&quotes, &products, &materials, now),
            compute_metrics(&quotes, &products, &materials, now)
        );
    }
}
