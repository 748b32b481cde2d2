// src/services/seed.rs

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ClientRepository, MaterialRepository, ProductRepository, QuoteRepository, RecordStore,
        WriteBatch,
    },
    models::{
        crm::Client,
        inventory::{CompositionEntry, Material, Product},
        quotes::{Quote, QuoteItem, QuoteStatus},
    },
};

/// Cadastra os dados de demonstração se ainda não houver clientes.
/// Retorna `true` quando os dados foram inseridos.
pub async fn seed_demo_data(store: Arc<dyn RecordStore>) -> Result<bool, AppError> {
    let clients = ClientRepository::new(store.clone());
    if !clients.get_all().await?.is_empty() {
        tracing::info!("🌱 Dados já existentes; seed ignorado.");
        return Ok(false);
    }

    let now = Utc::now();
    let mut batch = WriteBatch::new();

    // --- Materiais ---
    let cyan = material("Tinta Sublimática Ciano", 50, 10, "ml", Decimal::new(15, 2), now);
    let magenta = material("Tinta Sublimática Magenta", 45, 10, "ml", Decimal::new(15, 2), now);
    let paper = material("Papel Transfer", 100, 20, "un", Decimal::new(250, 2), now);
    let vinyl = material("Vinil Branco", 15, 5, "m", Decimal::new(1200, 2), now);
    for m in [&cyan, &magenta, &paper, &vinyl] {
        MaterialRepository::stage_save(&mut batch, m)?;
    }

    // --- Produtos ---
    let mug = product(
        "Caneca Personalizada",
        "Caneca branca com impressão sublimática",
        25,
        "Brindes",
        vec![
            (cyan.id, Decimal::from(5)),
            (magenta.id, Decimal::from(5)),
            (paper.id, Decimal::ONE),
        ],
        now,
    );
    let sticker = product(
        "Adesivo Personalizado A4",
        "Adesivo cortado em vinil no tamanho A4",
        15,
        "Adesivos",
        vec![(vinyl.id, Decimal::new(5, 1))],
        now,
    );
    let banner = product(
        "Banner Personalizado",
        "Banner impresso em lona",
        80,
        "Comunicação Visual",
        vec![(cyan.id, Decimal::from(20)), (magenta.id, Decimal::from(15))],
        now,
    );
    for p in [&mug, &sticker, &banner] {
        ProductRepository::stage_save(&mut batch, p)?;
    }

    // --- Clientes ---
    let joao = client(
        "João Silva",
        "joao@email.com",
        "(11) 99999-9999",
        Some("Rua das Flores, 123 - São Paulo/SP"),
        now,
    );
    let maria = client("Maria Santos", "maria@email.com", "(11) 88888-8888", None, now);
    let xyz = client(
        "Empresa XYZ Ltda",
        "contato@empresaxyz.com",
        "(11) 3333-4444",
        Some("Av. Paulista, 1000 - São Paulo/SP"),
        now,
    );
    for c in [&joao, &maria, &xyz] {
        ClientRepository::stage_save(&mut batch, c)?;
    }

    // --- Orçamentos ---
    let quotes = [
        quote(
            joao.id,
            QuoteItem::new(mug.id, 2, mug.price),
            QuoteStatus::Paid,
            "Canecas com logo da empresa",
            now - Duration::days(5),
            now,
        ),
        quote(
            maria.id,
            QuoteItem::new(sticker.id, 10, sticker.price),
            QuoteStatus::InProgress,
            "Adesivos para decoração",
            now - Duration::days(2),
            now,
        ),
        quote(
            xyz.id,
            QuoteItem::new(banner.id, 1, banner.price),
            QuoteStatus::Draft,
            "Banner para evento corporativo",
            now,
            now,
        ),
    ];
    for q in &quotes {
        QuoteRepository::stage_save(&mut batch, q)?;
    }

    let total = batch.len();
    store.commit(batch).await?;
    tracing::info!("🌱 Dados de demonstração cadastrados ({} registros)", total);
    Ok(true)
}

fn material(
    name: &str,
    stock: i64,
    minimum: i64,
    unit: &str,
    cost: Decimal,
    now: DateTime<Utc>,
) -> Material {
    Material {
        id: Uuid::new_v4(),
        name: name.to_string(),
        stock: Decimal::from(stock),
        minimum_stock: Decimal::from(minimum),
        unit: unit.to_string(),
        unit_cost: Some(cost),
        created_at: now,
        updated_at: now,
    }
}

fn product(
    name: &str,
    description: &str,
    price: i64,
    category: &str,
    composition: Vec<(Uuid, Decimal)>,
    now: DateTime<Utc>,
) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: Some(description.to_string()),
        price: Decimal::from(price),
        category: Some(category.to_string()),
        composition: composition
            .into_iter()
            .map(|(material_id, quantity_per_unit)| CompositionEntry {
                material_id,
                quantity_per_unit,
            })
            .collect(),
        created_at: now,
        updated_at: now,
    }
}

fn client(name: &str, email: &str, phone: &str, address: Option<&str>, now: DateTime<Utc>) -> Client {
    Client {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        address: address.map(str::to_string),
        created_at: now,
    }
}

// Validade padrão: 30 dias
fn quote(
    client_id: Uuid,
    item: QuoteItem,
    status: QuoteStatus,
    notes: &str,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Quote {
    Quote {
        id: Uuid::new_v4(),
        client_id,
        total_value: item.total_value,
        items: vec![item],
        status,
        notes: Some(notes.to_string()),
        cancellation_reason: None,
        valid_until: (now + Duration::days(30)).date_naive(),
        created_at,
        updated_at: now,
    }
}
