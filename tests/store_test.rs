// tests/store_test.rs
//
// Regras de estoque, busca, exclusão e permissão contra um Postgres de verdade.
// Cada teste recebe um banco novo com as migrações aplicadas (DATABASE_URL).

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use backoffice::{
    common::{
        error::AppError,
        pagination::{ListQuery, PageRequest},
        storage::DiskStorage,
    },
    config::{AppState, Settings},
    db::UserRepository,
    middleware::{context::RequestContext, rbac::Permissions},
    models::{
        agency::{CreateAgencyPayload, UpdateAgencyPayload},
        auth::Claims,
        inventory::StockMoveKind,
        product::{AddProductVariantPayload, CreateProductPayload, UpdateProductPayload},
        shipment::{AddShipmentVariantPayload, CreateShipmentPayload},
    },
    routes::build_router,
};

const JWT_SECRET: &str = "segredo-de-teste";

fn settings() -> Settings {
    Settings {
        database_url: String::new(),
        jwt_secret: JWT_SECRET.into(),
        bind_addr: "127.0.0.1:0".into(),
        db_max_connections: 1,
        storage_dir: std::env::temp_dir().join("backoffice-store-test"),
        storage_url: "/storage".into(),
        max_logo_bytes: 1024,
    }
}

fn app_state(pool: PgPool) -> AppState {
    let settings = settings();
    let storage = Arc::new(DiskStorage::new(&settings.storage_dir, settings.storage_url.clone()));
    AppState::with_pool(pool, &settings, storage)
}

/// Empresa + depósito + closet novos. Devolve o id do closet.
async fn seed_closet(pool: &PgPool, name: &str) -> Uuid {
    let warehouse_id: Uuid =
        sqlx::query_scalar("INSERT INTO warehouses (name) VALUES ($1) RETURNING id")
            .bind(format!("Depósito {name}"))
            .fetch_one(pool)
            .await
            .unwrap();
    let company_id: Uuid =
        sqlx::query_scalar("INSERT INTO companies (name, abbreviation) VALUES ($1, 'EMP') RETURNING id")
            .bind(format!("Empresa {name}"))
            .fetch_one(pool)
            .await
            .unwrap();
    sqlx::query_scalar(
        "INSERT INTO closets (company_id, warehouse_id, name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(company_id)
    .bind(warehouse_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Usuário com o closet ativo; `admin` recebe todas as permissões.
async fn seed_user(pool: &PgPool, email: &str, closet_id: Uuid, admin: bool) -> Uuid {
    let user_id: Uuid = sqlx::query_scalar("INSERT INTO users (name, email) VALUES ($1, $1) RETURNING id")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO closet_users (closet_id, user_id, active) VALUES ($1, $2, TRUE)")
        .bind(closet_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();

    if admin {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) SELECT $1, id FROM roles WHERE name = 'admin'",
        )
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    }
    user_id
}

/// O mesmo contexto que o `context_guard` montaria para o usuário.
async fn context_for(pool: &PgPool, user_id: Uuid) -> RequestContext {
    let users = UserRepository::new(pool.clone());
    RequestContext {
        user: users.find_by_id(user_id).await.unwrap().unwrap(),
        closet: users.active_closet(user_id).await.unwrap(),
        permissions: Permissions::new(users.permission_slugs(user_id).await.unwrap()),
    }
}

async fn admin_context(pool: &PgPool) -> RequestContext {
    let closet_id = seed_closet(pool, "Loja Centro").await;
    let user_id = seed_user(pool, "admin@example.com", closet_id, true).await;
    context_for(pool, user_id).await
}

async fn reference_id(pool: &PgPool, sql: &str) -> Uuid {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

fn product_payload(name: &str, sku: &str) -> CreateProductPayload {
    CreateProductPayload {
        name: name.into(),
        sku: sku.into(),
        desc: Some("Algodão".into()),
        price: Decimal::new(5990, 2),
    }
}

async fn levels(pool: &PgPool, variant_id: Uuid) -> (i32, i32) {
    sqlx::query_as("SELECT in_stock, in_reserve FROM inventories WHERE variant_id = $1")
        .bind(variant_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn count(pool: &PgPool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

/// Produto com uma variante M/Azul e 10 unidades no closet do contexto.
async fn stocked_variant(pool: &PgPool, state: &AppState, ctx: &RequestContext) -> Uuid {
    let product = state
        .product_service
        .store(ctx, product_payload("Camiseta Básica", "CAM-BAS"))
        .await
        .unwrap();
    let payload = AddProductVariantPayload {
        size_id: reference_id(pool, "SELECT id FROM sizes WHERE value = 'M'").await,
        color_id: reference_id(pool, "SELECT id FROM colors WHERE name = 'Azul'").await,
    };
    let variant = state.product_service.add_variant(ctx, product.id, payload).await.unwrap();

    sqlx::query("UPDATE inventories SET in_stock = 10 WHERE variant_id = $1")
        .bind(variant.id)
        .execute(pool)
        .await
        .unwrap();
    variant.id
}

// ---
// Remessas e estoque
// ---

#[sqlx::test(migrations = "./migrations")]
async fn adding_the_same_variant_twice_reserves_once(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;
    let variant_id = stocked_variant(&pool, &state, &ctx).await;

    let shipment = state
        .shipment_service
        .store(&ctx, CreateShipmentPayload { reference: "REM-1".into(), notes: None })
        .await
        .unwrap();

    let add = |quantity| AddShipmentVariantPayload { variant_id, quantity };

    let first = state.shipment_service.add_variant(&ctx, shipment.id, add(3)).await.unwrap();
    assert!(first);
    assert_eq!(levels(&pool, variant_id).await, (7, 3));

    let second = state.shipment_service.add_variant(&ctx, shipment.id, add(3)).await.unwrap();
    assert!(!second);
    assert_eq!(levels(&pool, variant_id).await, (7, 3));

    let pivot_rows = count(
        &pool,
        "SELECT COUNT(*) FROM shipment_variants WHERE shipment_id = $1",
        shipment.id,
    )
    .await;
    assert_eq!(pivot_rows, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn removing_a_variant_returns_the_reservation(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;
    let variant_id = stocked_variant(&pool, &state, &ctx).await;

    let shipment = state
        .shipment_service
        .store(&ctx, CreateShipmentPayload { reference: "REM-2".into(), notes: None })
        .await
        .unwrap();
    state
        .shipment_service
        .add_variant(&ctx, shipment.id, AddShipmentVariantPayload { variant_id, quantity: 3 })
        .await
        .unwrap();

    let released = state.shipment_service.remove_variant(&ctx, shipment.id, variant_id).await.unwrap();
    assert_eq!(released, 3);
    assert_eq!(levels(&pool, variant_id).await, (10, 0));

    // Variante que já não está na remessa: nada muda
    let again = state.shipment_service.remove_variant(&ctx, shipment.id, variant_id).await.unwrap();
    assert_eq!(again, 0);
    assert_eq!(levels(&pool, variant_id).await, (10, 0));

    let moves = state
        .inventory_service
        .stock_moves(&ctx, PageRequest::new(None, None))
        .await
        .unwrap();
    assert_eq!(moves.total, 2);
    assert_eq!(moves.data[0].kind, StockMoveKind::Release);
    assert_eq!(moves.data[1].kind, StockMoveKind::Reserve);
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_inventory_rolls_back_the_link(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let product = state
        .product_service
        .store(&ctx, product_payload("Boné", "BON"))
        .await
        .unwrap();
    // Variante sem linha de inventário no closet
    let variant_id: Uuid =
        sqlx::query_scalar("INSERT INTO variants (product_id, sku) VALUES ($1, 'BON-U-Preto') RETURNING id")
            .bind(product.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let shipment = state
        .shipment_service
        .store(&ctx, CreateShipmentPayload { reference: "REM-3".into(), notes: None })
        .await
        .unwrap();

    let result = state
        .shipment_service
        .add_variant(&ctx, shipment.id, AddShipmentVariantPayload { variant_id, quantity: 1 })
        .await;
    assert!(matches!(result, Err(AppError::NotFound("inventory"))));

    let pivot_rows = count(
        &pool,
        "SELECT COUNT(*) FROM shipment_variants WHERE shipment_id = $1",
        shipment.id,
    )
    .await;
    assert_eq!(pivot_rows, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn shipments_of_another_closet_are_not_found(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let shipment = state
        .shipment_service
        .store(&ctx, CreateShipmentPayload { reference: "REM-4".into(), notes: None })
        .await
        .unwrap();

    let other_closet = seed_closet(&pool, "Loja Norte").await;
    let other_user = seed_user(&pool, "outra@example.com", other_closet, true).await;
    let other = context_for(&pool, other_user).await;

    let details = state.shipment_service.details(&other, shipment.id).await;
    assert!(matches!(details, Err(AppError::NotFound("shipment"))));

    let destroyed = state.shipment_service.destroy(&other, shipment.id).await;
    assert!(matches!(destroyed, Err(AppError::NotFound("shipment"))));

    // Continua visível para o dono
    assert!(state.shipment_service.details(&ctx, shipment.id).await.is_ok());
}

// ---
// Variantes de produto
// ---

#[sqlx::test(migrations = "./migrations")]
async fn unknown_size_or_color_creates_nothing(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let product = state
        .product_service
        .store(&ctx, product_payload("Calça Jeans", "CAL-JEA"))
        .await
        .unwrap();
    let size_id = reference_id(&pool, "SELECT id FROM sizes WHERE value = 'G'").await;
    let color_id = reference_id(&pool, "SELECT id FROM colors WHERE name = 'Preto'").await;

    let missing_size = state
        .product_service
        .add_variant(&ctx, product.id, AddProductVariantPayload { size_id: Uuid::new_v4(), color_id })
        .await;
    assert!(matches!(missing_size, Err(AppError::NotFound("size"))));

    let missing_color = state
        .product_service
        .add_variant(&ctx, product.id, AddProductVariantPayload { size_id, color_id: Uuid::new_v4() })
        .await;
    assert!(matches!(missing_color, Err(AppError::NotFound("color"))));

    let variants = count(&pool, "SELECT COUNT(*) FROM variants WHERE product_id = $1", product.id).await;
    assert_eq!(variants, 0);

    // Com referências válidas: variante, inventório zerado e as duas variações
    let variant = state
        .product_service
        .add_variant(&ctx, product.id, AddProductVariantPayload { size_id, color_id })
        .await
        .unwrap();
    assert_eq!(variant.sku, "CAL-JEA-G-Preto");
    assert_eq!(levels(&pool, variant.id).await, (0, 0));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM variations WHERE variant_id = $1", variant.id).await,
        2
    );
}

// ---
// Busca, exclusão e atualização
// ---

#[sqlx::test(migrations = "./migrations")]
async fn search_returns_only_matching_products(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    for (name, sku) in [("Camiseta Azul", "CAM-AZ"), ("Calça Jeans", "CAL-JE"), ("Camiseta Preta", "CAM-PR")] {
        state.product_service.store(&ctx, product_payload(name, sku)).await.unwrap();
    }

    let query = ListQuery { search: Some("camiseta".into()), ..Default::default() };
    let page = state.product_service.list(&ctx, &query).await.unwrap();

    assert_eq!(page.items.total, 2);
    assert!(page.items.data.iter().all(|row| row.item.name.starts_with("Camiseta")));
}

#[sqlx::test(migrations = "./migrations")]
async fn deleted_product_leaves_the_list_and_details(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let product = state
        .product_service
        .store(&ctx, product_payload("Meia", "MEI"))
        .await
        .unwrap();

    let name = state.product_service.destroy(&ctx, product.id).await.unwrap();
    assert_eq!(name, "Meia");

    let page = state.product_service.list(&ctx, &ListQuery::default()).await.unwrap();
    assert!(page.items.data.iter().all(|row| row.item.id != product.id));

    let details = state.product_service.details(&ctx, product.id).await;
    assert!(matches!(details, Err(AppError::NotFound("product"))));
}

#[sqlx::test(migrations = "./migrations")]
async fn empty_description_on_update_keeps_the_current_one(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let product = state
        .product_service
        .store(&ctx, product_payload("Jaqueta", "JAQ"))
        .await
        .unwrap();

    let patch = UpdateProductPayload { desc: Some("   ".into()), ..Default::default() };
    let updated = state.product_service.update(&ctx, product.id, patch).await.unwrap();

    assert_eq!(updated.description.as_deref(), Some("Algodão"));
}

#[sqlx::test(migrations = "./migrations")]
async fn forbidden_update_changes_nothing(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let agency = state
        .agency_service
        .store(&ctx, CreateAgencyPayload { name: "Agência Central".into(), email: "a@agencia.com".into() })
        .await
        .unwrap();

    let closet_id = ctx.closet_id().unwrap();
    let viewer_id = seed_user(&pool, "leitor@example.com", closet_id, false).await;
    let viewer = context_for(&pool, viewer_id).await;

    let patch = UpdateAgencyPayload { name: Some("Outro Nome".into()), email: None };
    let result = state.agency_service.update(&viewer, agency.id, patch).await;
    assert!(matches!(result, Err(AppError::Forbidden { .. })));

    let stored: String = sqlx::query_scalar("SELECT name FROM agencies WHERE id = $1")
        .bind(agency.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "Agência Central");
}

#[sqlx::test(migrations = "./migrations")]
async fn reference_lists_come_seeded(pool: PgPool) {
    let state = app_state(pool.clone());
    let ctx = admin_context(&pool).await;

    let form = state.product_service.create_form(&ctx).await.unwrap();
    assert!(form.sizes.iter().any(|s| s.value == "M"));
    assert!(form.colors.iter().any(|c| c.name == "Azul"));

    let form = state.company_service.create_form(&ctx).await.unwrap();
    assert!(form.countries.iter().any(|c| c.code == "BR"));
}

// ---
// Pela API
// ---

fn bearer(user_id: Uuid) -> String {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_ref())).unwrap();
    format!("Bearer {token}")
}

#[sqlx::test(migrations = "./migrations")]
async fn blank_product_fields_are_rejected_before_saving(pool: PgPool) {
    let ctx = admin_context(&pool).await;
    let app = build_router(app_state(pool.clone()));

    let response = app
        .oneshot(
            Request::post("/api/products")
                .header(header::AUTHORIZATION, bearer(ctx.user.id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"   ","sku":"  ","price":10}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(products, 0);
}
