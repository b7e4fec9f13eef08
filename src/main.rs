//! Coffee Store API - HTTP surface over the catalog and cart engine.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use coffee_store_api::catalog::ProductCatalog;
use coffee_store_api::domain::{Cart, Product, ProductKind};
use coffee_store_api::service::CartService;
use coffee_store_api::store::InMemoryCartStore;
use coffee_store_api::Error;

#[derive(Clone)]
struct AppState {
    products: Arc<ProductCatalog>,
    carts: CartService<Arc<ProductCatalog>, Arc<InMemoryCartStore>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let products = Arc::new(ProductCatalog::new());
    let carts = CartService::new(Arc::clone(&products), Arc::new(InMemoryCartStore::new()));
    let state = AppState { products, carts };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "coffee-store-api"})) }))
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/carts", post(create_cart))
        .route("/carts/:id", get(find_cart))
        .route("/carts/:id/items", post(add_cart_item))
        .route("/carts/:cart_id/items/:item_id", patch(edit_cart_item).delete(remove_cart_item))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    tracing::info!("coffee store api listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}

// =============================================================================
// Error shaping
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
    errors: Vec<String>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<String>,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: err.to_string(),
            errors: vec![],
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let messages = errors
            .field_errors()
            .values()
            .flat_map(|field| field.iter())
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            errors: messages,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: self.status.as_u16(),
            message: self.message,
            errors: self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// Product handlers
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
struct ProductInput {
    #[validate(length(min = 1, message = "Name is mandatory"))]
    name: String,
    #[validate(custom = "non_negative_price")]
    price: Decimal,
    #[serde(rename = "type")]
    kind: ProductKind,
}

fn non_negative_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        let mut error = ValidationError::new("price");
        error.message = Some("Price cannot be negative".into());
        return Err(error);
    }
    Ok(())
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products.find_all())
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state.products.find_by_id(id).ok_or(Error::ProductNotFound)?;
    Ok(Json(product))
}

async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    input.validate()?;
    let product = state.products.create(input.name, input.price, input.kind);
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    input.validate()?;
    let product = state.products.update(id, input.name, input.price)?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.products.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Cart handlers
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCartInput {
    drink_id: Uuid,
    #[serde(default)]
    toppings_id: HashSet<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCartItemInput {
    drink_id: Uuid,
    #[serde(default)]
    toppings_id: HashSet<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditCartItemInput {
    #[serde(default)]
    toppings_id: HashSet<Uuid>,
}

async fn find_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.carts.find_by_id(id).ok_or(Error::CartNotFound)?;
    Ok(Json(cart))
}

async fn create_cart(
    State(state): State<AppState>,
    Json(input): Json<CreateCartInput>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    let cart = state.carts.create(input.drink_id, &input.toppings_id)?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn add_cart_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AddCartItemInput>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    let cart = state.carts.add_item(id, input.drink_id, &input.toppings_id)?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn edit_cart_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<EditCartItemInput>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.carts.edit_item(cart_id, item_id, &input.toppings_id)?;
    Ok(Json(cart))
}

async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Cart>, ApiError> {
    let cart = state.carts.remove_item(cart_id, item_id)?;
    Ok(Json(cart))
}
