use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    http::StatusCode,
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::entities::product::{self, Entity as ProductEntity};
use crate::middleware::logging::{to_response, ApiError};

const PRODUCT_NOT_FOUND: &str = "Product not found";
const PRODUCT_NOT_RESTORABLE: &str = "Product not found or not deleted";

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route("/products/deleted", get(get_deleted_products))
        .route("/products/search/:keyword", get(search_products))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/restore/:id", patch(restore_product))
        .layer(Extension(db))
}

async fn get_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    list_by_deleted_flag(&db, false).await
}

async fn get_deleted_products(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    list_by_deleted_flag(&db, true).await
}

async fn list_by_deleted_flag(db: &DatabaseConnection, deleted: bool) -> Result<Response, ApiError> {
    let products = ProductEntity::find()
        .filter(product::Column::IsDeleted.eq(deleted))
        .all(db)
        .await
        .map_err(read_failure)?;

    Ok(to_response((StatusCode::OK, Json(products)), Ok(())))
}

// No is_deleted filter here: soft-deleted rows stay addressable by id.
async fn get_product(
    path: Result<Path<String>, PathRejection>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let id = product_id(path, PRODUCT_NOT_FOUND)?;
    let product = ProductEntity::find_by_id(id)
        .one(&*db)
        .await
        .map_err(read_failure)?
        .ok_or(ApiError::NotFound(PRODUCT_NOT_FOUND))?;

    Ok(to_response((StatusCode::OK, Json(product)), Ok(())))
}

// LOWER is ASCII-only on SQLite, so non-ASCII letters only fold on MySQL.
async fn search_products(
    path: Result<Path<String>, PathRejection>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let Path(keyword) = path?;
    let pattern = format!("%{}%", keyword.to_lowercase());
    let products = ProductEntity::find()
        .filter(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern))
        .all(&*db)
        .await
        .map_err(read_failure)?;

    Ok(to_response((StatusCode::OK, Json(products)), Ok(())))
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    RequiredFields::check(&body)?;

    let payload: CreateProduct =
        serde_json::from_value(body).map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let result = ProductEntity::insert(payload.into_active_model())
        .exec(&*db)
        .await?;

    Ok(to_response(
        (
            StatusCode::CREATED,
            Json(json!({
                "message": "Product created",
                "id": result.last_insert_id
            })),
        ),
        Ok(()),
    ))
}

// Overwrites all five columns; absent fields are written as NULL.
async fn update_product(
    path: Result<Path<String>, PathRejection>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    body: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = product_id(path, PRODUCT_NOT_FOUND)?;
    let Json(payload) = body?;

    let result = ProductEntity::update_many()
        .col_expr(product::Column::Name, Expr::value(payload.name))
        .col_expr(product::Column::Price, Expr::value(payload.price))
        .col_expr(product::Column::Discount, Expr::value(payload.discount))
        .col_expr(product::Column::ReviewCount, Expr::value(payload.review_count))
        .col_expr(product::Column::ImageUrl, Expr::value(payload.image_url))
        .filter(product::Column::Id.eq(id))
        .exec(&*db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ApiError::NotFound(PRODUCT_NOT_FOUND));
    }

    Ok(message(StatusCode::OK, "Product updated"))
}

async fn delete_product(
    path: Result<Path<String>, PathRejection>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let id = product_id(path, PRODUCT_NOT_FOUND)?;
    if set_deleted_flag(&db, id, true).await? == 0 {
        return Err(ApiError::NotFound(PRODUCT_NOT_FOUND));
    }

    Ok(message(StatusCode::OK, "Product soft deleted"))
}

// Only the affected-row count is checked, so restoring an active product succeeds.
async fn restore_product(
    path: Result<Path<String>, PathRejection>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Response, ApiError> {
    let id = product_id(path, PRODUCT_NOT_RESTORABLE)?;
    if set_deleted_flag(&db, id, false).await? == 0 {
        return Err(ApiError::NotFound(PRODUCT_NOT_RESTORABLE));
    }

    Ok(message(StatusCode::OK, "Product restored"))
}

async fn set_deleted_flag(db: &DatabaseConnection, id: i32, deleted: bool) -> Result<u64, ApiError> {
    let result = ProductEntity::update_many()
        .col_expr(product::Column::IsDeleted, Expr::value(deleted))
        .filter(product::Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// An id that is not an `i32` can never match a row, so it is reported as not found.
fn product_id(
    path: Result<Path<String>, PathRejection>,
    not_found: &'static str,
) -> Result<i32, ApiError> {
    path.ok()
        .and_then(|Path(raw)| raw.parse().ok())
        .ok_or(ApiError::NotFound(not_found))
}

fn message(status: StatusCode, message: &str) -> Response {
    to_response((status, Json(json!({ "message": message }))), Ok(()))
}

fn read_failure(err: sea_orm::DbErr) -> ApiError {
    tracing::error!(error = %err, "Failed to read products");
    ApiError::Internal
}

/// Presence check run on the raw body, before any field is type-checked.
#[derive(Deserialize, Validate)]
struct RequiredFields {
    #[validate(required)]
    name: Option<Value>,
    #[validate(required)]
    price: Option<Value>,
}

impl RequiredFields {
    fn check(body: &Value) -> Result<(), ApiError> {
        if !body.is_object() {
            return Err(ApiError::MissingFields);
        }

        RequiredFields::deserialize(body)
            .map_err(|_| ApiError::MissingFields)?
            .validate()
            .map_err(|_| ApiError::MissingFields)
    }
}

#[derive(Deserialize, Clone, Debug)]
struct CreateProduct {
    name: String,
    price: f64,
    discount: Option<f64>,
    review_count: Option<i32>,
    image_url: Option<String>,
}

impl CreateProduct {
    fn into_active_model(self) -> product::ActiveModel {
        product::ActiveModel {
            name: Set(self.name),
            price: Set(self.price),
            discount: Set(self.discount.unwrap_or(0.0)),
            review_count: Set(self.review_count.unwrap_or(0)),
            image_url: Set(self.image_url.unwrap_or_default()),
            is_deleted: Set(false),
            ..Default::default()
        }
    }
}

#[derive(Deserialize, Debug)]
struct UpdateProduct {
    name: Option<String>,
    price: Option<f64>,
    discount: Option<f64>,
    review_count: Option<i32>,
    image_url: Option<String>,
}
