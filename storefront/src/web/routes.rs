// storefront/src/web/routes.rs

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{auth_handlers, directory_handlers, order_handlers, product_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "store": app_state.store.backend_name(),
  }))
}

// Extractor failures surface as the same 400 body as field validation.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::invalid("body", err.to_string()).into()
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::invalid("query", err.to_string()).into()
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::invalid("path", err.to_string()).into()
}

/// Mounts the whole `/api/v1` surface, including extractor error handling.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api/v1")
        .route("/health", web::get().to(health_check_handler))
        .service(
          web::scope("/orders")
            .service(
              web::resource("")
                .route(web::post().to(order_handlers::create_order_handler))
                .route(web::get().to(order_handlers::list_orders_handler)),
            )
            .service(
              web::resource("/{order_id}")
                .route(web::get().to(order_handlers::get_order_handler))
                .route(web::patch().to(order_handlers::update_order_handler))
                .route(web::delete().to(order_handlers::delete_order_handler)),
            ),
        )
        .service(
          web::scope("/products")
            .service(
              web::resource("")
                .route(web::get().to(product_handlers::list_products_handler))
                .route(web::post().to(product_handlers::create_product_handler)),
            )
            .service(
              web::resource("/{product_id}")
                .route(web::get().to(product_handlers::get_product_handler))
                .route(web::patch().to(product_handlers::update_product_handler)),
            ),
        )
        .route("/categories", web::get().to(product_handlers::list_categories_handler))
        .service(
          web::scope("/customers")
            .service(
              web::resource("")
                .route(web::get().to(directory_handlers::list_customers_handler))
                .route(web::post().to(directory_handlers::create_customer_handler)),
            )
            .route("/{customer_id}", web::get().to(directory_handlers::get_customer_handler)),
        )
        .service(
          web::resource("/managers")
            .route(web::get().to(directory_handlers::list_managers_handler))
            .route(web::post().to(directory_handlers::create_manager_handler)),
        )
        .service(web::scope("/auth").route("/signin", web::post().to(auth_handlers::signin_handler))),
    );
}
