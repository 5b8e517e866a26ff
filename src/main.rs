mod commands;
mod config;
mod database;
mod error;
mod handlers;
mod models;


use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use dotenvy::dotenv;

use config::Config;
use database::{create_database_pool, run_migrations, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;

    let db = create_database_pool(&config).await?;
    if config.run_migrations {
        run_migrations(&db).await?;
    }

    let app = create_router(db);

    let addr = config.bind_addr();
    log::info!("Sales ledger API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router(db: Database) -> Router {
    Router::new()
        .route("/", get(handlers::root))

        // Agents
        .route("/api/agents", get(handlers::agents::agents_list).post(handlers::agents::create_agent))
        .route(
            "/api/agents/:id",
            get(handlers::agents::agent_detail)
                .put(handlers::agents::update_agent)
                .delete(handlers::agents::delete_agent),
        )

        // Inventory ledger
        .route("/api/inventory", get(handlers::inventory::inventory_list))
        .route("/api/inventory/agent/:id", get(handlers::inventory::inventory_for_agent))
        .route("/api/inventory/low/:threshold", get(handlers::inventory::low_inventory))
        .route("/api/inventory/restock", post(handlers::inventory::restock))

        // Orders
        .route("/api/orders", post(handlers::orders::place_order))
        .route("/api/orders/summary", get(handlers::orders::order_summaries))
        .route("/api/orders/agent/:id", get(handlers::orders::orders_for_agent))
        .route("/api/orders/sales-rep/:id", get(handlers::orders::orders_for_sales_rep))
        .route("/api/orders/:id/items", get(handlers::orders::order_items))
        .route("/api/orders/:id/status", patch(handlers::orders::update_status))

        // Catalog
        .route("/api/products", get(handlers::products::products_list).post(handlers::products::create_product))
        .route("/api/products/supplier/:id", get(handlers::products::products_for_supplier))
        .route("/api/products/analysis", get(handlers::products::sales_analysis))
        .route("/api/products/price-history", get(handlers::products::price_history))
        .route("/api/products/:id", put(handlers::products::update_product))

        // Directory
        .route("/api/users/agents", get(handlers::users::agents).post(handlers::users::create_agent))
        .route("/api/users/sales-reps", get(handlers::users::sales_reps).post(handlers::users::create_sales_rep))
        .route("/api/users/suppliers", get(handlers::users::suppliers))
        .route("/api/users/shops", get(handlers::users::shops).post(handlers::users::create_shop))
        .route("/api/users/shops/sales-rep/:id", get(handlers::users::shops_for_sales_rep))

        // Business intelligence
        .route("/api/bi/sales-forecast/:product_id", get(handlers::bi::sales_forecast))
        .route("/api/bi/generate-sales-forecast/:product_id", post(handlers::bi::generate_sales_forecast))
        .route("/api/bi/product-associations", get(handlers::bi::product_associations))
        .route("/api/bi/generate-product-associations", post(handlers::bi::generate_product_associations))
        .route("/api/bi/customer-segments", get(handlers::bi::customer_segments))
        .route("/api/bi/generate-customer-segments", post(handlers::bi::customer_segments))
        .route("/api/bi/product-recommendations/:shop_id", get(handlers::bi::product_recommendations))
        .route("/api/bi/generate-product-recommendations/:shop_id", post(handlers::bi::product_recommendations))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
        )
        .with_state(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Requests in these tests are rejected before the pool is ever used
    fn app() -> Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        create_router(db)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn root_reports_running() {
        let (status, body) = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Sales System API is running!");
    }

    #[tokio::test]
    async fn place_order_without_fields_returns_error_value() {
        let (status, body) = send(post_json("/api/orders", json!({ "agentId": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn wrongly_typed_order_field_returns_error_value() {
        let (status, body) = send(post_json(
            "/api/orders",
            json!({ "agentId": "one", "quantities": [1] }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("orderId").is_none());
        assert!(body["error"].as_str().unwrap().contains("agentId"));
    }

    #[tokio::test]
    async fn non_json_order_body_returns_error_value() {
        let request = Request::post("/api/orders")
            .header("content-type", "text/plain")
            .body(Body::from("agentId=1"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_path_id_returns_error_value() {
        let (status, body) =
            send(Request::get("/api/orders/abc/items").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_query_value_returns_error_value() {
        let (status, body) = send(
            Request::get("/api/bi/sales-forecast/1?interval=minute&minutes=soon")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn place_order_with_empty_cart_is_rejected() {
        let (status, body) = send(post_json(
            "/api/orders",
            json!({
                "agentId": 1, "shopId": 1, "salesRepId": 1,
                "paymentMethod": "PayPal", "paymentAmount": 0,
                "productIds": [], "quantities": [], "prices": []
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("orderId").is_none());
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn restock_of_zero_is_invalid() {
        let (status, body) = send(post_json(
            "/api/inventory/restock",
            json!({ "agent_id": 2, "product_id": 9, "quantity": 0 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Valid quantity is required" }));
    }

    #[tokio::test]
    async fn restock_requires_ids() {
        let (status, body) = send(post_json("/api/inventory/restock", json!({ "quantity": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Agent ID and Product ID are required" }));
    }

    #[tokio::test]
    async fn unknown_order_status_is_invalid() {
        let request = Request::patch("/api/orders/1/status")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "status": "Lost" }).to_string()))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
