//! Route definitions for the Pharmacy Chain Management Platform

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
///
/// The auth middleware needs the application state for the JWT secret, so
/// the protected groups share one `from_fn_with_state` layer.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        // User administration
        .nest("/users", user_routes())
        // Pharmacy branches
        .nest("/pharmacies", pharmacy_routes())
        // Suppliers and quick quotes
        .nest("/suppliers", supplier_routes())
        // Supplier price lists
        .nest("/price-lists", price_list_routes())
        // Inventory
        .nest("/inventory", inventory_routes())
        // Clients
        .nest("/clients", client_routes())
        // Sales
        .nest("/sales", sale_routes())
        // Purchase orders
        .nest("/orders", order_routes())
        // Price comparison
        .nest("/comparison", comparison_routes())
        // Reports
        .nest("/reports", report_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public except /me)
        .nest("/auth", auth_routes(state))
        .merge(protected)
}

/// Authentication routes (public except /me)
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected_auth_routes(state))
}

fn protected_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User administration routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::deactivate_user),
        )
}

/// Pharmacy branch routes (protected)
fn pharmacy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pharmacies).post(handlers::create_pharmacy))
        .route(
            "/:pharmacy_id",
            get(handlers::get_pharmacy)
                .put(handlers::update_pharmacy)
                .delete(handlers::delete_pharmacy),
        )
        .route(
            "/:pharmacy_id/daily-discount",
            get(handlers::get_daily_discount).put(handlers::set_daily_discount),
        )
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route("/statistics", get(handlers::get_supplier_statistics))
        .route("/prices/:code", get(handlers::list_prices_for_code))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::deactivate_supplier),
        )
        .route("/:supplier_id/reactivate", post(handlers::reactivate_supplier))
        .route(
            "/:supplier_id/prices",
            get(handlers::list_supplier_prices).post(handlers::upsert_supplier_price),
        )
        .route(
            "/:supplier_id/prices/:price_id",
            delete(handlers::delete_supplier_price),
        )
}

/// Supplier price list routes (protected)
fn price_list_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(handlers::list_suppliers_with_lists))
        .route(
            "/:supplier_id",
            get(handlers::list_offers).post(handlers::upsert_offer),
        )
        .route("/:supplier_id/upload", post(handlers::upload_price_list))
        .route("/:supplier_id/items/:item_id", delete(handlers::delete_offer))
}

/// Inventory routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory).post(handlers::create_inventory_item))
        .route("/search", get(handlers::search_inventory))
        .route(
            "/:item_id",
            get(handlers::get_inventory_item)
                .put(handlers::update_inventory_item)
                .delete(handlers::delete_inventory_item),
        )
}

/// Client routes (protected)
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route(
            "/:client_id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
}

/// Sales routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route("/summary", get(handlers::sales_summary))
        .route("/:sale_id", get(handlers::get_sale))
}

/// Purchase order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_orders))
        .route("/history/:code", get(handlers::get_purchase_history))
        .route("/last-price/:code", get(handlers::get_last_purchase_price))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
        .route("/:order_id/receive", post(handlers::receive_order))
        .route("/:order_id/items", put(handlers::update_order_items))
}

/// Price comparison routes (protected)
fn comparison_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::compare_prices))
        .route("/cascade", post(handlers::evaluate_discounts))
}

/// Report routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/shortages", get(handlers::shortage_report))
        .route("/shortages/statistics", get(handlers::shortage_statistics))
        .route("/overstock", get(handlers::overstock_report))
}
