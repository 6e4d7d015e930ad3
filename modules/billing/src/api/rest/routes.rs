use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount `/api/v1/customers` and `/api/v1/invoices` onto `router`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let v1 = Router::new()
        .route(
            "/customers",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/invoices/bulk", post(handlers::bulk_create_invoices))
        .route(
            "/invoices/{id}",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice),
        )
        .layer(Extension(service));

    router.nest("/api/v1", v1)
}
