use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery},
    http::StatusCode,
    response::Json,
    Extension,
};
use query_filter::FilterQuery;
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateInvoiceReq, CustomerReq, CustomerResource, InvoiceResource, ListParams, ListResponse,
    UpdateInvoiceReq,
};
use crate::api::rest::error::ProblemResponse;
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

fn filter_query(raw: Option<String>) -> FilterQuery {
    raw.as_deref().map(FilterQuery::parse).unwrap_or_default()
}

// ---- customers ----

/// List customers, filtered and optionally with their invoices
pub async fn list_customers(
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<ListParams>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ListResponse<CustomerResource>>> {
    info!("Listing customers with query: {:?}", raw);

    let page = svc.page(params.limit, params.offset);
    match svc
        .list_customers(&filter_query(raw), params.include_invoices, page)
        .await
    {
        Ok(customers) => Ok(Json(ListResponse {
            data: customers.into_iter().map(CustomerResource::from).collect(),
            limit: page.limit,
            offset: page.offset,
        })),
        Err(e) => {
            error!("Failed to list customers: {}", e);
            Err(e.into())
        }
    }
}

/// Get a specific customer by ID
pub async fn get_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<CustomerResource>> {
    info!("Getting customer with id: {}", id);

    match svc.get_customer(id, params.include_invoices).await {
        Ok(customer) => Ok(Json(CustomerResource::from(customer))),
        Err(e) => {
            error!("Failed to get customer {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// Create a new customer
pub async fn create_customer(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CustomerReq>,
) -> ApiResult<(StatusCode, Json<CustomerResource>)> {
    info!("Creating customer: {:?}", req.name);

    match svc.create_customer(req.into()).await {
        Ok(customer) => Ok((StatusCode::CREATED, Json(CustomerResource::from(customer)))),
        Err(e) => {
            error!("Failed to create customer: {}", e);
            Err(e.into())
        }
    }
}

/// Replace all fields of a customer
pub async fn update_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Json(req): Json<CustomerReq>,
) -> ApiResult<Json<CustomerResource>> {
    info!("Updating customer {}", id);

    match svc.update_customer(id, req.into()).await {
        Ok(customer) => Ok(Json(CustomerResource::from(customer))),
        Err(e) => {
            error!("Failed to update customer {}: {}", id, e);
            Err(e.into())
        }
    }
}

/// Delete a customer and its invoices
pub async fn delete_customer(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    info!("Deleting customer: {}", id);

    match svc.delete_customer(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete customer {}: {}", id, e);
            Err(e.into())
        }
    }
}

// ---- invoices ----

pub async fn list_invoices(
    Extension(svc): Extension<Arc<Service>>,
    Query(params): Query<ListParams>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<ListResponse<InvoiceResource>>> {
    info!("Listing invoices with query: {:?}", raw);

    let page = svc.page(params.limit, params.offset);
    match svc.list_invoices(&filter_query(raw), page).await {
        Ok(invoices) => Ok(Json(ListResponse {
            data: invoices.into_iter().map(InvoiceResource::from).collect(),
            limit: page.limit,
            offset: page.offset,
        })),
        Err(e) => {
            error!("Failed to list invoices: {}", e);
            Err(e.into())
        }
    }
}

pub async fn get_invoice(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<InvoiceResource>> {
    info!("Getting invoice with id: {}", id);

    match svc.get_invoice(id).await {
        Ok(invoice) => Ok(Json(InvoiceResource::from(invoice))),
        Err(e) => {
            error!("Failed to get invoice {}: {}", id, e);
            Err(e.into())
        }
    }
}

pub async fn create_invoice(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<CreateInvoiceReq>,
) -> ApiResult<(StatusCode, Json<InvoiceResource>)> {
    info!("Creating invoice for customer {}", req.customer_id);

    match svc.create_invoice(req.into()).await {
        Ok(invoice) => Ok((StatusCode::CREATED, Json(InvoiceResource::from(invoice)))),
        Err(e) => {
            error!("Failed to create invoice: {}", e);
            Err(e.into())
        }
    }
}

/// Create many invoices in one transaction
pub async fn bulk_create_invoices(
    Extension(svc): Extension<Arc<Service>>,
    Json(req): Json<Vec<CreateInvoiceReq>>,
) -> ApiResult<(StatusCode, Json<Vec<InvoiceResource>>)> {
    info!("Bulk creating {} invoices", req.len());

    let batch = req.into_iter().map(Into::into).collect();
    match svc.bulk_create_invoices(batch).await {
        Ok(invoices) => Ok((
            StatusCode::CREATED,
            Json(invoices.into_iter().map(InvoiceResource::from).collect()),
        )),
        Err(e) => {
            error!("Failed to bulk create invoices: {}", e);
            Err(e.into())
        }
    }
}

pub async fn update_invoice(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateInvoiceReq>,
) -> ApiResult<Json<InvoiceResource>> {
    info!("Updating invoice {}", id);

    match svc.update_invoice(id, req.into()).await {
        Ok(invoice) => Ok(Json(InvoiceResource::from(invoice))),
        Err(e) => {
            error!("Failed to update invoice {}: {}", id, e);
            Err(e.into())
        }
    }
}

pub async fn delete_invoice(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    info!("Deleting invoice: {}", id);

    match svc.delete_invoice(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete invoice {}: {}", id, e);
            Err(e.into())
        }
    }
}
