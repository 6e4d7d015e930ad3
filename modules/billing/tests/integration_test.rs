use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;

use billing::{
    config::BillingConfig,
    domain::{error::DomainError, service::Service},
    factory::{seed, CustomerFactory, InvoiceFactory},
    model::{Invoice, InvoiceStatus, NewCustomer, NewInvoice},
    Billing,
};
use query_filter::FilterQuery;

/// Fresh migrated in-memory database per test
async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database")
}

async fn create_test_module() -> Billing {
    let billing = Billing::new(create_test_db().await, &BillingConfig::default());
    billing.migrate().await.expect("Failed to run migrations");
    billing
}

fn customer(name: &str, kind: &str, postal_code: &str) -> NewCustomer {
    NewCustomer {
        name: name.into(),
        kind: kind.into(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        address: "1 Main St".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        postal_code: postal_code.into(),
    }
}

fn invoice(customer_id: i32, amount: i64, status: InvoiceStatus, year: i32) -> NewInvoice {
    let billed_date = Utc.with_ymd_and_hms(year, 6, 1, 9, 0, 0).unwrap();
    NewInvoice {
        customer_id,
        amount,
        status,
        billed_date,
        paid_date: (status == InvoiceStatus::Paid).then(|| billed_date + chrono::Duration::days(3)),
    }
}

/// Two customers: Ada with three invoices, Acme with none.
async fn seed_fixture(svc: &Service) -> Result<(i32, i32)> {
    let ada = svc.create_customer(customer("Ada Lovelace", "I", "10001")).await?;
    let acme = svc.create_customer(customer("Acme LLC", "B", "90210")).await?;
    svc.bulk_create_invoices(vec![
        invoice(ada.id, 250, InvoiceStatus::Paid, 2021),
        invoice(ada.id, 750, InvoiceStatus::Billed, 2022),
        invoice(ada.id, 900, InvoiceStatus::Void, 2023),
    ])
    .await?;
    Ok((ada.id, acme.id))
}

async fn list_invoices(svc: &Service, raw: &str) -> Result<Vec<Invoice>, DomainError> {
    svc.list_invoices(&FilterQuery::parse(raw), svc.page(None, None))
        .await
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, String, Value) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, content_type, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_customer_crud_and_invoices_of() -> Result<()> {
    let svc = create_test_module().await.service();
    let (ada, acme) = seed_fixture(&svc).await?;

    let loaded = svc.get_customer(ada, false).await?;
    assert!(!loaded.invoices.is_loaded());

    let with = svc.get_customer(ada, true).await?;
    let ids: Vec<i32> = with.invoices.as_loaded().unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let of = svc.invoices_of(ada).await?;
    assert_eq!(of.iter().map(|i| i.id).collect::<Vec<_>>(), ids);
    assert!(svc.invoices_of(acme).await?.is_empty());

    let mut data = customer("Acme Corp", "B", "90211");
    data.city = "Portland".into();
    let updated = svc.update_customer(acme, data).await?;
    assert_eq!(updated.name, "Acme Corp");
    assert_eq!(updated.city, "Portland");

    assert!(matches!(
        svc.update_customer(999, customer("X", "I", "1")).await,
        Err(DomainError::CustomerNotFound { id: 999 })
    ));
    Ok(())
}

#[tokio::test]
async fn test_delete_customer_cascades_to_invoices() -> Result<()> {
    let svc = create_test_module().await.service();
    let (ada, _) = seed_fixture(&svc).await?;

    svc.delete_customer(ada).await?;
    let remaining = svc
        .list_invoices(&FilterQuery::new(), svc.page(None, None))
        .await?;
    assert!(remaining.is_empty());
    assert!(matches!(
        svc.delete_customer(ada).await,
        Err(DomainError::CustomerNotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_invoice_filters_against_sqlite() -> Result<()> {
    let svc = create_test_module().await.service();
    let (ada, _) = seed_fixture(&svc).await?;
    let page = svc.page(None, None);
    let list = |raw| list_invoices(&svc, raw);

    let over = list("amount[gt]=500").await?;
    assert_eq!(over.len(), 2);
    assert!(over.iter().all(|i| i.amount > 500));

    let paid = list("status=paid").await?;
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].status, InvoiceStatus::Paid);
    assert!(paid[0].paid_date.is_some());

    // disallowed operator and unknown parameter are dropped, not errors
    assert_eq!(list("status[gt]=paid&secret=1").await?.len(), 3);

    let not_void = list("status[ne]=void&amount[lte]=750").await?;
    assert_eq!(not_void.len(), 2);

    let mine = svc
        .list_invoices(&FilterQuery::new().bare("customerId", ada.to_string()), page)
        .await?;
    assert_eq!(mine.len(), 3);
    assert!(list("customerId=424242").await?.is_empty());

    let recent = list("billedDate[gte]=2022-01-01").await?;
    assert_eq!(recent.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_customer_filters_and_paging() -> Result<()> {
    let svc = create_test_module().await.service();
    seed_fixture(&svc).await?;

    let businesses = svc
        .list_customers(&FilterQuery::parse("type=B"), false, svc.page(None, None))
        .await?;
    assert_eq!(businesses.len(), 1);
    assert_eq!(businesses[0].name, "Acme LLC");

    let by_zip = svc
        .list_customers(&FilterQuery::parse("postalCode[lt]=50000"), true, svc.page(None, None))
        .await?;
    assert_eq!(by_zip.len(), 1);
    assert_eq!(by_zip[0].invoices.as_loaded().map(<[_]>::len), Some(3));

    let second = svc
        .list_customers(&FilterQuery::new(), false, svc.page(Some(1), Some(1)))
        .await?;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, "Acme LLC");
    Ok(())
}

#[tokio::test]
async fn test_bulk_insert_is_all_or_nothing() -> Result<()> {
    let svc = create_test_module().await.service();
    let (ada, _) = seed_fixture(&svc).await?;

    let res = svc
        .bulk_create_invoices(vec![
            invoice(ada, 300, InvoiceStatus::Billed, 2024),
            invoice(777, 300, InvoiceStatus::Billed, 2024),
        ])
        .await;
    assert!(matches!(res, Err(DomainError::Storage(_))), "{res:?}");

    let all = svc
        .list_invoices(&FilterQuery::new(), svc.page(None, None))
        .await?;
    assert_eq!(all.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_invoice_update_keeps_owner() -> Result<()> {
    let svc = create_test_module().await.service();
    let (ada, _) = seed_fixture(&svc).await?;
    let first = svc.invoices_of(ada).await?.remove(0);

    let paid_at = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
    let updated = svc
        .update_invoice(
            first.id,
            billing::model::InvoiceUpdate {
                amount: 999,
                status: InvoiceStatus::Paid,
                billed_date: first.billed_date,
                paid_date: Some(paid_at),
            },
        )
        .await?;
    assert_eq!(updated.customer_id, ada);
    assert_eq!(updated.amount, 999);
    assert_eq!(updated.paid_date, Some(paid_at));

    svc.delete_invoice(first.id).await?;
    assert!(matches!(
        svc.get_invoice(first.id).await,
        Err(DomainError::InvoiceNotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_factories_against_storage() -> Result<()> {
    let svc = create_test_module().await.service();

    let invoice = InvoiceFactory::seeded(42).create(&svc).await?;
    let parent = svc.get_customer(invoice.customer_id, true).await?;
    assert_eq!(parent.invoices.as_loaded().map(<[_]>::len), Some(1));

    let customer = CustomerFactory::seeded(1).create(&svc).await?;
    let batch = InvoiceFactory::seeded(2)
        .for_customer(customer.id)
        .create_many(&svc, 20)
        .await?;
    assert_eq!(batch.len(), 20);
    for inv in &batch {
        assert_eq!(inv.paid_date.is_some(), inv.status == InvoiceStatus::Paid);
    }

    let summary = seed(&svc, &[(3, 2), (2, 0)]).await?;
    assert_eq!(summary.customers, 5);
    assert_eq!(summary.invoices, 6);
    Ok(())
}

// ---- REST ----

#[tokio::test]
async fn test_rest_include_invoices() -> Result<()> {
    let billing = create_test_module().await;
    let (ada, acme) = seed_fixture(&billing.service()).await?;
    let router = billing.register_rest(Router::new());

    let (status, _, body) = send(&router, get("/api/v1/customers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 15);
    assert_eq!(body["offset"], 0);
    for c in body["data"].as_array().unwrap() {
        assert!(c.get("invoices").is_none(), "{c}");
        assert!(c.get("postalCode").is_some());
    }

    let (_, _, body) = send(&router, get("/api/v1/customers?includeInvoices=true")).await;
    let data = body["data"].as_array().unwrap();
    let by_id = |id: i32| data.iter().find(|c| c["id"] == id).unwrap();
    assert_eq!(by_id(ada)["invoices"].as_array().unwrap().len(), 3);
    assert_eq!(by_id(acme)["invoices"], json!([]));

    let (status, _, body) = send(&router, get(&format!("/api/v1/customers/{ada}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "I");
    assert!(body.get("invoices").is_none());
    Ok(())
}

#[tokio::test]
async fn test_rest_filtered_invoice_list() -> Result<()> {
    let billing = create_test_module().await;
    seed_fixture(&billing.service()).await?;
    let router = billing.register_rest(Router::new());

    let (status, _, body) = send(&router, get("/api/v1/invoices?amount%5Bgt%5D=500&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 1);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["amount"], 750);
    assert!(data[0]["paidDate"].is_null());
    assert!(data[0].get("customerId").is_some());

    let (_, _, body) = send(&router, get("/api/v1/invoices?status=paid")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_rest_offset_beyond_i64_is_clamped() -> Result<()> {
    let billing = create_test_module().await;
    seed_fixture(&billing.service()).await?;
    let router = billing.register_rest(Router::new());

    for uri in [
        "/api/v1/invoices?offset=18446744073709551615",
        "/api/v1/customers?offset=18446744073709551615&includeInvoices=true",
    ] {
        let (status, _, body) = send(&router, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        assert_eq!(body["offset"], i64::MAX, "{uri}");
        assert_eq!(body["data"], json!([]), "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn test_rest_create_update_delete() -> Result<()> {
    let billing = create_test_module().await;
    let router = billing.register_rest(Router::new());

    let (status, _, created) = send(
        &router,
        with_json(
            "POST",
            "/api/v1/customers",
            json!({
                "name": "Grace Hopper",
                "type": "I",
                "email": "grace@example.com",
                "address": "2 Navy Way",
                "city": "Arlington",
                "state": "VA",
                "postalCode": "22201"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, _, inv) = send(
        &router,
        with_json(
            "POST",
            "/api/v1/invoices",
            json!({
                "customerId": id,
                "amount": 400,
                "status": "billed",
                "billedDate": "2023-04-05T06:07:08Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(inv["billedDate"], "2023-04-05T06:07:08Z");

    let (status, _, bulk) = send(
        &router,
        with_json(
            "POST",
            "/api/v1/invoices/bulk",
            json!([
                { "customerId": id, "amount": 100, "status": "void", "billedDate": "2023-01-01T00:00:00Z" },
                { "customerId": id, "amount": 200, "status": "paid",
                  "billedDate": "2023-01-01T00:00:00Z", "paidDate": "2023-01-10T00:00:00Z" }
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bulk.as_array().unwrap().len(), 2);

    let (status, _, updated) = send(
        &router,
        with_json(
            "PUT",
            &format!("/api/v1/invoices/{}", inv["id"]),
            json!({
                "customerId": 12345,
                "amount": 450,
                "status": "paid",
                "billedDate": "2023-04-05T06:07:08Z",
                "paidDate": "2023-05-01T00:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["customerId"], id);
    assert_eq!(updated["status"], "paid");

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/customers/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&router, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&router, get("/api/v1/invoices")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_rest_errors_are_problem_json() -> Result<()> {
    let billing = create_test_module().await;
    let router = billing.register_rest(Router::new());

    let (status, ct, body) = send(&router, get("/api/v1/customers/41")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(ct, "application/problem+json");
    assert_eq!(body["status"], 404);

    let (status, ct, body) = send(
        &router,
        with_json(
            "POST",
            "/api/v1/invoices",
            json!({ "customerId": 1, "amount": 0, "status": "billed", "billedDate": "2023-01-01T00:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ct, "application/problem+json");
    assert_eq!(body["code"], "VALIDATION");

    // missing customer is caught by the foreign key
    let (status, ct, body) = send(
        &router,
        with_json(
            "POST",
            "/api/v1/invoices",
            json!({ "customerId": 404, "amount": 10, "status": "billed", "billedDate": "2023-01-01T00:00:00Z" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ct, "application/problem+json");
    assert!(!body["detail"].as_str().unwrap().contains("FOREIGN KEY"));
    Ok(())
}

#[tokio::test]
async fn test_storage_error_surfaces_from_service() -> Result<()> {
    let svc: Arc<Service> = create_test_module().await.service();
    let err = svc
        .create_invoice(invoice(31337, 120, InvoiceStatus::Billed, 2022))
        .await
        .unwrap_err();
    let DomainError::Storage(source) = err else {
        panic!("expected a storage error, got {err:?}");
    };
    assert!(source.downcast_ref::<sea_orm::DbErr>().is_some());
    Ok(())
}
