use std::sync::Arc;

use query_filter::{build_predicates, FilterQuery};
use tracing::{debug, info, instrument};

use crate::config::BillingConfig;
use crate::contract::model::{
    Customer, Invoice, InvoiceStatus, InvoiceUpdate, NewCustomer, NewInvoice,
};
use crate::domain::error::DomainError;
use crate::domain::filters::{CUSTOMER_FILTER, INVOICE_FILTER};
use crate::domain::repo::{BillingRepository, PageRequest};

/// Largest offset the SQL drivers bind; offsets are signed 64-bit there.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Domain service with business rules for customers and invoices.
pub struct Service {
    repo: Arc<dyn BillingRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 15,
            max_page_size: 100,
        }
    }
}

impl From<&BillingConfig> for ServiceConfig {
    fn from(cfg: &BillingConfig) -> Self {
        Self {
            default_page_size: cfg.default_page_size,
            max_page_size: cfg.max_page_size,
        }
    }
}

impl Service {
    pub fn new(repo: Arc<dyn BillingRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Resolve client paging input against the configured bounds.
    pub fn page(&self, limit: Option<u64>, offset: Option<u64>) -> PageRequest {
        let max = self.config.max_page_size.max(1);
        let limit = limit
            .unwrap_or(self.config.default_page_size)
            .clamp(1, max);
        PageRequest {
            limit,
            offset: offset.unwrap_or(0).min(MAX_OFFSET),
        }
    }

    // ---- customers ----

    #[instrument(name = "billing.service.list_customers", skip(self, filter))]
    pub async fn list_customers(
        &self,
        filter: &FilterQuery,
        include_invoices: bool,
        page: PageRequest,
    ) -> Result<Vec<Customer>, DomainError> {
        let predicates = build_predicates(&CUSTOMER_FILTER, filter);
        debug!(predicates = predicates.len(), "Listing customers");
        let customers = self
            .repo
            .list_customers(&predicates, page, include_invoices)
            .await?;
        debug!("Found {} customers", customers.len());
        Ok(customers)
    }

    #[instrument(name = "billing.service.get_customer", skip(self))]
    pub async fn get_customer(&self, id: i32, include_invoices: bool) -> Result<Customer, DomainError> {
        self.repo
            .find_customer(id, include_invoices)
            .await?
            .ok_or_else(|| DomainError::customer_not_found(id))
    }

    #[instrument(name = "billing.service.create_customer", skip(self, new), fields(name = %new.name))]
    pub async fn create_customer(&self, new: NewCustomer) -> Result<Customer, DomainError> {
        validate_customer(&new)?;
        let customer = self.repo.insert_customer(new).await?;
        info!(id = customer.id, "Created customer");
        Ok(customer)
    }

    #[instrument(name = "billing.service.update_customer", skip(self, data))]
    pub async fn update_customer(&self, id: i32, data: NewCustomer) -> Result<Customer, DomainError> {
        validate_customer(&data)?;
        let customer = self
            .repo
            .update_customer(id, data)
            .await?
            .ok_or_else(|| DomainError::customer_not_found(id))?;
        info!("Updated customer");
        Ok(customer)
    }

    #[instrument(name = "billing.service.delete_customer", skip(self))]
    pub async fn delete_customer(&self, id: i32) -> Result<(), DomainError> {
        if !self.repo.delete_customer(id).await? {
            return Err(DomainError::customer_not_found(id));
        }
        info!("Deleted customer and its invoices");
        Ok(())
    }

    /// Invoices of an existing customer, ordered by id.
    #[instrument(name = "billing.service.invoices_of", skip(self))]
    pub async fn invoices_of(&self, customer_id: i32) -> Result<Vec<Invoice>, DomainError> {
        if self.repo.find_customer(customer_id, false).await?.is_none() {
            return Err(DomainError::customer_not_found(customer_id));
        }
        Ok(self.repo.invoices_of(customer_id).await?)
    }

    // ---- invoices ----

    #[instrument(name = "billing.service.list_invoices", skip(self, filter))]
    pub async fn list_invoices(
        &self,
        filter: &FilterQuery,
        page: PageRequest,
    ) -> Result<Vec<Invoice>, DomainError> {
        let predicates = build_predicates(&INVOICE_FILTER, filter);
        debug!(predicates = predicates.len(), "Listing invoices");
        let invoices = self.repo.list_invoices(&predicates, page).await?;
        debug!("Found {} invoices", invoices.len());
        Ok(invoices)
    }

    #[instrument(name = "billing.service.get_invoice", skip(self))]
    pub async fn get_invoice(&self, id: i32) -> Result<Invoice, DomainError> {
        self.repo
            .find_invoice(id)
            .await?
            .ok_or_else(|| DomainError::invoice_not_found(id))
    }

    #[instrument(name = "billing.service.create_invoice", skip(self, new), fields(customer_id = new.customer_id))]
    pub async fn create_invoice(&self, new: NewInvoice) -> Result<Invoice, DomainError> {
        validate_invoice(new.amount, new.status, new.paid_date.is_some())?;
        let invoice = self.repo.insert_invoice(new).await?;
        info!(id = invoice.id, "Created invoice");
        Ok(invoice)
    }

    /// Validates the whole batch before writing any of it.
    #[instrument(name = "billing.service.bulk_create_invoices", skip(self, batch), fields(count = batch.len()))]
    pub async fn bulk_create_invoices(&self, batch: Vec<NewInvoice>) -> Result<Vec<Invoice>, DomainError> {
        for (i, new) in batch.iter().enumerate() {
            validate_invoice(new.amount, new.status, new.paid_date.is_some()).map_err(|e| match e {
                DomainError::Validation { field, message } => {
                    DomainError::validation(format!("[{i}].{field}"), message)
                }
                other => other,
            })?;
        }
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let invoices = self.repo.insert_invoices(batch).await?;
        info!("Created {} invoices", invoices.len());
        Ok(invoices)
    }

    #[instrument(name = "billing.service.update_invoice", skip(self, data))]
    pub async fn update_invoice(&self, id: i32, data: InvoiceUpdate) -> Result<Invoice, DomainError> {
        validate_invoice(data.amount, data.status, data.paid_date.is_some())?;
        let invoice = self
            .repo
            .update_invoice(id, data)
            .await?
            .ok_or_else(|| DomainError::invoice_not_found(id))?;
        info!("Updated invoice");
        Ok(invoice)
    }

    #[instrument(name = "billing.service.delete_invoice", skip(self))]
    pub async fn delete_invoice(&self, id: i32) -> Result<(), DomainError> {
        if !self.repo.delete_invoice(id).await? {
            return Err(DomainError::invoice_not_found(id));
        }
        info!("Deleted invoice");
        Ok(())
    }
}

fn validate_customer(c: &NewCustomer) -> Result<(), DomainError> {
    if c.name.trim().is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }
    Ok(())
}

fn validate_invoice(amount: i64, status: InvoiceStatus, has_paid_date: bool) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation("amount", "must be positive"));
    }
    match (status, has_paid_date) {
        (InvoiceStatus::Paid, false) => Err(DomainError::validation(
            "paidDate",
            "required when status is paid",
        )),
        (InvoiceStatus::Billed | InvoiceStatus::Void, true) => Err(DomainError::validation(
            "paidDate",
            format!("must be null when status is {status}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use query_filter::Predicate;
    use tracing_test::traced_test;

    /// Every call fails the way a broken connection would.
    struct DownRepo;

    fn down<T>() -> anyhow::Result<T> {
        Err(anyhow::anyhow!("connection refused"))
    }

    #[async_trait]
    impl BillingRepository for DownRepo {
        async fn find_customer(&self, _: i32, _: bool) -> anyhow::Result<Option<Customer>> {
            down()
        }
        async fn list_customers(&self, _: &[Predicate], _: PageRequest, _: bool) -> anyhow::Result<Vec<Customer>> {
            down()
        }
        async fn insert_customer(&self, _: NewCustomer) -> anyhow::Result<Customer> {
            down()
        }
        async fn update_customer(&self, _: i32, _: NewCustomer) -> anyhow::Result<Option<Customer>> {
            down()
        }
        async fn delete_customer(&self, _: i32) -> anyhow::Result<bool> {
            down()
        }
        async fn invoices_of(&self, _: i32) -> anyhow::Result<Vec<Invoice>> {
            down()
        }
        async fn find_invoice(&self, _: i32) -> anyhow::Result<Option<Invoice>> {
            down()
        }
        async fn list_invoices(&self, _: &[Predicate], _: PageRequest) -> anyhow::Result<Vec<Invoice>> {
            down()
        }
        async fn insert_invoice(&self, _: NewInvoice) -> anyhow::Result<Invoice> {
            down()
        }
        async fn insert_invoices(&self, _: Vec<NewInvoice>) -> anyhow::Result<Vec<Invoice>> {
            down()
        }
        async fn update_invoice(&self, _: i32, _: InvoiceUpdate) -> anyhow::Result<Option<Invoice>> {
            down()
        }
        async fn delete_invoice(&self, _: i32) -> anyhow::Result<bool> {
            down()
        }
    }

    fn service(cfg: ServiceConfig) -> Service {
        Service::new(Arc::new(DownRepo), cfg)
    }

    #[test]
    fn page_defaults_and_clamps() {
        let svc = service(ServiceConfig {
            default_page_size: 15,
            max_page_size: 100,
        });
        assert_eq!(svc.page(None, None), PageRequest { limit: 15, offset: 0 });
        assert_eq!(svc.page(Some(500), Some(30)), PageRequest { limit: 100, offset: 30 });
        assert_eq!(svc.page(Some(0), None).limit, 1);
        assert_eq!(svc.page(None, Some(u64::MAX)).offset, MAX_OFFSET);
        assert_eq!(svc.page(None, Some(MAX_OFFSET)).offset, MAX_OFFSET);
    }

    #[tokio::test]
    #[traced_test]
    async fn storage_failure_propagates_unchanged() {
        let svc = service(ServiceConfig::default());
        let q = FilterQuery::parse("amount[gt]=500");
        let err = svc.list_invoices(&q, svc.page(None, None)).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert_eq!(err.to_string(), "connection refused");
        assert!(logs_contain("Listing invoices"));
    }

    #[tokio::test]
    async fn validation_runs_before_storage() {
        let svc = service(ServiceConfig::default());
        let bad = NewInvoice {
            customer_id: 1,
            amount: 10,
            status: InvoiceStatus::Paid,
            billed_date: chrono::Utc::now(),
            paid_date: None,
        };
        let err = svc.bulk_create_invoices(vec![bad]).await.unwrap_err();
        assert!(
            matches!(err, DomainError::Validation { ref field, .. } if field == "[0].paidDate"),
            "{err:?}"
        );
    }

    #[test]
    fn paid_date_follows_status() {
        assert!(validate_invoice(100, InvoiceStatus::Paid, true).is_ok());
        assert!(validate_invoice(100, InvoiceStatus::Billed, false).is_ok());
        assert!(validate_invoice(100, InvoiceStatus::Void, false).is_ok());

        let err = validate_invoice(100, InvoiceStatus::Paid, false).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "paidDate"));
        assert!(validate_invoice(100, InvoiceStatus::Void, true).is_err());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_invoice(0, InvoiceStatus::Billed, false).is_err());
        assert!(validate_invoice(-5, InvoiceStatus::Billed, false).is_err());
    }

    #[test]
    fn blank_name_rejected() {
        let c = NewCustomer {
            name: "   ".into(),
            kind: "I".into(),
            email: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
        };
        assert!(validate_customer(&c).is_err());
    }
}
