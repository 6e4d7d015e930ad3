use async_trait::async_trait;
use query_filter::Predicate;

use crate::contract::model::{
    Customer, Invoice, InvoiceUpdate, NewCustomer, NewInvoice,
};

/// One page of a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

/// Storage port for the billing domain.
///
/// Errors are the store's own, wrapped in `anyhow` without translation.
#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn find_customer(&self, id: i32, with_invoices: bool) -> anyhow::Result<Option<Customer>>;

    async fn list_customers(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
        with_invoices: bool,
    ) -> anyhow::Result<Vec<Customer>>;

    async fn insert_customer(&self, new: NewCustomer) -> anyhow::Result<Customer>;

    /// `None` when no customer has this id.
    async fn update_customer(&self, id: i32, data: NewCustomer) -> anyhow::Result<Option<Customer>>;

    /// `false` when no customer has this id.
    async fn delete_customer(&self, id: i32) -> anyhow::Result<bool>;

    /// Invoices owned by `customer_id`, ordered by invoice id.
    async fn invoices_of(&self, customer_id: i32) -> anyhow::Result<Vec<Invoice>>;

    async fn find_invoice(&self, id: i32) -> anyhow::Result<Option<Invoice>>;

    async fn list_invoices(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
    ) -> anyhow::Result<Vec<Invoice>>;

    async fn insert_invoice(&self, new: NewInvoice) -> anyhow::Result<Invoice>;

    /// All or nothing.
    async fn insert_invoices(&self, batch: Vec<NewInvoice>) -> anyhow::Result<Vec<Invoice>>;

    async fn update_invoice(&self, id: i32, data: InvoiceUpdate) -> anyhow::Result<Option<Invoice>>;

    async fn delete_invoice(&self, id: i32) -> anyhow::Result<bool>;
}
