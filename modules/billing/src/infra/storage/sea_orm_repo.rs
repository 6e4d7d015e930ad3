//! SeaORM adapter for the billing repository port.

use anyhow::Context;
use async_trait::async_trait;
use query_filter::{FilterExt, Predicate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, ModelTrait, NotSet,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, Unchanged,
};

use crate::contract::model::{
    Customer, Invoice, InvoiceUpdate, NewCustomer, NewInvoice, RelationState,
};
use crate::domain::repo::{BillingRepository, PageRequest};
use crate::infra::storage::entity::{customer, invoice};
use crate::infra::storage::mapper::customer_with_invoices;

/// Repository over any SeaORM connection (pool or transaction).
pub struct SeaOrmBillingRepository<C> {
    conn: C,
}

impl<C> SeaOrmBillingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    async fn attach_invoices(&self, models: Vec<customer::Model>) -> anyhow::Result<Vec<Customer>> {
        let invoices = models
            .load_many(
                invoice::Entity::find().order_by_asc(invoice::Column::Id),
                &self.conn,
            )
            .await
            .context("load_many invoices failed")?;

        Ok(models
            .into_iter()
            .zip(invoices)
            .map(|(m, inv)| {
                customer_with_invoices(
                    m,
                    RelationState::Loaded(inv.into_iter().map(Invoice::from).collect()),
                )
            })
            .collect())
    }
}

fn new_customer_model(c: NewCustomer) -> customer::ActiveModel {
    customer::ActiveModel {
        id: NotSet,
        name: Set(c.name),
        kind: Set(c.kind),
        email: Set(c.email),
        address: Set(c.address),
        city: Set(c.city),
        state: Set(c.state),
        postal_code: Set(c.postal_code),
    }
}

fn new_invoice_model(n: NewInvoice) -> invoice::ActiveModel {
    invoice::ActiveModel {
        id: NotSet,
        customer_id: Set(n.customer_id),
        amount: Set(n.amount),
        status: Set(n.status.into()),
        billed_date: Set(n.billed_date),
        paid_date: Set(n.paid_date),
    }
}

#[async_trait]
impl<C> BillingRepository for SeaOrmBillingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    async fn find_customer(&self, id: i32, with_invoices: bool) -> anyhow::Result<Option<Customer>> {
        let Some(model) = customer::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_customer query failed")?
        else {
            return Ok(None);
        };

        if !with_invoices {
            return Ok(Some(model.into()));
        }
        let invoices = model
            .find_related(invoice::Entity)
            .order_by_asc(invoice::Column::Id)
            .all(&self.conn)
            .await
            .context("find_customer invoices query failed")?;
        Ok(Some(customer_with_invoices(
            model,
            RelationState::Loaded(invoices.into_iter().map(Invoice::from).collect()),
        )))
    }

    async fn list_customers(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
        with_invoices: bool,
    ) -> anyhow::Result<Vec<Customer>> {
        let models = customer::Entity::find()
            .apply_predicates(predicates)
            .order_by_asc(customer::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await
            .context("list_customers query failed")?;

        if with_invoices {
            self.attach_invoices(models).await
        } else {
            Ok(models.into_iter().map(Customer::from).collect())
        }
    }

    async fn insert_customer(&self, new: NewCustomer) -> anyhow::Result<Customer> {
        let model = new_customer_model(new)
            .insert(&self.conn)
            .await
            .context("insert_customer failed")?;
        Ok(model.into())
    }

    async fn update_customer(&self, id: i32, data: NewCustomer) -> anyhow::Result<Option<Customer>> {
        let exists = customer::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update_customer lookup failed")?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let mut am = new_customer_model(data);
        am.id = Unchanged(id);
        let model = am
            .update(&self.conn)
            .await
            .context("update_customer failed")?;
        Ok(Some(model.into()))
    }

    async fn delete_customer(&self, id: i32) -> anyhow::Result<bool> {
        let res = customer::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_customer failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn invoices_of(&self, customer_id: i32) -> anyhow::Result<Vec<Invoice>> {
        let rows = invoice::Entity::find()
            .filter(invoice::Column::CustomerId.eq(customer_id))
            .order_by_asc(invoice::Column::Id)
            .all(&self.conn)
            .await
            .context("invoices_of query failed")?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    async fn find_invoice(&self, id: i32) -> anyhow::Result<Option<Invoice>> {
        let found = invoice::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_invoice query failed")?;
        Ok(found.map(Invoice::from))
    }

    async fn list_invoices(
        &self,
        predicates: &[Predicate],
        page: PageRequest,
    ) -> anyhow::Result<Vec<Invoice>> {
        let rows = invoice::Entity::find()
            .apply_predicates(predicates)
            .order_by_asc(invoice::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.conn)
            .await
            .context("list_invoices query failed")?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    async fn insert_invoice(&self, new: NewInvoice) -> anyhow::Result<Invoice> {
        let model = new_invoice_model(new)
            .insert(&self.conn)
            .await
            .context("insert_invoice failed")?;
        Ok(model.into())
    }

    async fn insert_invoices(&self, batch: Vec<NewInvoice>) -> anyhow::Result<Vec<Invoice>> {
        let txn = self.conn.begin().await.context("begin transaction failed")?;
        let mut out = Vec::with_capacity(batch.len());
        for new in batch {
            let model = new_invoice_model(new)
                .insert(&txn)
                .await
                .context("insert_invoices failed")?;
            out.push(Invoice::from(model));
        }
        txn.commit().await.context("commit failed")?;
        Ok(out)
    }

    async fn update_invoice(&self, id: i32, data: InvoiceUpdate) -> anyhow::Result<Option<Invoice>> {
        let Some(existing) = invoice::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("update_invoice lookup failed")?
        else {
            return Ok(None);
        };

        let am = invoice::ActiveModel {
            id: Unchanged(existing.id),
            customer_id: NotSet,
            amount: Set(data.amount),
            status: Set(data.status.into()),
            billed_date: Set(data.billed_date),
            paid_date: Set(data.paid_date),
        };
        let model = am
            .update(&self.conn)
            .await
            .context("update_invoice failed")?;
        Ok(Some(model.into()))
    }

    async fn delete_invoice(&self, id: i32) -> anyhow::Result<bool> {
        let res = invoice::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_invoice failed")?;
        Ok(res.rows_affected > 0)
    }
}
