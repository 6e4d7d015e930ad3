use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    Customer, Invoice, InvoiceStatus, InvoiceUpdate, NewCustomer, NewInvoice,
};

/// Internal field → external JSON key, for every field whose name differs.
pub const FIELD_RENAMES: &[(&str, &str)] = &[
    ("postal_code", "postalCode"),
    ("customer_id", "customerId"),
    ("billed_date", "billedDate"),
    ("paid_date", "paidDate"),
];

/// External key for an internal field name; unlisted names are unchanged.
pub fn external_key(internal: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(i, _)| *i == internal)
        .map_or(internal, |(_, e)| *e)
}

/// Inverse of [`external_key`].
pub fn internal_field_name(external: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(_, e)| *e == external)
        .map_or(external, |(i, _)| *i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatusDto {
    Paid,
    Billed,
    Void,
}

impl From<InvoiceStatus> for InvoiceStatusDto {
    fn from(s: InvoiceStatus) -> Self {
        match s {
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Billed => Self::Billed,
            InvoiceStatus::Void => Self::Void,
        }
    }
}

impl From<InvoiceStatusDto> for InvoiceStatus {
    fn from(s: InvoiceStatusDto) -> Self {
        match s {
            InvoiceStatusDto::Paid => Self::Paid,
            InvoiceStatusDto::Billed => Self::Billed,
            InvoiceStatusDto::Void => Self::Void,
        }
    }
}

/// REST representation of an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResource {
    pub id: i32,
    pub customer_id: i32,
    pub amount: i64,
    pub status: InvoiceStatusDto,
    pub billed_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

/// REST representation of a customer; `invoices` appears only when they were loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResource {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoices: Option<Vec<InvoiceResource>>,
}

/// Body for creating or replacing a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReq {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceReq {
    pub customer_id: i32,
    pub amount: i64,
    pub status: InvoiceStatusDto,
    pub billed_date: DateTime<Utc>,
    #[serde(default)]
    pub paid_date: Option<DateTime<Utc>>,
}

/// Whole-record invoice update. A `customerId` in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceReq {
    pub amount: i64,
    pub status: InvoiceStatusDto,
    pub billed_date: DateTime<Utc>,
    #[serde(default)]
    pub paid_date: Option<DateTime<Utc>>,
}

/// Paging and relation switches; filter parameters are read from the raw query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    #[serde(default)]
    pub include_invoices: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub limit: u64,
    pub offset: u64,
}

// Conversion implementations between REST DTOs and contract models

impl From<Invoice> for InvoiceResource {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            customer_id: i.customer_id,
            amount: i.amount,
            status: i.status.into(),
            billed_date: i.billed_date,
            paid_date: i.paid_date,
        }
    }
}

impl From<Customer> for CustomerResource {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            kind: c.kind,
            email: c.email,
            address: c.address,
            city: c.city,
            state: c.state,
            postal_code: c.postal_code,
            invoices: c
                .invoices
                .into_loaded()
                .map(|v| v.into_iter().map(InvoiceResource::from).collect()),
        }
    }
}

impl From<CustomerReq> for NewCustomer {
    fn from(r: CustomerReq) -> Self {
        Self {
            name: r.name,
            kind: r.kind,
            email: r.email,
            address: r.address,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
        }
    }
}

impl From<CreateInvoiceReq> for NewInvoice {
    fn from(r: CreateInvoiceReq) -> Self {
        Self {
            customer_id: r.customer_id,
            amount: r.amount,
            status: r.status.into(),
            billed_date: r.billed_date,
            paid_date: r.paid_date,
        }
    }
}

impl From<UpdateInvoiceReq> for InvoiceUpdate {
    fn from(r: UpdateInvoiceReq) -> Self {
        Self {
            amount: r.amount,
            status: r.status.into(),
            billed_date: r.billed_date,
            paid_date: r.paid_date,
        }
    }
}
