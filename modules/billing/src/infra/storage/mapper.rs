//! Entity rows ↔ contract models.

use crate::contract::model::{Customer, Invoice, InvoiceStatus, RelationState};
use crate::infra::storage::entity::{customer, invoice};

impl From<invoice::Status> for InvoiceStatus {
    fn from(s: invoice::Status) -> Self {
        match s {
            invoice::Status::Paid => Self::Paid,
            invoice::Status::Billed => Self::Billed,
            invoice::Status::Void => Self::Void,
        }
    }
}

impl From<InvoiceStatus> for invoice::Status {
    fn from(s: InvoiceStatus) -> Self {
        match s {
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Billed => Self::Billed,
            InvoiceStatus::Void => Self::Void,
        }
    }
}

impl From<invoice::Model> for Invoice {
    fn from(m: invoice::Model) -> Self {
        Self {
            id: m.id,
            customer_id: m.customer_id,
            amount: m.amount,
            status: m.status.into(),
            billed_date: m.billed_date,
            paid_date: m.paid_date,
        }
    }
}

/// Customer row without its invoices.
impl From<customer::Model> for Customer {
    fn from(m: customer::Model) -> Self {
        customer_with_invoices(m, RelationState::NotRequested)
    }
}

pub fn customer_with_invoices(m: customer::Model, invoices: RelationState<Invoice>) -> Customer {
    Customer {
        id: m.id,
        name: m.name,
        kind: m.kind,
        email: m.email,
        address: m.address,
        city: m.city,
        state: m.state,
        postal_code: m.postal_code,
        invoices,
    }
}
