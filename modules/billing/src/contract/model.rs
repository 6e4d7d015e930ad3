use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

/// Whether a relation was fetched alongside its owner.
///
/// `Loaded(vec![])` means "fetched, nothing there" and is distinct from `NotRequested`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationState<T> {
    NotRequested,
    Loaded(Vec<T>),
}

impl<T> Default for RelationState<T> {
    fn default() -> Self {
        Self::NotRequested
    }
}

impl<T> RelationState<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&[T]> {
        match self {
            Self::Loaded(items) => Some(items),
            Self::NotRequested => None,
        }
    }

    pub fn into_loaded(self) -> Option<Vec<T>> {
        match self {
            Self::Loaded(items) => Some(items),
            Self::NotRequested => None,
        }
    }
}

/// Pure customer model (no serde).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    /// `I` (individual) or `B` (business) by convention.
    pub kind: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub invoices: RelationState<Invoice>,
}

/// Data for creating a customer or replacing all of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub kind: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    Paid,
    Billed,
    Void,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [Self::Paid, Self::Billed, Self::Void];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Billed => "billed",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown invoice status '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: i32,
    pub customer_id: i32,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub billed_date: DateTime<Utc>,
    /// Set only when `status` is `Paid`.
    pub paid_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub customer_id: i32,
    pub amount: i64,
    pub status: InvoiceStatus,
    pub billed_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

/// Whole-record invoice update. The owning customer cannot change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceUpdate {
    pub amount: i64,
    pub status: InvoiceStatus,
    pub billed_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
}

impl From<NewInvoice> for InvoiceUpdate {
    fn from(n: NewInvoice) -> Self {
        Self {
            amount: n.amount,
            status: n.status,
            billed_date: n.billed_date,
            paid_date: n.paid_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_own_names() {
        for st in InvoiceStatus::ALL {
            assert_eq!(st.as_str().parse::<InvoiceStatus>(), Ok(st));
        }
        assert!("PAID".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn relation_state_distinguishes_empty_from_missing() {
        let missing: RelationState<Invoice> = RelationState::default();
        let empty: RelationState<Invoice> = RelationState::Loaded(vec![]);
        assert!(!missing.is_loaded());
        assert!(empty.is_loaded());
        assert_eq!(missing.as_loaded(), None);
        assert_eq!(empty.as_loaded(), Some(&[][..]));
    }
}
