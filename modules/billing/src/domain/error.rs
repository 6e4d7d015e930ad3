use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Customer not found: {id}")]
    CustomerNotFound { id: i32 },

    #[error("Invoice not found: {id}")]
    InvoiceNotFound { id: i32 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    /// Whatever the store reported, unchanged.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn customer_not_found(id: i32) -> Self {
        Self::CustomerNotFound { id }
    }

    pub fn invoice_not_found(id: i32) -> Self {
        Self::InvoiceNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
