pub mod model;

pub use model::{
    Customer, Invoice, InvoiceStatus, InvoiceUpdate, NewCustomer, NewInvoice, RelationState,
};
