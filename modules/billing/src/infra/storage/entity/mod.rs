//! SeaORM entities for the billing tables.

pub mod customer;
pub mod invoice;
