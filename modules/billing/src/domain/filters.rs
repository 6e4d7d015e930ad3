//! Whitelisted list filters for customers and invoices.

use query_filter::{FilterSpec, Operator, COMPARISON, EQUALITY, EQ_ONLY};

pub const CUSTOMER_FILTER: FilterSpec = FilterSpec::new(
    "customers",
    &[
        ("name", EQ_ONLY),
        ("type", EQ_ONLY),
        ("email", EQ_ONLY),
        ("address", EQ_ONLY),
        ("city", EQ_ONLY),
        ("state", EQ_ONLY),
        ("postalCode", &[Operator::Eq, Operator::Gt, Operator::Lt]),
    ],
    &[("postalCode", "postal_code")],
);

pub const INVOICE_FILTER: FilterSpec = FilterSpec::new(
    "invoices",
    &[
        ("customerId", EQ_ONLY),
        ("amount", COMPARISON),
        ("status", EQUALITY),
        ("billedDate", COMPARISON),
        ("paidDate", COMPARISON),
    ],
    &[
        ("customerId", "customer_id"),
        ("billedDate", "billed_date"),
        ("paidDate", "paid_date"),
    ],
);
