//! Whitelisted query-parameter filtering for list endpoints.
//!
//! A list request such as `GET /invoices?status=paid&amount[gt]=500` is parsed once at
//! the API boundary into a [`FilterQuery`]. A per-resource [`FilterSpec`] then decides
//! which parameters and operators are accepted, and [`build_predicates`] turns the
//! accepted ones into `(column, operator, value)` [`Predicate`]s.
//!
//! Anything not whitelisted is dropped without an error. Values are never coerced here;
//! they are handed to the storage layer as-is.
//!
//! # Features
//! - `sea-orm` (default): [`FilterExt`] applies predicates to a `sea_orm::Select<E>`,
//!   binding each value with the type of its entity column.
//!
//! # Example
//! ```
//! use query_filter::{build_predicates, FilterQuery, FilterSpec, Operator, COMPARISON};
//!
//! const SPEC: FilterSpec = FilterSpec::new(
//!     "invoices",
//!     &[("amount", COMPARISON), ("customerId", &[Operator::Eq])],
//!     &[("customerId", "customer_id")],
//! );
//!
//! let query = FilterQuery::parse("amount[gt]=500&customerId=7&secret=1");
//! let preds = build_predicates(&SPEC, &query);
//! assert_eq!(preds.len(), 2);
//! assert_eq!(preds[1].column, "customer_id");
//! ```

pub mod operator;
pub mod params;
pub mod predicate;
#[cfg(feature = "sea-orm")]
pub mod sea;
pub mod spec;

pub use operator::{Operator, COMPARISON, EQUALITY, EQ_ONLY};
pub use params::{FilterParam, FilterQuery};
pub use predicate::{build_predicates, Predicate};
#[cfg(feature = "sea-orm")]
pub use sea::{coerce, column_kind, predicates_to_condition, FieldKind, FilterExt};
pub use spec::FilterSpec;
