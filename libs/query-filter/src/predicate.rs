//! FilterQuery + FilterSpec → predicates.

use std::fmt;

use tracing::debug;

use crate::operator::Operator;
use crate::params::{FilterParam, FilterQuery};
use crate::spec::FilterSpec;

/// One `column <op> value` condition. Predicates of a query are AND-combined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub column: &'static str,
    pub op: Operator,
    /// Passed to storage unvalidated.
    pub value: String,
}

impl Predicate {
    pub fn new(column: &'static str, op: Operator, value: impl Into<String>) -> Self {
        Self {
            column,
            op,
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.column, self.op, self.value)
    }
}

/// Translate request parameters into predicates, dropping everything the spec does not
/// whitelist.
///
/// - unknown parameter → skipped
/// - bare value → implicit `eq`, only if `eq` is allowed
/// - `param[op]` → skipped individually when `op` is unknown or not allowed
///
/// Output order follows parameter order, then operator order within a parameter.
pub fn build_predicates(spec: &FilterSpec, query: &FilterQuery) -> Vec<Predicate> {
    let mut out = Vec::new();

    for (name, param) in query.iter() {
        let Some((param_name, allowed)) = spec.lookup(name) else {
            debug!(resource = spec.resource, param = name, "ignoring unknown filter parameter");
            continue;
        };
        let column = spec.column_for(param_name);

        match param {
            FilterParam::Bare(value) => {
                if allowed.contains(&Operator::Eq) {
                    out.push(Predicate::new(column, Operator::Eq, value.as_str()));
                } else {
                    debug!(
                        resource = spec.resource,
                        param = name,
                        "bare value without eq support, ignoring"
                    );
                }
            }
            FilterParam::WithOperators(ops) => {
                for (key, value) in ops {
                    match Operator::from_key(key).filter(|op| allowed.contains(op)) {
                        Some(op) => out.push(Predicate::new(column, op, value.as_str())),
                        None => debug!(
                            resource = spec.resource,
                            param = name,
                            op = key.as_str(),
                            "ignoring disallowed filter operator"
                        ),
                    }
                }
            }
        }
    }

    out
}
