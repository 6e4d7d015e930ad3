use std::fmt;

/// Comparison operators accepted in `key[op]=value` filters.
///
/// The set is closed: resources choose a subset via their safe-parameter table but
/// cannot introduce new operator keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// `eq` only.
pub const EQ_ONLY: &[Operator] = &[Operator::Eq];

/// `eq`, `ne`.
pub const EQUALITY: &[Operator] = &[Operator::Eq, Operator::Ne];

/// `eq`, `gt`, `lt`, `gte`, `lte`.
pub const COMPARISON: &[Operator] = &[
    Operator::Eq,
    Operator::Gt,
    Operator::Lt,
    Operator::Gte,
    Operator::Lte,
];

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    /// Resolve the operator key used inside the brackets of a query parameter.
    /// Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }

    /// SQL comparison symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
