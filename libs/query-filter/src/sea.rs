//! Predicates → `sea_orm::Condition`.

use sea_orm::{
    prelude::{Date, DateTime, DateTimeUtc},
    sea_query::{Alias, Expr, SimpleExpr},
    ColumnTrait, ColumnType, Condition, EntityTrait, IdenStatic, Iterable, QueryFilter, Value,
};

use crate::operator::Operator;
use crate::params::FilterQuery;
use crate::predicate::{build_predicates, Predicate};
use crate::spec::FilterSpec;

/// How a raw filter value is bound for a given column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    DateTimeUtc,
}

impl FieldKind {
    pub fn of(ty: &ColumnType) -> Self {
        match ty {
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double => Self::Float,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::Date => Self::Date,
            ColumnType::DateTime | ColumnType::Timestamp => Self::DateTime,
            ColumnType::TimestampWithTimeZone => Self::DateTimeUtc,
            _ => Self::Text,
        }
    }
}

/// Kind of the entity column stored under `column`; unknown names bind as text.
pub fn column_kind<E: EntityTrait>(column: &str) -> FieldKind {
    E::Column::iter()
        .find(|c| c.as_str() == column)
        .map_or(FieldKind::Text, |c| FieldKind::of(c.def().get_column_type()))
}

/// Typed value for `raw`. A literal that does not parse stays text, so the
/// database reports the mismatch itself.
pub fn coerce(kind: FieldKind, raw: &str) -> Value {
    let typed = match kind {
        FieldKind::Text => None,
        FieldKind::Integer => raw.parse::<i64>().ok().map(|i| Value::BigInt(Some(i))),
        FieldKind::Float => raw.parse::<f64>().ok().map(|f| Value::Double(Some(f))),
        FieldKind::Boolean => raw.parse::<bool>().ok().map(|b| Value::Bool(Some(b))),
        FieldKind::Date => raw
            .parse::<Date>()
            .ok()
            .map(|d| Value::ChronoDate(Some(Box::new(d)))),
        FieldKind::DateTime => raw
            .parse::<DateTime>()
            .ok()
            .or_else(|| midnight(raw))
            .map(|dt| Value::ChronoDateTime(Some(Box::new(dt)))),
        FieldKind::DateTimeUtc => raw
            .parse::<DateTimeUtc>()
            .ok()
            .or_else(|| midnight(raw).map(|dt| dt.and_utc()))
            .map(|dt| Value::ChronoDateTimeUtc(Some(Box::new(dt)))),
    };
    typed.unwrap_or_else(|| Value::String(Some(Box::new(raw.to_owned()))))
}

// `2022-01-01` in a timestamp filter means the start of that day
fn midnight(raw: &str) -> Option<DateTime> {
    raw.parse::<Date>().ok()?.and_hms_opt(0, 0, 0)
}

fn predicate_expr<E: EntityTrait>(table: &str, p: &Predicate) -> SimpleExpr {
    let col = Expr::col((Alias::new(table), Alias::new(p.column)));
    let v = coerce(column_kind::<E>(p.column), &p.value);
    match p.op {
        Operator::Eq => col.eq(v),
        Operator::Ne => col.ne(v),
        Operator::Gt => col.gt(v),
        Operator::Gte => col.gte(v),
        Operator::Lt => col.lt(v),
        Operator::Lte => col.lte(v),
    }
}

/// AND-combine predicates against the columns of `E`.
pub fn predicates_to_condition<E: EntityTrait>(preds: &[Predicate]) -> Condition {
    let table = E::default().table_name().to_owned();
    preds
        .iter()
        .fold(Condition::all(), |cond, p| cond.add(predicate_expr::<E>(&table, p)))
}

/// Apply whitelisted filters to a plain SeaORM `Select<E>`.
pub trait FilterExt<E: EntityTrait>: Sized {
    fn apply_predicates(self, preds: &[Predicate]) -> Self;

    fn apply_filter(self, spec: &FilterSpec, query: &FilterQuery) -> Self {
        self.apply_predicates(&build_predicates(spec, query))
    }
}

impl<E> FilterExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn apply_predicates(self, preds: &[Predicate]) -> Self {
        if preds.is_empty() {
            return self;
        }
        self.filter(predicates_to_condition::<E>(preds))
    }
}
