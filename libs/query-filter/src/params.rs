//! Boundary parsing: raw query string → [`FilterQuery`].
//!
//! `key=value` becomes [`FilterParam::Bare`]; `key[op]=value` becomes an entry of
//! [`FilterParam::WithOperators`]. Operator keys are kept as raw strings so that the
//! filter engine, not the parser, decides what is allowed.

/// Value of a single filter parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterParam {
    /// `status=paid`
    Bare(String),
    /// `amount[gt]=500&amount[lt]=900`, in first-appearance order.
    WithOperators(Vec<(String, String)>),
}

/// Ordered collection of filter parameters for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterQuery {
    params: Vec<(String, FilterParam)>,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Parse a URL query string (without the leading `?`).
    ///
    /// Never fails: malformed pairs are kept verbatim and left for the filter engine
    /// to ignore.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match split_operator_key(&key) {
                Some((name, op)) => query.push_operator(name, op, value.into_owned()),
                None => query.set(key.into_owned(), FilterParam::Bare(value.into_owned())),
            }
        }
        query
    }

    /// Builder: add a bare parameter.
    pub fn bare(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name.into(), FilterParam::Bare(value.into()));
        self
    }

    /// Builder: add one `name[op]=value` entry.
    pub fn with_op(
        mut self,
        name: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.push_operator(&name, &op.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FilterParam> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterParam)> {
        self.params.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    // Replaces the value of an existing parameter in place so the first-appearance
    // position is preserved.
    fn set(&mut self, name: String, param: FilterParam) {
        if name.is_empty() {
            return;
        }
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = param,
            None => self.params.push((name, param)),
        }
    }

    fn push_operator(&mut self, name: &str, op: &str, value: String) {
        if name.is_empty() {
            return;
        }
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some((_, FilterParam::WithOperators(ops))) => {
                match ops.iter_mut().find(|(o, _)| o == op) {
                    Some((_, v)) => *v = value,
                    None => ops.push((op.to_string(), value)),
                }
            }
            Some((_, slot)) => {
                *slot = FilterParam::WithOperators(vec![(op.to_string(), value)]);
            }
            None => self.params.push((
                name.to_string(),
                FilterParam::WithOperators(vec![(op.to_string(), value)]),
            )),
        }
    }
}

/// `amount[gt]` → `("amount", "gt")`. Anything else → `None`.
fn split_operator_key(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    Some((&key[..open], inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_operator_params() {
        let q = FilterQuery::parse("status=paid&amount[gt]=500&amount[lte]=900");
        assert_eq!(q.len(), 2);
        assert_eq!(q.get("status"), Some(&FilterParam::Bare("paid".into())));
        assert_eq!(
            q.get("amount"),
            Some(&FilterParam::WithOperators(vec![
                ("gt".into(), "500".into()),
                ("lte".into(), "900".into()),
            ]))
        );
    }

    #[test]
    fn decodes_percent_encoded_brackets_and_values() {
        let q = FilterQuery::parse("billedDate%5Bgte%5D=2024-01-01%2000%3A00%3A00&name=Acme+Ltd");
        assert_eq!(
            q.get("billedDate"),
            Some(&FilterParam::WithOperators(vec![(
                "gte".into(),
                "2024-01-01 00:00:00".into()
            )]))
        );
        assert_eq!(q.get("name"), Some(&FilterParam::Bare("Acme Ltd".into())));
    }

    #[test]
    fn keeps_first_appearance_order() {
        let q = FilterQuery::parse("b=1&a[eq]=2&b=3");
        let names: Vec<_> = q.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(q.get("b"), Some(&FilterParam::Bare("3".into())));
    }

    #[test]
    fn last_shape_wins_for_mixed_key() {
        let q = FilterQuery::parse("amount=5&amount[gt]=3");
        assert_eq!(
            q.get("amount"),
            Some(&FilterParam::WithOperators(vec![("gt".into(), "3".into())]))
        );

        let q = FilterQuery::parse("amount[gt]=3&amount=5");
        assert_eq!(q.get("amount"), Some(&FilterParam::Bare("5".into())));
    }

    #[test]
    fn repeated_operator_overwrites_value() {
        let q = FilterQuery::parse("amount[gt]=1&amount[gt]=2");
        assert_eq!(
            q.get("amount"),
            Some(&FilterParam::WithOperators(vec![("gt".into(), "2".into())]))
        );
    }

    #[test]
    fn unusual_keys_are_kept_for_the_engine_to_ignore() {
        let q = FilterQuery::parse("amount[]=1&status[gt=2&[eq]=3&=4");
        assert_eq!(
            q.get("amount"),
            Some(&FilterParam::WithOperators(vec![("".into(), "1".into())]))
        );
        // no closing bracket → treated as a bare key
        assert_eq!(q.get("status[gt"), Some(&FilterParam::Bare("2".into())));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn empty_query() {
        assert!(FilterQuery::parse("").is_empty());
    }
}
