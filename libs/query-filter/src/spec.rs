use crate::operator::Operator;

/// Per-resource filter configuration.
///
/// All tables are `'static` and immutable, so a spec can live in a `const` and be shared
/// freely between concurrent requests.
#[derive(Clone, Copy, Debug)]
pub struct FilterSpec {
    /// Resource name, used only for logging.
    pub resource: &'static str,
    /// External parameter name → allowed operators.
    pub safe_params: &'static [(&'static str, &'static [Operator])],
    /// External parameter name → storage column, only where they differ.
    pub column_map: &'static [(&'static str, &'static str)],
}

impl FilterSpec {
    pub const fn new(
        resource: &'static str,
        safe_params: &'static [(&'static str, &'static [Operator])],
        column_map: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            resource,
            safe_params,
            column_map,
        }
    }

    /// Whitelisted entry for `param`: its canonical name and allowed operators.
    pub fn lookup(&self, param: &str) -> Option<(&'static str, &'static [Operator])> {
        self.safe_params
            .iter()
            .find(|(name, _)| *name == param)
            .copied()
    }

    /// Storage column for a parameter; unmapped names map to themselves.
    pub fn column_for(&self, param: &'static str) -> &'static str {
        self.column_map
            .iter()
            .find(|(external, _)| *external == param)
            .map_or(param, |(_, column)| *column)
    }
}
