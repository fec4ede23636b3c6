//! Conversion Hints
//!
//! Hints are optional string key/value pairs passed through a dispatch to
//! choose between rules that could all handle a value. The stock rules
//! understand two keys:
//!
//! - `type`: the numeric target (see [`NumericTarget`] for the accepted
//!   spellings)
//! - `debug`: log every predicate decision at `info` instead of `debug`
//!
//! Custom rules are free to define their own keys.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// The `type` hint key
pub const TYPE: &str = "type";

/// The `debug` hint key
pub const DEBUG: &str = "debug";

/// Insertion-ordered hint map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    entries: IndexMap<SmolStr, SmolStr>,
}

impl Hints {
    /// No hints
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints requesting a numeric target (`type=<alias>`)
    pub fn of_type(target: impl Into<SmolStr>) -> Self {
        Self::new().with(TYPE, target)
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a hint, replacing any previous value
    pub fn insert(&mut self, key: impl Into<SmolStr>, value: impl Into<SmolStr>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a hint
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|v| v.as_str())
    }

    /// Check whether a hint is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Check if there are no hints
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a boolean hint is set to a true value
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|v| v.to_ascii_lowercase()).as_deref(),
            Some("true" | "1" | "yes" | "on")
        )
    }

    /// True when no `type` hint is given, or it names `target`
    pub fn allows(&self, target: NumericTarget) -> bool {
        match self.get(TYPE) {
            None => true,
            Some(value) => target.matches(value),
        }
    }

    /// True only when a `type` hint is given and it names `target`
    pub fn requests(&self, target: NumericTarget) -> bool {
        self.get(TYPE).map_or(false, |value| target.matches(value))
    }

    /// Iterate over the hints in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<SmolStr>, V: Into<SmolStr>> FromIterator<(K, V)> for Hints {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut hints = Hints::new();
        for (k, v) in iter {
            hints.insert(k, v);
        }
        hints
    }
}

/// Managed numeric type selectable through the `type` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericTarget {
    Byte,
    Short,
    Int,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
}

impl NumericTarget {
    /// Accepted spellings of this target
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            NumericTarget::Byte => &["b", "byte", "Byte"],
            NumericTarget::Short => &["s", "short", "Short"],
            NumericTarget::Int => &["i", "int", "Integer"],
            NumericTarget::Long => &["j", "l", "long", "Long"],
            NumericTarget::BigInteger => &["bi", "bigint", "BigInteger"],
            NumericTarget::Float => &["f", "float", "Float"],
            NumericTarget::Double => &["d", "double", "Double"],
            NumericTarget::BigDecimal => &["bd", "bigdec", "BigDecimal"],
        }
    }

    /// Check whether `value` is one of this target's spellings
    pub fn matches(&self, value: &str) -> bool {
        self.aliases().contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_aliases() {
        let hints = Hints::of_type("j");
        assert!(hints.allows(NumericTarget::Long));
        assert!(hints.requests(NumericTarget::Long));
        assert!(!hints.allows(NumericTarget::Int));

        assert!(Hints::of_type("l").requests(NumericTarget::Long));
        assert!(Hints::of_type("BigInteger").requests(NumericTarget::BigInteger));
        assert!(!Hints::of_type("Int").allows(NumericTarget::Int));
    }

    #[test]
    fn test_absent_type_allows_defaults_only() {
        let hints = Hints::new();
        assert!(hints.allows(NumericTarget::Int));
        assert!(hints.allows(NumericTarget::BigDecimal));
        assert!(!hints.requests(NumericTarget::Byte));
    }

    #[test]
    fn test_flag_and_display() {
        let hints: Hints = [("type", "double"), ("debug", "True")].into_iter().collect();
        assert!(hints.flag(DEBUG));
        assert!(!hints.flag("missing"));
        assert_eq!(hints.to_string(), "{type=double, debug=True}");
    }
}
