//! Converters and the Rule Engine
//!
//! A [`Converter`] is a named `(predicate, action, priority)` rule. A
//! [`ConverterRegistry`] keeps its rules sorted by ascending priority and
//! dispatches by scanning from the end: the first rule whose predicate
//! accepts the value wins.
//!
//! ## Ties
//!
//! Inserting a rule places it after every existing rule of the same
//! priority, so among equal priorities the most recently registered rule is
//! tried first.
//!
//! ## Hints
//!
//! Predicates and actions declare up front whether they read hints
//! ([`Predicate::hinted`], [`Action::hinted`]) or only the value
//! ([`Predicate::plain`], [`Action::plain`]). Plain ones never see hints.
//!
//! ## Thread Safety
//!
//! A dispatch works on an immutable snapshot of the rule list. Registration
//! builds a new list and swaps it in under a write lock, so registering from
//! one thread while another thread dispatches is safe; the dispatching
//! thread simply sees the list as it was when its dispatch began.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::{debug, info};

use crate::error::{BridgeError, BridgeResult};
use crate::hints::{Hints, DEBUG};
use crate::priority::Priority;

/// Log at `info` when the dispatch asked for it, `debug` otherwise.
macro_rules! dispatch_log {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+)
        } else {
            debug!($($arg)+)
        }
    };
}

type PlainPredicateFn<I> = dyn Fn(&I) -> bool + Send + Sync;
type HintedPredicateFn<I> = dyn Fn(&I, &Hints) -> bool + Send + Sync;
type PlainActionFn<I, O> = dyn Fn(&I) -> BridgeResult<O> + Send + Sync;
type HintedActionFn<I, O> = dyn Fn(&I, &Hints) -> BridgeResult<O> + Send + Sync;

// ============================================================================
// Predicate / Action
// ============================================================================

/// "Can this rule handle this value?"
pub enum Predicate<I> {
    /// Looks at the value only
    Plain(Arc<PlainPredicateFn<I>>),
    /// Looks at the value and the hints
    Hinted(Arc<HintedPredicateFn<I>>),
}

impl<I> Predicate<I> {
    /// A predicate that ignores hints
    pub fn plain(f: impl Fn(&I) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Plain(Arc::new(f))
    }

    /// A predicate that reads hints
    pub fn hinted(f: impl Fn(&I, &Hints) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Hinted(Arc::new(f))
    }

    /// Accepts every value
    pub fn always() -> Self {
        Predicate::plain(|_| true)
    }

    /// Whether this predicate consumes hints
    pub fn accepts_hints(&self) -> bool {
        matches!(self, Predicate::Hinted(_))
    }

    /// Evaluate the predicate
    pub fn test(&self, value: &I, hints: &Hints) -> bool {
        match self {
            Predicate::Plain(f) => f(value),
            Predicate::Hinted(f) => f(value, hints),
        }
    }
}

impl<I> Clone for Predicate<I> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Plain(f) => Predicate::Plain(Arc::clone(f)),
            Predicate::Hinted(f) => Predicate::Hinted(Arc::clone(f)),
        }
    }
}

/// The conversion a rule performs once selected.
pub enum Action<I, O> {
    /// Reads the value only
    Plain(Arc<PlainActionFn<I, O>>),
    /// Reads the value and the hints
    Hinted(Arc<HintedActionFn<I, O>>),
}

impl<I, O> Action<I, O> {
    /// An action that ignores hints
    pub fn plain(f: impl Fn(&I) -> BridgeResult<O> + Send + Sync + 'static) -> Self {
        Action::Plain(Arc::new(f))
    }

    /// An action that reads hints
    pub fn hinted(f: impl Fn(&I, &Hints) -> BridgeResult<O> + Send + Sync + 'static) -> Self {
        Action::Hinted(Arc::new(f))
    }

    /// Whether this action consumes hints
    pub fn accepts_hints(&self) -> bool {
        matches!(self, Action::Hinted(_))
    }

    /// Run the action
    pub fn apply(&self, value: &I, hints: &Hints) -> BridgeResult<O> {
        match self {
            Action::Plain(f) => f(value),
            Action::Hinted(f) => f(value, hints),
        }
    }
}

impl<I, O> Clone for Action<I, O> {
    fn clone(&self) -> Self {
        match self {
            Action::Plain(f) => Action::Plain(Arc::clone(f)),
            Action::Hinted(f) => Action::Hinted(Arc::clone(f)),
        }
    }
}

// ============================================================================
// Converter
// ============================================================================

/// One conversion rule.
pub struct Converter<I, O> {
    name: SmolStr,
    predicate: Predicate<I>,
    action: Action<I, O>,
    priority: Priority,
}

impl<I, O> Converter<I, O> {
    /// Create a rule at [`Priority::NORMAL`]
    pub fn new(name: impl Into<SmolStr>, predicate: Predicate<I>, action: Action<I, O>) -> Self {
        Self {
            name: name.into(),
            predicate,
            action,
            priority: Priority::NORMAL,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Rule name, used in logs and for removal
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule priority
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Whether this rule can handle `value`
    pub fn supports(&self, value: &I, hints: &Hints) -> bool {
        self.predicate.test(value, hints)
    }

    /// Apply this rule to `value`
    pub fn convert(&self, value: &I, hints: &Hints) -> BridgeResult<O> {
        self.action.apply(value, hints)
    }
}

impl<I, O> Clone for Converter<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicate: self.predicate.clone(),
            action: self.action.clone(),
            priority: self.priority,
        }
    }
}

impl<I, O> fmt::Debug for Converter<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("hinted_predicate", &self.predicate.accepts_hints())
            .field("hinted_action", &self.action.accepts_hints())
            .finish()
    }
}

impl<I, O> fmt::Display for Converter<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Dispatch `value` over `converters`, which must be sorted ascending by
/// priority.
pub fn convert<I, O>(
    value: &I,
    converters: &[Arc<Converter<I, O>>],
    hints: &Hints,
    label: &str,
) -> BridgeResult<O> {
    let verbose = hints.flag(DEBUG);
    dispatch_log!(verbose, registry = label, %hints, "converting value");
    for converter in converters.iter().rev() {
        if converter.supports(value, hints) {
            dispatch_log!(verbose, converter = %converter.name, "- supports");
            return converter.convert(value, hints);
        }
        dispatch_log!(verbose, converter = %converter.name, "- does not support");
    }
    Err(BridgeError::NoApplicableConverter {
        registry: label.to_string(),
    })
}

// ============================================================================
// Registry
// ============================================================================

/// A priority-sorted list of converters.
pub struct ConverterRegistry<I, O> {
    label: SmolStr,
    rules: RwLock<Arc<Vec<Arc<Converter<I, O>>>>>,
}

impl<I, O> ConverterRegistry<I, O> {
    /// Create an empty registry
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            rules: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registry label, used in logs and errors
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Add a rule after every rule of lower or equal priority
    pub fn insert(&self, converter: Converter<I, O>) {
        debug!(
            registry = %self.label,
            converter = %converter.name,
            priority = %converter.priority,
            "registering converter"
        );
        let mut rules = self.rules.write();
        let mut next = Vec::with_capacity(rules.len() + 1);
        next.extend(rules.iter().cloned());
        let at = next.partition_point(|c| c.priority <= converter.priority);
        next.insert(at, Arc::new(converter));
        *rules = Arc::new(next);
    }

    /// Add several rules
    pub fn extend(&self, converters: impl IntoIterator<Item = Converter<I, O>>) {
        for converter in converters {
            self.insert(converter);
        }
    }

    /// Remove every rule with the given name; returns whether any matched
    pub fn remove(&self, name: &str) -> bool {
        let mut rules = self.rules.write();
        let next: Vec<_> = rules.iter().filter(|c| c.name != name).cloned().collect();
        let removed = next.len() != rules.len();
        if removed {
            debug!(registry = %self.label, converter = name, "removed converter");
            *rules = Arc::new(next);
        }
        removed
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Check if the registry has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Whether the rules are in ascending priority order
    pub fn is_sorted(&self) -> bool {
        self.rules
            .read()
            .windows(2)
            .all(|w| w[0].priority <= w[1].priority)
    }

    /// Rule names, lowest priority first
    pub fn names(&self) -> Vec<SmolStr> {
        self.rules.read().iter().map(|c| c.name.clone()).collect()
    }

    /// The current rule list
    pub fn snapshot(&self) -> Arc<Vec<Arc<Converter<I, O>>>> {
        Arc::clone(&self.rules.read())
    }

    /// Dispatch `value` over the current rules
    pub fn convert(&self, value: &I, hints: &Hints) -> BridgeResult<O> {
        let rules = self.snapshot();
        convert(value, &rules, hints, &self.label)
    }
}

impl<I, O> fmt::Debug for ConverterRegistry<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("label", &self.label)
            .field("rules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::TYPE;
    use pretty_assertions::assert_eq;

    fn constant(name: &str, out: &'static str, priority: Priority) -> Converter<i64, String> {
        Converter::new(
            name,
            Predicate::always(),
            Action::plain(move |_| Ok(out.to_string())),
        )
        .with_priority(priority)
    }

    #[test]
    fn test_highest_priority_wins() {
        let registry = ConverterRegistry::new("test");
        registry.insert(constant("low", "low", Priority::LOW));
        registry.insert(constant("high", "high", Priority::HIGH));
        registry.insert(constant("normal", "normal", Priority::NORMAL));

        assert_eq!(registry.convert(&1, &Hints::new()).unwrap(), "high");
        assert_eq!(registry.names(), vec!["low", "normal", "high"]);
        assert!(registry.is_sorted());
    }

    #[test]
    fn test_later_registration_wins_ties() {
        let registry = ConverterRegistry::new("test");
        registry.insert(constant("first", "first", Priority::NORMAL));
        registry.insert(constant("second", "second", Priority::NORMAL));
        assert_eq!(registry.convert(&1, &Hints::new()).unwrap(), "second");
        assert_eq!(registry.names(), vec!["first", "second"]);
    }

    #[test]
    fn test_predicate_falls_through() {
        let registry = ConverterRegistry::new("test");
        registry.insert(constant("fallback", "fallback", Priority::LAST));
        registry.insert(
            Converter::new(
                "positive",
                Predicate::plain(|v: &i64| *v > 0),
                Action::plain(|v: &i64| Ok(format!("+{}", v))),
            )
            .with_priority(Priority::HIGH),
        );

        assert_eq!(registry.convert(&5, &Hints::new()).unwrap(), "+5");
        assert_eq!(registry.convert(&-5, &Hints::new()).unwrap(), "fallback");
    }

    #[test]
    fn test_hinted_rules_see_hints() {
        let registry = ConverterRegistry::new("test");
        registry.insert(
            Converter::new(
                "typed",
                Predicate::hinted(|_: &i64, hints: &Hints| hints.contains_key(TYPE)),
                Action::hinted(|v: &i64, hints: &Hints| {
                    Ok(format!("{}:{}", hints.get(TYPE).unwrap_or_default(), v))
                }),
            ),
        );

        assert_eq!(registry.convert(&3, &Hints::of_type("long")).unwrap(), "long:3");
        assert_eq!(
            registry.convert(&3, &Hints::new()).unwrap_err(),
            BridgeError::NoApplicableConverter {
                registry: "test".to_string()
            }
        );
    }

    #[test]
    fn test_remove_by_name() {
        let registry = ConverterRegistry::new("test");
        registry.insert(constant("a", "a", Priority::NORMAL));
        registry.insert(constant("b", "b", Priority::HIGH));
        assert!(registry.remove("b"));
        assert!(!registry.remove("b"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.convert(&0, &Hints::new()).unwrap(), "a");
    }

    #[test]
    fn test_snapshot_is_stable_across_registration() {
        let registry = ConverterRegistry::new("test");
        registry.insert(constant("a", "a", Priority::NORMAL));
        let before = registry.snapshot();
        registry.insert(constant("b", "b", Priority::HIGH));
        assert_eq!(before.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry: ConverterRegistry<i64, String> = ConverterRegistry::new("test");
        std::thread::scope(|scope| {
            for t in 0..4 {
                let registry = &registry;
                scope.spawn(move || {
                    for i in 0..25 {
                        let p = Priority::from(f64::from(t * 25 + i));
                        registry.insert(constant("rule", "x", p));
                        let _ = registry.convert(&0, &Hints::new());
                    }
                });
            }
        });
        assert_eq!(registry.len(), 100);
        assert!(registry.is_sorted());
    }
}
