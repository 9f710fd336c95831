//! Literal-or-lazy field values bound to resolved options.
//!
//! # Invariants
//! - A lazy value is never invoked at declaration time.
//! - Each evaluation receives a context built from the options it is given;
//!   nothing from a previous evaluation is retained.

use crate::node::options::Options;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Read-only context handed to options-bound fields and hooks.
#[derive(Debug, Clone, Copy)]
pub struct OptionsContext<'a> {
    pub options: &'a Options,
}

impl<'a> OptionsContext<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }
}

/// Closure form of a deferred field.
pub type LazyFn<T> = Arc<dyn Fn(&OptionsContext<'_>) -> T + Send + Sync>;

/// A field given either as a literal or as a closure over the resolved
/// options.
pub enum Deferred<T> {
    Value(T),
    Lazy(LazyFn<T>),
}

impl<T: Clone> Deferred<T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn lazy(f: impl Fn(&OptionsContext<'_>) -> T + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(f))
    }

    /// Produces the concrete value for `ctx`.
    pub fn evaluate(&self, ctx: &OptionsContext<'_>) -> T {
        match self {
            Self::Value(value) => value.clone(),
            Self::Lazy(f) => f(ctx),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Lazy(f) => Self::Lazy(Arc::clone(f)),
        }
    }
}

// Closures compare by identity: two resolutions of one declaration share the
// same `Arc`, distinct declarations never do.
impl<T: PartialEq> PartialEq for Deferred<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: Debug> Debug for Deferred<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Deferred, OptionsContext};
    use crate::node::options::Options;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn literal_ignores_options() {
        let options = Options::new().with("inline", true);
        let field = Deferred::value(Some(false));
        assert_eq!(field.evaluate(&OptionsContext::new(&options)), Some(false));
        assert!(!field.is_lazy());
    }

    #[test]
    fn lazy_reads_options_given_at_evaluation() {
        let field = Deferred::lazy(|ctx| ctx.options.get_bool("inline"));

        let inline = Options::new().with("inline", true);
        let block = Options::new().with("inline", false);
        assert_eq!(field.evaluate(&OptionsContext::new(&inline)), Some(true));
        assert_eq!(field.evaluate(&OptionsContext::new(&block)), Some(false));
        assert_eq!(field.evaluate(&OptionsContext::new(&Options::new())), None);
    }

    #[test]
    fn lazy_is_not_invoked_until_evaluated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let field = Deferred::lazy(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("inline*".to_string())
        });
        let copy = field.clone();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let options = Options::new();
        copy.evaluate(&OptionsContext::new(&options));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_of_lazy_compare_equal_but_fresh_closures_do_not() {
        let field: Deferred<Option<bool>> = Deferred::lazy(|_| Some(true));
        assert_eq!(field, field.clone());
        assert_ne!(field, Deferred::lazy(|_| Some(true)));
        assert_ne!(field, Deferred::value(Some(true)));
    }
}
