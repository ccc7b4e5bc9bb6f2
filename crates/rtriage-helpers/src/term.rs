//! Compiled transformation terms and their per-event result.

use std::fmt;
use std::sync::Arc;

use rtriage_event::Document;

/// A compiled per-event operation.
///
/// `apply` mutates the event and reports the failure reason on `Err`; the
/// owning [`Term`] turns that into a formatted trace. Implementations must
/// not retain cross-event state behind `&self` unless they are prepared
/// for concurrent invocation on distinct events.
pub trait Operation: Send + Sync {
    fn apply(&self, event: &mut Document) -> std::result::Result<(), String>;
}

/// Closures over a document are operations; this is the escape hatch for
/// expression builders that produce terms outside the helper catalogue.
impl<F> Operation for F
where
    F: Fn(&mut Document) -> std::result::Result<(), String> + Send + Sync,
{
    fn apply(&self, event: &mut Document) -> std::result::Result<(), String> {
        self(event)
    }
}

/// The outcome of applying a term to one event.
///
/// Traces are human-readable strings in the tracer format
/// `[<term name>] -> Success` / `[<term name>] -> Failure: <reason>`;
/// they deliberately carry no structured error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermResult {
    Success { trace: String },
    Failure { trace: String },
}

impl TermResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TermResult::Success { .. })
    }

    pub fn trace(&self) -> &str {
        match self {
            TermResult::Success { trace } | TermResult::Failure { trace } => trace,
        }
    }
}

/// A compiled, reference-counted transformation over an event.
///
/// Terms are immutable and cheap to clone; a route clones one term handle
/// per worker. Applying a term either completes its writes or fails with a
/// trace; partial writes from a failing term are not rolled back.
#[derive(Clone)]
pub struct Term {
    name: Arc<str>,
    op: Arc<dyn Operation>,
}

impl Term {
    pub fn new(name: impl Into<Arc<str>>, op: impl Operation + 'static) -> Self {
        Term {
            name: name.into(),
            op: Arc::new(op),
        }
    }

    /// Display name used in traces, e.g. `s_up(/field, $/src)`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the term to one event.
    pub fn apply(&self, event: &mut Document) -> TermResult {
        match self.op.apply(event) {
            Ok(()) => TermResult::Success {
                trace: format!("[{}] -> Success", self.name),
            },
            Err(reason) => TermResult::Failure {
                trace: format!("[{}] -> Failure: {}", self.name, reason),
            },
        }
    }

    /// Filter shorthand: success means "accept".
    pub fn accepts(&self, event: &mut Document) -> bool {
        self.apply(event).is_success()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_operation() {
        let term = Term::new("touch(/seen)", |event: &mut Document| {
            event.set_int("/seen", 1).map_err(|e| e.to_string())
        });
        let mut event = Document::new();
        let result = term.apply(&mut event);
        assert!(result.is_success());
        assert_eq!(result.trace(), "[touch(/seen)] -> Success");
        assert_eq!(event.get_int("/seen"), Some(1));
    }

    #[test]
    fn test_failure_trace_format() {
        let term = Term::new("always_fail", |_: &mut Document| -> Result<(), String> {
            Err("boom".to_string())
        });
        let mut event = Document::new();
        let result = term.apply(&mut event);
        assert!(!result.is_success());
        assert_eq!(result.trace(), "[always_fail] -> Failure: boom");
        assert!(!term.accepts(&mut event));
    }

    #[test]
    fn test_terms_are_cheap_to_clone() {
        let term = Term::new("noop", |_: &mut Document| -> Result<(), String> { Ok(()) });
        let copy = term.clone();
        assert_eq!(term.name(), copy.name());
        let mut event = Document::new();
        assert!(copy.accepts(&mut event));
    }
}
