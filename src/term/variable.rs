//! Logic variables and the scopes that consolidate their names.
//!
//! A [`Variable`] pairs a public name (what the user wrote, e.g. `X`) with an
//! internal [`VarId`]. Identity is the id alone: two variables called `X` built
//! in different scopes are different variables. A [`VarScope`] hands out one
//! identity per public name, so every `X` inside a single rule or query shares
//! a binding.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Niche-optimized internal identity of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VarId(NonZeroU64);

impl VarId {
    /// Create a `VarId` from a raw `u64`. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(VarId)
    }

    /// Allocate a process-unique id.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let raw = NEXT.fetch_add(1, Ordering::Relaxed);
        // Wrapping past u64::MAX would take centuries of allocation.
        VarId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_G{}", self.0)
    }
}

/// A logic variable: public name plus internal identity.
#[derive(Debug, Clone)]
pub struct Variable {
    name: Arc<str>,
    id: VarId,
}

impl Variable {
    /// Create a variable with a fresh identity.
    ///
    /// Prefer [`VarScope::var`] when several occurrences of the same name
    /// must share one identity.
    pub fn fresh(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            id: VarId::fresh(),
        }
    }

    /// The name the variable was written with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The internal identity.
    pub fn id(&self) -> VarId {
        self.id
    }

    /// A copy of this variable with the same public name and a new identity.
    pub fn renamed(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            id: VarId::fresh(),
        }
    }

    /// Whether this is the anonymous variable `_`.
    pub fn is_anonymous(&self) -> bool {
        &*self.name == "_"
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One construction scope: every request for the same public name returns
/// the same variable, except the anonymous `_` which is always fresh.
#[derive(Debug, Default, Clone)]
pub struct VarScope {
    vars: HashMap<Arc<str>, Variable>,
}

impl VarScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the variable called `name` in this scope.
    pub fn var(&mut self, name: &str) -> Variable {
        if name == "_" {
            return Variable::fresh("_");
        }
        if let Some(v) = self.vars.get(name) {
            return v.clone();
        }
        let v = Variable::fresh(name);
        self.vars.insert(Arc::clone(&v.name), v.clone());
        v
    }

    /// Number of named variables in the scope.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the scope holds no named variables.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
