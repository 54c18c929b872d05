//! Variable bindings visible while generating a tree.

use crate::clock::Timestamp;
use indexmap::IndexMap;
use log::warn;

/// Scope stack of name → string bindings plus read-only system values.
///
/// The bottom scope is global and holds `stdin` bindings. Each loop iteration
/// pushes its own scope, so popping it restores the loop variable to whatever
/// it was before the loop (or removes it).
///
/// `date` and `time` never change for the rest of a run. A loop variable with one
/// of those names shadows it inside the loop body only.
#[derive(Debug, Clone)]
pub struct Environment {
    system: IndexMap<String, String>,
    scopes: Vec<IndexMap<String, String>>,
}

impl Environment {
    /// Creates an environment with `date` and `time` taken from the current clock.
    pub fn new() -> Self {
        Self::with_timestamp(Timestamp::now())
    }

    pub fn with_timestamp(timestamp: Timestamp) -> Self {
        let mut system = IndexMap::new();
        system.insert("date".to_string(), timestamp.date());
        system.insert("time".to_string(), timestamp.time());
        Self {
            system,
            scopes: vec![IndexMap::new()],
        }
    }

    /// Looks a name up from the innermost scope outwards, then in the system values.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.system.get(name))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Opens a scope binding `name` to `value`.
    pub fn push_scope(&mut self, name: &str, value: String) {
        let mut scope = IndexMap::new();
        scope.insert(name.to_string(), value);
        self.scopes.push(scope);
    }

    /// Closes the innermost scope. The global scope is never removed.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope that already has it, or in the global scope.
    ///
    /// System values cannot be assigned; the call is ignored with a warning unless a
    /// loop scope currently binds the name.
    pub fn assign(&mut self, name: &str, value: String) {
        let in_scope = self.scopes.iter().any(|scope| scope.contains_key(name));
        if self.system.contains_key(name) && !in_scope {
            warn!("'{}' is a read-only system value, ignoring assignment", name);
            return;
        }
        let index = self
            .scopes
            .iter()
            .rposition(|scope| scope.contains_key(name))
            .unwrap_or(0);
        self.scopes[index].insert(name.to_string(), value);
    }

    /// All visible bindings, inner scopes overriding outer ones and system values.
    pub fn bindings(&self) -> IndexMap<String, String> {
        let mut visible = self.system.clone();
        for scope in &self.scopes {
            for (name, value) in scope {
                visible.insert(name.clone(), value.clone());
            }
        }
        visible
    }

    /// Visible bindings as a JSON object for the template renderer.
    pub fn to_context(&self) -> serde_json::Value {
        let map = self
            .bindings()
            .into_iter()
            .map(|(name, value)| (name, serde_json::Value::String(value)))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
