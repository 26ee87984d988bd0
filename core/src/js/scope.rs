//! file: core/src/js/scope.rs
//! description: hierarchical name allocator for generated identifiers.
//!
//! A `ScopeRegistry` is an arena of scopes owned by one lowering run. Scope 0
//! is the program's global scope; every lowered function gets a child scope,
//! catch clauses get a child of their function's scope. Each scope maps source
//! identifiers to the target names allocated for them and remembers every name
//! it handed out so two identifiers never collide.
//!
//! Functions live in their own namespace: a local variable never hides a
//! function of the same source name from a call. Both namespaces draw target
//! names from the same pool, so the generated names stay distinct.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use log::trace;
use serde::Serialize;

lazy_static! {
    /// Words the target language does not accept as binding names.
    static ref RESERVED_WORDS: HashSet<&'static str> = [
        "arguments", "await", "break", "case", "catch", "class", "const", "continue",
        "debugger", "default", "delete", "do", "else", "enum", "eval", "export",
        "extends", "false", "finally", "for", "function", "if", "implements",
        "import", "in", "instanceof", "interface", "let", "new", "null", "package",
        "private", "protected", "public", "return", "static", "super", "switch",
        "this", "throw", "true", "try", "typeof", "undefined", "var", "void",
        "while", "with", "yield", "NaN", "Infinity",
    ]
    .into_iter()
    .collect();
}

pub fn is_reserved_word(ident: &str) -> bool {
    RESERVED_WORDS.contains(ident)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct ScopeData {
    parent: Option<ScopeId>,
    description: String,
    bindings: HashMap<String, String>,
    functions: HashMap<String, String>,
    /// Overload keys to the function names allocated for them.
    signatures: HashMap<String, String>,
    allocated: HashSet<String>,
}

impl ScopeData {
    fn new(parent: Option<ScopeId>, description: String) -> Self {
        ScopeData {
            parent,
            description,
            bindings: HashMap::new(),
            functions: HashMap::new(),
            signatures: HashMap::new(),
            allocated: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScopeRegistry {
    scopes: Vec<ScopeData>,
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeRegistry {
    pub fn new() -> Self {
        ScopeRegistry { scopes: vec![ScopeData::new(None, "global".to_string())] }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn child(&mut self, parent: ScopeId, description: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeData::new(Some(parent), description.into()));
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    pub fn description(&self, scope: ScopeId) -> &str {
        &self.scopes[scope.0].description
    }

    /// Binds `ident` in `scope` to a name no enclosing scope has handed out.
    /// Declaring the same identifier twice in one scope returns the name
    /// allocated the first time.
    pub fn declare_name(&mut self, scope: ScopeId, ident: &str) -> String {
        if let Some(existing) = self.scopes[scope.0].bindings.get(ident) {
            return existing.clone();
        }
        let base = sanitize(ident);
        let name = self.disambiguate(&base, |candidate| self.is_visible(scope, candidate));
        self.bind(scope, ident, name)
    }

    /// Always allocates a new name for `ident`, distinct from every name
    /// allocated in `scope` or any scope enclosing it, and rebinds `ident`.
    pub fn declare_fresh_name(&mut self, scope: ScopeId, ident: &str) -> String {
        let base = sanitize(ident);
        let name = self.disambiguate(&base, |candidate| self.is_visible(scope, candidate));
        self.bind(scope, ident, name)
    }

    /// Binds a function in `scope`'s function namespace under a new name.
    /// With a `signature`, calls naming that overload find this binding even
    /// after a later overload rebinds `ident`.
    pub fn declare_function(&mut self, scope: ScopeId, ident: &str, signature: Option<&str>) -> String {
        let base = sanitize(ident);
        let name = self.disambiguate(&base, |candidate| self.is_visible(scope, candidate));
        trace!("function {} -> {} in scope {}", ident, name, self.description(scope));
        let data = &mut self.scopes[scope.0];
        data.allocated.insert(name.clone());
        data.functions.insert(ident.to_string(), name.clone());
        if let Some(signature) = signature {
            data.signatures.insert(signature.to_string(), name.clone());
        }
        name
    }

    /// Resolves a callee walking outward from `scope`. An overload key wins
    /// over the plain name anywhere in the chain.
    pub fn resolve_function(&self, scope: ScopeId, ident: &str, signature: Option<&str>) -> Option<&str> {
        if let Some(signature) = signature {
            if let Some(name) = self.lookup(scope, |data| data.signatures.get(signature)) {
                return Some(name);
            }
        }
        self.lookup(scope, |data| data.functions.get(ident))
    }

    /// Marks `name` as taken in `scope` without binding it, for names the
    /// program refers to but does not declare.
    pub fn reserve(&mut self, scope: ScopeId, name: &str) {
        self.scopes[scope.0].allocated.insert(name.to_string());
    }

    /// Allocates a name that no source identifier resolves to.
    pub fn allocate_temporary(&mut self, scope: ScopeId, hint: &str) -> String {
        let base = sanitize(hint);
        let name = self.disambiguate(&base, |candidate| self.is_visible(scope, candidate));
        trace!("temporary {} in scope {}", name, self.description(scope));
        self.scopes[scope.0].allocated.insert(name.clone());
        name
    }

    /// Resolves `ident` walking outward from `scope`.
    pub fn resolve(&self, scope: ScopeId, ident: &str) -> Option<&str> {
        self.lookup(scope, |data| data.bindings.get(ident))
    }

    fn lookup<'a>(&'a self, scope: ScopeId, find: impl Fn(&'a ScopeData) -> Option<&'a String>) -> Option<&'a str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = &self.scopes[id.0];
            if let Some(name) = find(data) {
                return Some(name);
            }
            current = data.parent;
        }
        None
    }

    pub fn is_declared_in(&self, scope: ScopeId, ident: &str) -> bool {
        self.scopes[scope.0].bindings.contains_key(ident)
    }

    fn is_visible(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = &self.scopes[id.0];
            if data.allocated.contains(name) {
                return true;
            }
            current = data.parent;
        }
        false
    }

    fn disambiguate(&self, base: &str, taken: impl Fn(&str) -> bool) -> String {
        if !taken(base) {
            return base.to_string();
        }
        let separator = if base.ends_with('$') { "" } else { "_" };
        (0..)
            .map(|n| format!("{}{}{}", base, separator, n))
            .find(|candidate| !taken(candidate.as_str()))
            .unwrap_or_else(|| base.to_string())
    }

    fn bind(&mut self, scope: ScopeId, ident: &str, name: String) -> String {
        trace!("{} -> {} in scope {}", ident, name, self.description(scope));
        let data = &mut self.scopes[scope.0];
        data.allocated.insert(name.clone());
        data.bindings.insert(ident.to_string(), name.clone());
        name
    }
}

/// Maps a source identifier onto the target's identifier alphabet.
pub fn sanitize(ident: &str) -> String {
    let mut out: String = ident
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if is_reserved_word(&out) {
        out.push('$');
    }
    out
}
