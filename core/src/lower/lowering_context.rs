//! file: core/src/lower/lowering_context.rs
//! description: state threaded through one lowering run.
//!
//! `LoweringContext` owns everything a run allocates: the scope registry, the
//! literal pool, the stack of functions being built and the diagnostics
//! collected so far. It is created per module and passed by `&mut` to every
//! lowering function. Nothing lives in process-wide state.

use std::collections::HashMap;

use log::warn;

use crate::ir::{FunctionDecl, IrNode, NodeId};
use crate::js::{LiteralPool, ScopeId, ScopeRegistry};

use super::err::{Diagnostic, LowerResult, LoweringError};
use super::function_builder::FunctionBuilder;
use super::options::LoweringOptions;

#[derive(Debug)]
pub struct LoweringContext {
    pub options: LoweringOptions,
    pub scopes: ScopeRegistry,
    pub literals: LiteralPool,
    /// Innermost scope last. Starts with the global scope.
    scope_stack: Vec<ScopeId>,
    frames: Vec<FunctionBuilder>,
    /// Global names pre-allocated for top-level function declarations.
    function_names: HashMap<NodeId, String>,
    diagnostics: Vec<Diagnostic>,
}

impl LoweringContext {
    pub fn new(options: LoweringOptions) -> Self {
        LoweringContext {
            options,
            scopes: ScopeRegistry::new(),
            literals: LiteralPool::new(),
            scope_stack: vec![ScopeId::GLOBAL],
            frames: Vec::new(),
            function_names: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(ScopeId::GLOBAL)
    }

    /// Runs `f` with `builder` as the innermost function frame and hands the
    /// frame back together with `f`'s result.
    pub fn with_function<T>(
        &mut self,
        builder: FunctionBuilder,
        f: impl FnOnce(&mut Self) -> LowerResult<T>,
    ) -> (FunctionBuilder, LowerResult<T>) {
        let depth = self.frames.len();
        self.scope_stack.push(builder.scope());
        self.frames.push(builder);
        let result = f(self);
        self.scope_stack.pop();
        (self.frames.remove(depth), result)
    }

    /// Runs `f` inside a fresh child of the current scope.
    pub fn with_block_scope<T>(
        &mut self,
        description: &str,
        f: impl FnOnce(&mut Self, ScopeId) -> LowerResult<T>,
    ) -> LowerResult<T> {
        let scope = self.scopes.child(self.current_scope(), description);
        self.scope_stack.push(scope);
        let result = f(self, scope);
        self.scope_stack.pop();
        result
    }

    /// Binds a local identifier in the current scope.
    pub fn declare_local(&mut self, ident: &str) -> String {
        let scope = self.current_scope();
        self.scopes.declare_name(scope, ident)
    }

    pub fn resolve(&self, ident: &str) -> Option<String> {
        self.scopes.resolve(self.current_scope(), ident).map(str::to_string)
    }

    /// Resolved name, or the identifier itself when it names something
    /// declared outside this module.
    pub fn resolve_or_external(&self, ident: &str) -> String {
        self.resolve(ident).unwrap_or_else(|| ident.to_string())
    }

    /// Binds a local function in the current scope's function namespace.
    pub fn declare_local_function(&mut self, function: &FunctionDecl) -> String {
        let scope = self.current_scope();
        self.scopes.declare_function(scope, &function.name, function.signature.as_deref())
    }

    /// Target name for a call without a dispatch receiver. Only functions are
    /// candidates; anything unresolved is declared outside this module.
    pub fn resolve_callee(&self, ident: &str, target: Option<&str>) -> String {
        self.scopes
            .resolve_function(self.current_scope(), ident, target)
            .map(str::to_string)
            .unwrap_or_else(|| ident.to_string())
    }

    /// Temporary owned by the innermost function. `node` is the expression
    /// that needs it.
    pub fn declare_temporary(&mut self, node: &IrNode) -> LowerResult<String> {
        match self.frames.last_mut() {
            Some(frame) => Ok(frame.declare_temporary(&mut self.scopes)),
            None => Err(LoweringError::invariant(node, "temporary requested outside of a function")),
        }
    }

    /// Allocates the global name for a top-level function once.
    pub fn declare_function_name(&mut self, decl: &IrNode, function: &FunctionDecl) -> String {
        if let Some(name) = self.function_names.get(&decl.get_id()) {
            return name.clone();
        }
        let name = self.scopes.declare_function(ScopeId::GLOBAL, &function.name, function.signature.as_deref());
        self.function_names.insert(decl.get_id(), name.clone());
        name
    }

    /// Keeps local bindings from taking `name`, which the program uses for
    /// something it does not declare.
    pub fn reserve_external(&mut self, name: &str) {
        self.scopes.reserve(ScopeId::GLOBAL, name);
    }

    pub fn function_name(&self, decl: &IrNode) -> Option<String> {
        self.function_names.get(&decl.get_id()).cloned()
    }

    /// Records a recognized-but-unimplemented construct.
    pub fn report_gap(&mut self, node: &IrNode, message: String) {
        warn!("known gap: {} ({})", message, node.kind_name());
        self.diagnostics.push(Diagnostic::known_gap(node, message));
    }

    pub fn report_info(&mut self, message: String) {
        self.diagnostics.push(Diagnostic::info(message));
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
