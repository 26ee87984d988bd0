use log::trace;

use crate::js::{JsBlock, JsFunction, JsParameter, JsStatement, JsVar, ScopeId, ScopeRegistry};

/// Per-function lowering frame: the function's own scope, its parameter list
/// in binding order, and the temporaries expression lowering asked for while
/// the body was being built. Finishing the builder produces the target
/// function value.
#[derive(Debug)]
pub struct FunctionBuilder {
    name: String,
    scope: ScopeId,
    parameters: Vec<JsParameter>,
    temporaries: Vec<String>,
}

impl FunctionBuilder {
    pub fn new(name: &str, scopes: &mut ScopeRegistry, parent: ScopeId) -> Self {
        let scope = scopes.child(parent, format!("scope for {}", name));
        FunctionBuilder { name: name.to_string(), scope, parameters: Vec::new(), temporaries: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn add_parameter(&mut self, scopes: &mut ScopeRegistry, ident: &str) -> String {
        let name = scopes.declare_name(self.scope, ident);
        self.parameters.push(JsParameter { name: name.clone() });
        name
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn declare_temporary(&mut self, scopes: &mut ScopeRegistry) -> String {
        let name = scopes.allocate_temporary(self.scope, "tmp$");
        self.temporaries.push(name.clone());
        name
    }

    /// Builds the function value. Temporaries become one leading `var`.
    pub fn finish(self, mut body: JsBlock) -> JsFunction {
        if !self.temporaries.is_empty() {
            trace!("{}: {} temporaries", self.name, self.temporaries.len());
            let vars = self
                .temporaries
                .into_iter()
                .map(|name| JsVar { name, initializer: None })
                .collect();
            body.statements.insert(0, JsStatement::Vars { vars });
        }
        JsFunction { scope: self.scope, parameters: self.parameters, body }
    }
}
