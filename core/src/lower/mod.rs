//! file: core/src/lower/mod.rs
//! description: IR to target AST lowering driver.
//!
//! `lower_module` is the entry point: it normalizes the module in place,
//! selects the files to lower, pre-declares every top-level function name in
//! the global scope, reserves the names the files use without declaring
//! them and then lowers each declaration in file order. The
//! result is one program block plus the scope registry that owns its names
//! and the known-gap diagnostics collected on the way.

pub mod err;
pub mod function_builder;
pub mod lower_decl;
pub mod lower_expr;
pub mod lower_stmt;
pub mod lowering_context;
pub mod options;

use std::collections::{BTreeSet, HashSet};

use log::debug;

use crate::ir::{IrFile, IrModule, IrNode, IrNodeKind, normalize_module};
use crate::js::{JsBlock, ScopeRegistry};

pub use err::{Diagnostic, LowerResult, LoweringError, LoweringErrorKind, Position};
pub use function_builder::FunctionBuilder;
pub use lower_decl::lower_declaration;
pub use lower_expr::lower_expression;
pub use lower_stmt::lower_statement;
pub use lowering_context::LoweringContext;
pub use options::{FileSelection, LongConstantPolicy, LoweringOptions};

/// Output of one successful run.
#[derive(Debug)]
pub struct LoweredModule {
    pub program: JsBlock,
    pub scopes: ScopeRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoweredModule {
    /// False when any construct was lowered to a placeholder or with a
    /// documented loss.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_gap)
    }

    pub fn gaps(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_gap())
    }
}

pub fn lower_module(module: &mut IrModule, options: LoweringOptions) -> LowerResult<LoweredModule> {
    if module.files.is_empty() {
        return Err(LoweringError::with(
            LoweringErrorKind::InvariantViolation,
            format!("module `{}` has no files", module.name),
            "Module".to_string(),
            module.to_string(),
            None,
            None,
        ));
    }

    normalize_module(module)?;

    let mut ctx = LoweringContext::new(options);
    let selected = match ctx.options.files {
        FileSelection::All => module.files.len(),
        FileSelection::FirstOnly => 1,
    };
    for skipped in module.files.iter().skip(selected) {
        ctx.report_info(format!(
            "file `{}` skipped ({} declarations); only the first file is lowered",
            skipped.name,
            skipped.declarations.len()
        ));
    }
    let files = &module.files[..selected];

    for decl in files.iter().flat_map(|f| f.declarations.iter()) {
        if let IrNodeKind::Function(function) = decl.get_kind() {
            ctx.declare_function_name(decl, function);
        }
    }
    for name in external_names(files) {
        ctx.reserve_external(name);
    }

    let mut statements = Vec::new();
    for file in files {
        debug!("lowering file {} ({} declarations)", file.name, file.declarations.len());
        for decl in &file.declarations {
            statements.push(lower_declaration(decl, &mut ctx)?);
        }
    }

    debug!(
        "module {}: {} statements, {} scopes, {} literal requests, {} unique strings",
        module.name,
        statements.len(),
        ctx.scopes.len(),
        ctx.literals.requests(),
        ctx.literals.unique_strings()
    );

    let diagnostics = ctx.take_diagnostics();
    Ok(LoweredModule { program: JsBlock::new(statements), scopes: ctx.scopes, diagnostics })
}

/// Callees and singletons referenced but not declared by any function in
/// `files`. Lowering emits them verbatim.
fn external_names(files: &[IrFile]) -> BTreeSet<&str> {
    let mut referenced = BTreeSet::new();
    let mut declared = HashSet::new();
    let mut pending: Vec<&IrNode> = files.iter().flat_map(|f| f.declarations.iter()).collect();
    while let Some(node) = pending.pop() {
        match node.get_kind() {
            IrNodeKind::Function(function) => {
                declared.insert(function.name.as_str());
            }
            IrNodeKind::Call(call) if call.dispatch_receiver.is_none() => {
                referenced.insert(call.callee.as_str());
            }
            IrNodeKind::GetObjectValue { name } | IrNodeKind::GetEnumValue { enum_name: name, .. } => {
                referenced.insert(name.as_str());
            }
            _ => {}
        }
        pending.extend(node.children());
    }
    referenced.retain(|name| !declared.contains(name));
    referenced
}
