pub mod error;
pub mod ir;
pub mod js;
pub mod location;
pub mod lower;

pub use error::{Ir2JsErrorExt, Level};
pub use ir::{IrFile, IrModule, IrNode, IrNodeKind};
pub use js::{JsBlock, JsExpression, JsStatement};
pub use location::{Location, Span};
pub use lower::{Diagnostic, LoweredModule, LoweringError, LoweringErrorKind, LoweringOptions, lower_module};

pub fn generate_error_report<E: Ir2JsErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("IR2JS | {} | {} | {}", level, location, message)
}

/// Normalizes and lowers `module`. The module is rewritten in place by the
/// normalizer; on failure nothing of the partial output is returned.
pub fn lower_ir_to_js(
    module: &mut IrModule,
    options: LoweringOptions,
) -> Result<LoweredModule, Box<dyn Ir2JsErrorExt>> {
    lower_module(module, options).map_err(|e| Box::new(e) as Box<dyn Ir2JsErrorExt>)
}
