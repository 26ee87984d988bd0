/// cli/src/output.rs
/// Report rendering for the CLI
/// description: Styles and tables for lowering diagnostics and failures.
/// Everything renders into a `String` so callers decide where it goes.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use console::Style;
use ir2js_core::{Diagnostic, Ir2JsErrorExt, Level, LoweredModule, LoweringError, generate_error_report};

/// Styles for different output elements
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error | Level::Critical => &self.error,
        }
    }
}

#[derive(Default)]
pub struct ReportPrinter {
    formatting: FormatStyle,
}

impl ReportPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary line plus a diagnostics table when there is anything to show.
    pub fn lowered(&self, module_name: &str, lowered: &LoweredModule) -> String {
        let mut out = String::new();
        let statements = lowered.program.statements.len();
        if lowered.is_complete() {
            let line = format!("{}: lowered {} top-level statements", module_name, statements);
            out.push_str(&self.formatting.success.apply_to(line).to_string());
        } else {
            let line = format!(
                "{}: lowered {} top-level statements, incomplete ({} known gaps)",
                module_name,
                statements,
                lowered.gaps().count()
            );
            out.push_str(&self.formatting.warning.apply_to(line).to_string());
        }
        out.push('\n');

        if !lowered.diagnostics.is_empty() {
            out.push_str(&self.formatting.title.apply_to("Diagnostics").to_string());
            out.push('\n');
            out.push_str(&self.diagnostics_table(&lowered.diagnostics).to_string());
            out.push('\n');
        }
        out
    }

    pub fn failure(&self, error: &LoweringError) -> String {
        let header = generate_error_report(error);
        format!(
            "{}\n{}",
            self.formatting.for_level(error.level()).apply_to(header),
            error.dump()
        )
    }

    fn diagnostics_table(&self, diagnostics: &[Diagnostic]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Level", "Node", "Location", "Message"]);
        for diagnostic in diagnostics {
            let location = diagnostic.location().map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
            table.add_row(vec![
                diagnostic.level().to_string(),
                diagnostic.node_kind().to_string(),
                location,
                diagnostic.message(),
            ]);
        }
        table
    }
}
