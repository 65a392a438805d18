//! Terminal rendering of diagnostics.

use console::{style, StyledObject};
use tokenloom_engine::{Diagnostic, DiagnosticSink, Severity};

fn label(severity: Severity) -> StyledObject<&'static str> {
    match severity {
        Severity::Error => style("error").red().bold(),
        Severity::Warning => style("warning").yellow().bold(),
    }
}

/// One diagnostic, with its file and related locations on following lines.
pub fn render(diagnostic: &Diagnostic) -> String {
    let mut out = format!("{}[{}]", label(diagnostic.severity), diagnostic.kind);
    if let Some(path) = &diagnostic.path {
        out.push_str(&format!(" {}", style(path).bold()));
    }
    out.push_str(&format!(": {}", diagnostic.message));
    if let Some(file) = &diagnostic.file {
        out.push_str(&format!("\n  {} {}", style("-->").blue(), file.display()));
    }
    for related in &diagnostic.related {
        out.push_str(&format!("\n  {} {}", style("related:").cyan(), related.path));
        if let Some(file) = &related.file {
            out.push_str(&format!(" ({})", file.display()));
        }
    }
    out
}

pub fn print_all<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        eprintln!("{}", render(diagnostic));
    }
}

/// `N error(s), M warning(s)`.
pub fn summary(errors: usize, warnings: usize) -> String {
    let errors = format!("{} error(s)", errors);
    let warnings = format!("{} warning(s)", warnings);
    format!("{}, {}", style(errors).red(), style(warnings).yellow())
}

/// Prints diagnostics to stderr as they arrive.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub emitted: usize,
}

impl DiagnosticSink for ConsoleSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.emitted += 1;
        eprintln!("{}", render(&diagnostic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tokenloom_engine::DiagnosticKind;

    #[test]
    fn test_render_plain() {
        console::set_colors_enabled(false);
        let diag = Diagnostic::error(DiagnosticKind::Cycle, "alias cycle: a -> b -> a")
            .at("a")
            .in_file(Some(Path::new("tokens/a.json")))
            .with_related("b", Some(Path::new("tokens/b.json")));
        assert_eq!(
            render(&diag),
            "error[cycle] a: alias cycle: a -> b -> a\n  --> tokens/a.json\n  related: b (tokens/b.json)"
        );
    }

    #[test]
    fn test_render_warning_without_path() {
        console::set_colors_enabled(false);
        let diag = Diagnostic::warning(DiagnosticKind::Merge, "replaced color.bg");
        assert_eq!(render(&diag), "warning[merge]: replaced color.bg");
    }
}
