use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the typetrace binary.
#[derive(Parser, Debug)]
#[command(
    name = "typetrace",
    version,
    about = "Trace how a structural type system resolves a type expression"
)]
pub struct CliArgs {
    /// The type expression to resolve, e.g. 'Test<"a" | "b">'.
    #[arg(long)]
    pub expr: String,

    /// Path to a file of auxiliary `type X = ...;` declarations.
    #[arg(long, conflicts_with = "decls_text")]
    pub decls: Option<PathBuf>,

    /// Auxiliary declarations given inline.
    #[arg(long = "decls-text")]
    pub decls_text: Option<String>,

    /// Output format for the finished trace.
    #[arg(long, value_enum, default_value = "text", ignore_case = true)]
    pub format: Format,

    /// Abort resolution after this many trace steps.
    #[arg(long = "max-steps")]
    pub max_steps: Option<usize>,

    /// Enable debug logging to stderr (same as TYPETRACE_LOG=debug).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Indented, kind-colored step listing plus the final type.
    Text,
    /// The resolution result as JSON.
    Json,
}

impl CliArgs {
    /// The declaration source, reading `--decls` from disk when given.
    pub fn declarations(&self) -> anyhow::Result<Option<String>> {
        if let Some(path) = &self.decls {
            let source = std::fs::read_to_string(path).map_err(|err| {
                anyhow::anyhow!("cannot read declarations from `{}`: {err}", path.display())
            })?;
            return Ok(Some(source));
        }
        Ok(self.decls_text.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let args = CliArgs::parse_from(["typetrace", "--expr", "Test<1>"]);
        assert_eq!(args.expr, "Test<1>");
        assert_eq!(args.format, Format::Text);
        assert!(args.declarations().unwrap().is_none());
    }

    #[test]
    fn decls_file_and_inline_text_conflict() {
        let result = CliArgs::try_parse_from([
            "typetrace",
            "--expr",
            "X",
            "--decls",
            "a.ts",
            "--decls-text",
            "type X = 1;",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn reads_declarations_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "type X = 1;").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args = CliArgs::parse_from(["typetrace", "--expr", "X", "--decls", &path]);
        assert_eq!(args.declarations().unwrap().as_deref(), Some("type X = 1;"));
    }

    #[test]
    fn missing_declarations_file_is_an_error() {
        let args = CliArgs::parse_from([
            "typetrace",
            "--expr",
            "X",
            "--decls",
            "/nonexistent/decls.ts",
        ]);
        assert!(args.declarations().is_err());
    }

    #[test]
    fn format_is_case_insensitive() {
        let args = CliArgs::parse_from(["typetrace", "--expr", "X", "--format", "JSON"]);
        assert_eq!(args.format, Format::Json);
    }
}
