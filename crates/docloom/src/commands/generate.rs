//! `docloom` generate command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use docloom_config::{CliSettings, ProjectConfig};
use docloom_site::{Diagnostic, GenerationOutput, Generator, Severity};
use serde::Serialize;

use crate::error::CliError;
use crate::output::Output;
use crate::writer::{self, FileReport, FileStatus};

/// Arguments for generating documentation.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to the YAML configuration file.
    config: PathBuf,

    /// Output directory for generated documents.
    #[arg(short, long, default_value = "docs")]
    output: PathBuf,

    /// Show what would change without writing files.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Fail when any warning is raised.
    #[arg(long, env = "DOCLOOM_STRICT")]
    strict: bool,

    /// Do not generate index.rst (overrides config).
    #[arg(long)]
    no_index: bool,

    /// Do not run API extractors (overrides config).
    #[arg(long)]
    no_extract: bool,

    /// Render PlantUML diagrams as code blocks (overrides config).
    #[arg(long)]
    no_plantuml: bool,

    /// Render Mermaid diagrams as code blocks (overrides config).
    #[arg(long)]
    no_mermaid: bool,

    /// Print a JSON run summary to stdout.
    #[arg(long)]
    json: bool,
}

/// Machine-readable run summary.
#[derive(Serialize)]
struct RunSummary<'a> {
    output_dir: &'a Path,
    dry_run: bool,
    files: &'a [FileReport],
    diagnostics: &'a [Diagnostic],
}

impl GenerateArgs {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns an error if loading, generation or writing fails, or if
    /// warnings were raised in strict mode.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = ProjectConfig::load(&self.config, Some(&cli_settings))?;
        let generator = Generator::new(&config).with_output_dir(&self.output);
        let output_dir = generator.output_dir().to_path_buf();

        output.info(&format!("Config: {}", config.config_path().display()));
        output.info(&format!("Output: {}", output_dir.display()));

        let result = generator.run()?;
        print_diagnostics(&output, &result.diagnostics);

        let reports = writer::diff(&output_dir, &result.files)?;
        let warnings = result.warning_count();

        if self.json {
            let summary = RunSummary {
                output_dir: &output_dir,
                dry_run: self.dry_run,
                files: &reports,
                diagnostics: &result.diagnostics,
            };
            output.data(&serde_json::to_string_pretty(&summary)?);
        }

        if self.strict && warnings > 0 {
            return Err(CliError::Strict { warnings });
        }

        if self.dry_run {
            print_dry_run(&output, &reports);
        } else {
            let written = writer::write(&output_dir, &result.files, &reports)?;
            print_summary(&output, &result, &reports, written);
        }
        Ok(())
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            generate_index: self.no_index.then_some(false),
            extraction_enabled: self.no_extract.then_some(false),
            plantuml: self.no_plantuml.then_some(false),
            mermaid: self.no_mermaid.then_some(false),
        }
    }
}

fn print_diagnostics(output: &Output, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => output.warning(&format!("warning: {diagnostic}")),
            Severity::Advisory => output.muted(&format!("note: {diagnostic}")),
        }
    }
}

fn print_dry_run(output: &Output, reports: &[FileReport]) {
    output.highlight("\n[DRY RUN] No files written.");
    for report in reports {
        let line = format!("  {:<9} {}", report.status.label(), report.path.display());
        match report.status {
            FileStatus::New => output.success(&line),
            FileStatus::Changed => output.warning(&line),
            FileStatus::Unchanged => output.muted(&line),
        }
    }
    output.info(&format!(
        "\n{} new, {} changed, {} unchanged",
        writer::count(reports, FileStatus::New),
        writer::count(reports, FileStatus::Changed),
        writer::count(reports, FileStatus::Unchanged),
    ));
}

fn print_summary(
    output: &Output,
    result: &GenerationOutput,
    reports: &[FileReport],
    written: usize,
) {
    output.success(&format!(
        "Generated {} files ({} written, {} unchanged)",
        result.files.len(),
        written,
        writer::count(reports, FileStatus::Unchanged),
    ));
    let warnings = result.warning_count();
    if warnings > 0 {
        output.warning(&format!("{warnings} warning(s)"));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: GenerateArgs,
    }

    fn parse(args: &[&str]) -> GenerateArgs {
        TestCli::try_parse_from(std::iter::once("docloom").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    fn project(config: &str) -> tempfile::TempDir {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("docs.yaml"), config).unwrap();
        temp
    }

    fn args_for(temp: &tempfile::TempDir, extra: &[&str]) -> GenerateArgs {
        let config = temp.path().join("docs.yaml");
        let out = temp.path().join("out");
        let mut args = vec![config.to_str().unwrap(), "-o", out.to_str().unwrap()];
        args.extend_from_slice(extra);
        parse(&args)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["docs.yaml"]);
        assert_eq!(args.output, PathBuf::from("docs"));
        assert!(!args.dry_run && !args.verbose && !args.no_index);
    }

    #[test]
    fn test_cli_settings_only_override_flags() {
        let args = parse(&["docs.yaml", "--no-index", "--no-mermaid"]);
        let settings = args.cli_settings();
        assert_eq!(settings.generate_index, Some(false));
        assert_eq!(settings.extraction_enabled, None);
        assert_eq!(settings.plantuml, None);
        assert_eq!(settings.mermaid, Some(false));
    }

    #[test]
    fn test_execute_writes_files() {
        let temp = project("modules:\n  root: {title: Root}\n  child: {title: Child, parent: root}\n");

        args_for(&temp, &[]).execute().unwrap();

        let out = temp.path().join("out");
        assert!(out.join("index.rst").is_file());
        assert!(out.join("generated/root.rst").is_file());
        assert!(out.join("generated/root/child.rst").is_file());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = project("modules:\n  root: {title: Root}\n");

        args_for(&temp, &["--dry-run"]).execute().unwrap();

        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_strict_fails_on_warning_without_writing() {
        let temp = project("modules:\n  root:\n    title: Root\n    markdown_includes: [missing.md]\n");

        let err = args_for(&temp, &["--strict"]).execute().unwrap_err();

        assert!(matches!(err, CliError::Strict { warnings: 1 }));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_warning_without_strict_succeeds() {
        let temp = project("modules:\n  root:\n    title: Root\n    markdown_includes: [missing.md]\n");
        args_for(&temp, &[]).execute().unwrap();
        assert!(temp.path().join("out/generated/root.rst").is_file());
    }

    #[test]
    fn test_fatal_error_writes_nothing() {
        let temp = project("modules:\n  a: {parent: b}\n  b: {parent: a}\n");

        let err = args_for(&temp, &[]).execute().unwrap_err();

        assert!(matches!(err, CliError::Generate(_)));
        assert!(!temp.path().join("out").exists());
    }
}
