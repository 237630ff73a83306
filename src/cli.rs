//! CLI: model documents → compiled schema model (JSON view) and diagnostics.
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::compile::{CompileOutcome, Compiler};
use crate::config::CompilerConfig;
use crate::graph::model::{ModelDocument, ModelGraph};
use crate::validation::ValidationResult;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile annotated class models into schema type definitions
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile and print the JSON view of the type definitions
    Compile(CompileOut),
    /// compile and print diagnostics only
    Validate(ValidateOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more model documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// compiler configuration (.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// qualified name of a root type (repeatable); every API type when omitted
    #[arg(long)]
    root: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ValidateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// treat warnings as errors
    #[arg(long)]
    deny_warnings: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_config(&self) -> anyhow::Result<CompilerConfig> {
        match &self.config {
            Some(path) => CompilerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None => Ok(CompilerConfig::default()),
        }
    }

    fn load_graph(&self) -> anyhow::Result<ModelGraph> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let display_path = source_path.display();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read model document {display_path}"))?;
            let document = crate::path_de::from_str_with_path::<ModelDocument>(&source)
                .with_context(|| format!("failed to parse model document {display_path}"))?;
            tracing::debug!(
                path = %display_path,
                declarations = document.declarations.len(),
                "model document loaded"
            );
            documents.push(document);
        }
        ModelGraph::load(documents).context("failed to build the type graph")
    }

    fn compile(&self) -> anyhow::Result<(ModelGraph, CompileOutcome)> {
        let config = self.load_config()?;
        let graph = self.load_graph()?;
        let outcome = {
            let compiler = Compiler::new(&graph, config);
            let roots = match self.root.as_slice() {
                [] => compiler.default_roots(),
                names => compiler.roots_named(names)?,
            };
            compiler.run(&roots)
        };
        Ok((graph, outcome))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        init_logging(self.verbose);
        match &self.cmd {
            Command::Compile(target) => {
                let (graph, outcome) = target.input_settings.compile()?;
                report(&outcome.validation);
                let view = crate::emit::emit_model(&graph, &outcome);
                let view_src = serde_json::to_string_pretty(&view)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &view_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{view_src}");
                }
                outcome.check()?;
            }
            Command::Validate(target) => {
                let (_, outcome) = target.input_settings.compile()?;
                report(&outcome.validation);
                outcome.check()?;
                if target.deny_warnings && outcome.validation.has_warnings() {
                    bail!("{} warnings (denied)", outcome.validation.warnings().len());
                }
                eprintln!(
                    "{} {} type definitions",
                    "ok:".green().bold(),
                    outcome.registry.len(),
                );
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // a second install (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(validation: &ValidationResult) {
    for message in validation.errors() {
        eprintln!("{} {message}", "error:".red().bold());
    }
    for message in validation.warnings() {
        eprintln!("{} {message}", "warning:".yellow().bold());
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            let entries =
                glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))?;
            for entry in entries {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_subcommand_parses() {
        let cli = CommandLineInterface::try_parse_from([
            "schema-osi", "-vv", "compile", "-i", "a.json", "b/*.json",
            "--root", "com.acme.Order", "-o", "out.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Compile(target) = cli.cmd else { panic!("expected compile") };
        assert_eq!(target.input_settings.input, ["a.json", "b/*.json"]);
        assert_eq!(target.input_settings.root, ["com.acme.Order"]);
        assert_eq!(target.out, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn input_is_required() {
        assert!(CommandLineInterface::try_parse_from(["schema-osi", "validate"]).is_err());
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["model.json"]).unwrap();
        assert_eq!(paths, [PathBuf::from("model.json")]);
        let err = resolve_file_path_patterns(["/nonexistent-schema-osi-dir/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }
}
