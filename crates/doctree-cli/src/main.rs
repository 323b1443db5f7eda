//! Doctree CLI - builds documentation trees from record files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use doctree_core::pipeline::{self, Outcome};
use doctree_core::{Config, Registry, CONFIG_FILE};
use tracing_subscriber::EnvFilter;

mod files;

#[derive(Parser)]
#[command(name = "doctree")]
#[command(version = doctree_core::VERSION)]
#[command(about = "Resolve documentation records into a symbol tree", long_about = None)]
struct Cli {
    /// Config file (defaults to doctree.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, resolve and render documentation
    Build(BuildArgs),

    /// Parse and resolve only, reporting every diagnostic
    Check(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Files, directories or glob patterns to read records from
    #[arg(required = true)]
    paths: Vec<String>,

    /// Glob patterns to leave out
    #[arg(long)]
    exclude: Vec<String>,

    /// Extension aliases as alias:extension
    #[arg(long = "alias")]
    aliases: Vec<String>,

    /// Fail on the first resolution diagnostic
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Documentation title
    #[arg(long)]
    title: Option<String>,

    /// Renderer name
    #[arg(long)]
    renderer: Option<String>,

    /// One output partition per class
    #[arg(long, conflicts_with = "split_from_ns")]
    split_by_class: bool,

    /// Hoist classes out of their namespaces
    #[arg(long)]
    split_from_ns: bool,

    /// Prefix for output partition names
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix for output partition names
    #[arg(long)]
    suffix: Option<String>,

    /// Global object profile (javascript)
    #[arg(long)]
    global_objects: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    format_json: bool,

    /// Keep existing files in the output directory
    #[arg(long)]
    keep_out_dir: bool,

    /// Log the parser report
    #[arg(long)]
    report: bool,

    /// Print the parser report instead of building
    #[arg(long)]
    report_only: bool,
}

impl InputArgs {
    fn apply(&self, config: &mut Config) {
        config.exclude.extend(self.exclude.iter().cloned());
        config.aliases.extend(self.aliases.iter().cloned());
        config.strict |= self.strict;
    }
}

impl BuildArgs {
    fn apply(&self, config: &mut Config) {
        self.input.apply(config);

        if let Some(output) = &self.output {
            config.output.clone_from(output);
        }
        if let Some(title) = &self.title {
            config.title.clone_from(title);
        }
        if let Some(renderer) = &self.renderer {
            config.renderer.clone_from(renderer);
        }
        if self.prefix.is_some() {
            config.prefix.clone_from(&self.prefix);
        }
        if self.suffix.is_some() {
            config.suffix.clone_from(&self.suffix);
        }
        if self.global_objects.is_some() {
            config.global_objects.clone_from(&self.global_objects);
        }
        config.split_by_class |= self.split_by_class;
        config.split_from_ns |= self.split_from_ns;
        config.format_json |= self.format_json;
        config.keep_out_dir |= self.keep_out_dir;
        config.report |= self.report;
        config.report_only |= self.report_only;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Build(args) => {
            args.apply(&mut config);
            build(&args.input.paths, &config)?;
        }

        Commands::Check(args) => {
            args.apply(&mut config);
            config.report = true;
            check(&args.paths, &config)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let directive = if verbose { "doctree=debug" } else { "doctree=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Explicit config file, else `doctree.toml` if present, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None if Path::new(CONFIG_FILE).is_file() => Path::new(CONFIG_FILE),
        None => return Ok(Config::default()),
    };
    Config::from_path(path).with_context(|| format!("failed to load config '{}'", path.display()))
}

fn registry(config: &Config) -> Result<Registry> {
    let mut registry = Registry::with_builtins();
    registry.apply_config(config)?;
    Ok(registry)
}

fn build(paths: &[String], config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let files = files::discover(paths, &config.exclude, &registry)?;
    if files.is_empty() {
        anyhow::bail!("no input files found");
    }

    match pipeline::run(&files, config, &registry)? {
        Outcome::Tree(tree) => {
            pipeline::render(&tree, config, &registry)
                .with_context(|| format!("failed to render '{}'", config.renderer))?;
            println!(
                "Documented {} symbols from {} files into {}",
                tree.len(),
                files.len(),
                config.output.display()
            );
        }
        Outcome::Report(report) => {
            for entry in &report {
                println!("{}: {}", entry.location, entry.message);
            }
        }
    }

    Ok(())
}

fn check(paths: &[String], config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let files = files::discover(paths, &config.exclude, &registry)?;

    let outcome = pipeline::run(&files, config, &registry)?;
    let Some(tree) = outcome.tree() else {
        return Ok(());
    };

    for diagnostic in tree.diagnostics() {
        println!("{diagnostic}");
    }
    if !tree.diagnostics().is_empty() {
        anyhow::bail!(
            "{} problem(s) found in {} file(s)",
            tree.diagnostics().len(),
            files.len()
        );
    }

    println!("{} symbols, no problems found", tree.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_flags_override_config() {
        let cli = Cli::try_parse_from([
            "doctree",
            "build",
            "lib",
            "--output",
            "out/api",
            "--split-by-class",
            "--suffix",
            "_api",
            "--alias",
            "cjs:json",
        ])
        .unwrap();

        let Commands::Build(args) = &cli.command else {
            panic!("Expected Build command");
        };
        let mut config = Config::parse("title = \"Widgets\"\nsuffix = \".x\"").unwrap();
        args.apply(&mut config);

        assert_eq!(config.title, "Widgets");
        assert_eq!(config.output, PathBuf::from("out/api"));
        assert_eq!(config.suffix.as_deref(), Some("_api"));
        assert!(config.split_by_class);
        assert_eq!(config.aliases, vec!["cjs:json"]);
    }

    #[test]
    fn test_conflicting_split_flags_rejected() {
        let result =
            Cli::try_parse_from(["doctree", "build", "lib", "--split-by-class", "--split-from-ns"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_requires_paths() {
        assert!(Cli::try_parse_from(["doctree", "check"]).is_err());

        let cli = Cli::try_parse_from(["doctree", "-v", "check", "a.json", "--strict"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.paths, vec!["a.json"]);
                assert!(args.strict);
            }
            Commands::Build(_) => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_reports_problems() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("p.json");
        std::fs::write(&file, r#"[{"id": "P", "type": "class", "inherits": ["P"]}]"#).unwrap();

        let paths = vec![file.to_string_lossy().into_owned()];
        let err = check(&paths, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("1 problem(s)"));
    }

    #[test]
    fn test_build_writes_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("ajax.json");
        std::fs::write(&file, r#"[{"id": "Ajax", "type": "class"}]"#).unwrap();

        let config = Config {
            output: dir.path().join("doc"),
            ..Config::default()
        };
        build(&[file.to_string_lossy().into_owned()], &config).unwrap();
        assert!(dir.path().join("doc/doc.json").exists());
    }
}
