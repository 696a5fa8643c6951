//! hlsl-weaver - shader DSL to HLSL translator
//!
//! Command-line entry point: loads the definition registry, translates one
//! shader source and writes the HLSL to a file or stdout.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hw_core::{Config, LogLevel};
use hw_registry::Registry;
use hw_translate::Translator;

#[derive(Parser, Debug)]
#[command(
    name = "hlsl-weaver",
    version,
    about = "Translate semantic-driven shader sources into HLSL"
)]
struct Args {
    /// Shader source to translate
    shader: PathBuf,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Semantics definition file
    #[arg(long, value_name = "FILE")]
    semantics: Option<PathBuf>,

    /// Atoms definition file
    #[arg(long, value_name = "FILE")]
    atoms: Option<PathBuf>,

    /// Combinators definition file
    #[arg(long, value_name = "FILE")]
    combinators: Option<PathBuf>,

    /// Bind a polymorphic to an atom, e.g. `--bind GetAlbedo=AlbedoFromMap`
    #[arg(long = "bind", value_name = "NAME=ATOM", value_parser = parse_binding)]
    bindings: Vec<(String, String)>,

    /// Write HLSL to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Scratch arena size per translation, in bytes
    #[arg(long, value_name = "BYTES")]
    arena_capacity: Option<usize>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<LogLevel>,
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    let (name, atom) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ATOM, got `{s}`"))?;
    let (name, atom) = (name.trim(), atom.trim());
    if name.is_empty() || atom.is_empty() {
        return Err(format!("expected NAME=ATOM, got `{s}`"));
    }
    Ok((name.to_string(), atom.to_string()))
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(path) = &args.semantics {
        config.paths.semantics = path.clone();
    }
    if let Some(path) = &args.atoms {
        config.paths.atoms = path.clone();
    }
    if let Some(path) = &args.combinators {
        config.paths.combinators = path.clone();
    }
    if let Some(path) = &args.output {
        config.paths.output = Some(path.clone());
    }
    if let Some(capacity) = args.arena_capacity {
        config.translator.arena_capacity = capacity;
    }
    if let Some(level) = args.log_level {
        config.debug.log_level = level;
    }
    config.bindings.extend(args.bindings.iter().cloned());
    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => Config::load().context("load default config")?,
    };
    let config = apply_args(config, &args);

    hw_core::logging::init(config.debug.log_level);
    run(&args, &config)
}

fn run(args: &Args, config: &Config) -> Result<()> {
    let registry = Registry::from_files(&config.paths).with_context(|| {
        format!(
            "load definitions ({}, {}, {})",
            config.paths.semantics.display(),
            config.paths.atoms.display(),
            config.paths.combinators.display()
        )
    })?;
    let stats = registry.stats();
    tracing::info!(
        "Loaded {} semantics, {} atoms, {} combinators",
        stats.semantic_count,
        stats.atom_count,
        stats.combinator_count
    );

    let source = fs::read_to_string(&args.shader)
        .with_context(|| format!("read shader {}", args.shader.display()))?;

    let hlsl = Translator::new(&config.translator)
        .translate(&source, &config.bindings, &registry)
        .with_context(|| format!("translate {}", args.shader.display()))?;

    match &config.paths.output {
        Some(path) => {
            fs::write(path, &hlsl).with_context(|| format!("write {}", path.display()))?;
            tracing::info!("Wrote {} bytes to {}", hlsl.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(hlsl.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binding() {
        assert_eq!(
            parse_binding("GetAlbedo=AlbedoFromMap"),
            Ok(("GetAlbedo".to_string(), "AlbedoFromMap".to_string()))
        );
        assert_eq!(
            parse_binding(" GetAlbedo = ConstantAlbedo "),
            Ok(("GetAlbedo".to_string(), "ConstantAlbedo".to_string()))
        );
        assert!(parse_binding("GetAlbedo").is_err());
        assert!(parse_binding("=AlbedoFromMap").is_err());
        assert!(parse_binding("GetAlbedo=").is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = Config::default();
        config
            .bindings
            .insert("GetAlbedo".to_string(), "ConstantAlbedo".to_string());
        config
            .bindings
            .insert("GetNormal".to_string(), "VertexNormal".to_string());

        let args = Args::parse_from([
            "hlsl-weaver",
            "shader.hlsl",
            "--atoms",
            "my_atoms.txt",
            "--bind",
            "GetAlbedo=AlbedoFromMap",
            "--arena-capacity",
            "4096",
            "--log-level",
            "debug",
        ]);
        let config = apply_args(config, &args);

        assert_eq!(config.paths.atoms, PathBuf::from("my_atoms.txt"));
        assert_eq!(config.paths.semantics, PathBuf::from("semantics.txt"));
        assert_eq!(config.translator.arena_capacity, 4096);
        assert_eq!(config.debug.log_level, LogLevel::Debug);
        assert_eq!(config.bindings["GetAlbedo"], "AlbedoFromMap");
        assert_eq!(config.bindings["GetNormal"], "VertexNormal");
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let result = Args::try_parse_from(["hlsl-weaver", "shader.hlsl", "--log-level", "loud"]);
        assert!(result.is_err());
    }
}
