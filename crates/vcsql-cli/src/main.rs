//! vcsql - translate vertex-centric graph algorithms into iterative SQL
//!
//! Reads an option dictionary (YAML or JSON), runs one translation and
//! prints the block descriptors as JSON or the rendered PL/pgSQL program.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use vcsql_core::{Translation, Translator};

mod config;
mod logging;
mod options_file;

use config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "vcsql", author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate an option file and write the result
    Translate {
        /// Option dictionary (YAML or JSON)
        options: PathBuf,

        /// Output format, overriding the configuration
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Translate an option file and print a summary
    Check {
        /// Option dictionary (YAML or JSON)
        options: PathBuf,
    },
}

fn translate_file(path: &Path) -> Result<Translation> {
    let options = options_file::load(path)?;
    let translation = Translator::from_map(&options)
        .and_then(Translator::translate)
        .with_context(|| format!("Failed to translate {}", path.display()))?;
    Ok(translation)
}

fn format_translation(translation: &Translation, format: OutputFormat, pretty: bool) -> Result<String> {
    let text = match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(translation)?,
        OutputFormat::Json => serde_json::to_string(translation)?,
        OutputFormat::Sql => translation.render()?,
    };
    Ok(text)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_logging_env();
    logging::init();

    match cli.command {
        Command::Translate { options, format, output } => {
            let translation = translate_file(&options)?;
            let format = format.unwrap_or(config.output.format);
            let text = format_translation(&translation, format, config.output.pretty)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), format = ?format, "output written");
                }
                None => println!("{}", text),
            }
        }
        Command::Check { options } => {
            let translation = translate_file(&options)?;
            let senders: Vec<&str> = translation.senders().iter().map(String::as_str).collect();

            println!("blocks:      {}", translation.blocks().len());
            println!("descriptors: {}", translation.descriptor_count());
            println!("senders:     {}", senders.join(", "));
            println!("fingerprint: {}", translation.fingerprint());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_translate() {
        let cli = Cli::try_parse_from(["vcsql", "translate", "sssp.yaml", "--format", "sql", "-o", "out.sql"]).unwrap();
        match cli.command {
            Command::Translate { options, format, output } => {
                assert_eq!(options, PathBuf::from("sssp.yaml"));
                assert_eq!(format, Some(OutputFormat::Sql));
                assert_eq!(output, Some(PathBuf::from("out.sql")));
            }
            other => panic!("expected translate, got {:?}", other),
        }
    }

    #[test]
    fn test_format_translation() {
        let options = options_file::parse(
            "End: NO_MESSAGE\nInitiateVal: INT_MAX\nInitialMessage: Init(1, 0)\nMessageValType: int\n\
             CombineMessage: MIN(message)\nUpdateAndSend: \"setVal(getAggregationVal())\\nsend(out, getVal())\"\n",
        )
        .unwrap();
        let translation = Translator::from_map(&options).unwrap().translate().unwrap();

        let json = format_translation(&translation, OutputFormat::Json, false).unwrap();
        let parsed: Translation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, translation);

        let sql = format_translation(&translation, OutputFormat::Sql, true).unwrap();
        assert!(sql.starts_with("DO $$"));
    }

    #[test]
    fn test_demo_option_files_translate() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        for name in ["sssp.yaml", "pagerank.yaml", "broadcast.json"] {
            let translation = translate_file(&demos.join(name)).unwrap();
            assert!(translation.render().is_ok(), "{} should render", name);
        }
    }
}
