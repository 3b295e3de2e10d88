use shredder_core::config::ShredderConfig;
use shredder_core::format::FormatTag;
use shredder_core::size::format_size;
use shredder_core::transport::{DirectorySink, Sink, corrupt_file, generate_file};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "shredder.toml";

#[derive(Parser, Debug)]
#[clap(author, version, about = "Corrupt files or generate random ones", long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    /// Seed for a reproducible run.
    #[clap(long)]
    seed: Option<u64>,
    /// Directory results are written to.
    #[clap(short, long)]
    output_dir: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overwrite 5% of a file's bytes with random values.
    Corrupt {
        file: PathBuf,
        /// Allow replacing the source file when writing next to it.
        #[clap(long)]
        force: bool,
    },
    /// Write a file of random bytes.
    Generate {
        #[clap(short, long, allow_negative_numbers = true)]
        size_mb: f64,
        #[clap(short, long)]
        format: Option<FormatTag>,
        /// Base file name; the format's extension is appended.
        #[clap(short, long)]
        name: Option<String>,
    },
    /// List the supported formats and their media types.
    Formats,
}

fn load_config(config_file: Option<&PathBuf>) -> Result<ShredderConfig, anyhow::Error> {
    match config_file {
        Some(config_path) => {
            tracing::info!(path = ?config_path, "loading configuration");
            Ok(ShredderConfig::load_from_file(config_path)?)
        }
        None => {
            let default_config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_config_path.exists() {
                tracing::info!(path = ?default_config_path, "loading default configuration");
                Ok(ShredderConfig::load_from_file(&default_config_path)?)
            } else {
                tracing::debug!("no config file found, using built-in defaults");
                Ok(ShredderConfig::default())
            }
        }
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            tracing::info!(seed, "using fixed seed");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    }
}

fn run(cli: Cli) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut config = load_config(cli.config_file.as_ref())?;
    if let Some(seed) = cli.seed {
        config.rng.seed = Some(seed);
    }
    if let Some(output_dir) = cli.output_dir {
        config.output.directory = output_dir;
    }
    tracing::debug!(?config, "effective configuration");

    let policy = config.transport_policy();
    let mut rng = make_rng(config.rng.seed);
    let start_time = Instant::now();

    let written = match cli.command {
        Command::Corrupt { file, force } => {
            let delivery = corrupt_file(&file, &policy, &mut rng)
                .with_context(|| format!("Failed to corrupt {}", file.display()))?;
            println!(
                "Corrupting {} ({})",
                delivery.file_name,
                format_size(delivery.buffer.len() as u64)
            );

            let mut sink = DirectorySink::new(&config.output.directory);
            if !force {
                sink = sink.protect(&file);
            }
            vec![sink.deliver(&delivery)?]
        }
        Command::Generate {
            size_mb,
            format,
            name,
        } => {
            let format = format.unwrap_or(config.generator.default_format);
            let delivery = generate_file(size_mb, format, name.as_deref(), &policy, &mut rng)
                .context("Failed to generate file")?;
            println!(
                "Generating {} ({}, {})",
                delivery.file_name,
                format_size(delivery.buffer.len() as u64),
                delivery.media_type
            );

            let mut sink = DirectorySink::new(&config.output.directory);
            vec![sink.deliver(&delivery)?]
        }
        Command::Formats => {
            for format in FormatTag::ALL {
                println!("{:<4} {}", format, format.media_type());
            }
            Vec::new()
        }
    };

    for path in &written {
        println!("Saved {}", path.display());
    }
    tracing::debug!(elapsed = ?start_time.elapsed(), "done");
    Ok(written)
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shredder").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn parses_generate_arguments() {
        let cli = parse(&["--seed", "3", "generate", "--size-mb", "1.5", "-f", "PNG"]);
        assert_eq!(cli.seed, Some(3));
        match cli.command {
            Command::Generate {
                size_mb,
                format,
                name,
            } => {
                assert_eq!(size_mb, 1.5);
                assert_eq!(format, Some(FormatTag::Png));
                assert_eq!(name, None);
            }
            other => panic!("Expected generate command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Cli::try_parse_from(["shredder", "generate", "--size-mb", "1", "-f", "exe"]);
        assert!(result.is_err());
    }

    #[test]
    fn generate_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let cli = parse(&[
            "--seed", "1", "-o", out, "generate", "--size-mb", "0.01", "--name", " ",
        ]);

        let written = run(cli).unwrap();

        assert_eq!(written, vec![dir.path().join("generated_file.doc")]);
        assert_eq!(fs::metadata(&written[0]).unwrap().len(), 10_485);
    }

    #[test]
    fn generate_rejects_non_positive_size() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let cli = parse(&["-o", out, "generate", "--size-mb", "-2"]);
        assert!(run(cli).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_is_reproducible_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("input.txt");
        fs::write(&source, vec![b'a'; 4000]).unwrap();
        let source_arg = source.to_str().unwrap();

        let mut outputs = Vec::new();
        for run_dir in ["first", "second"] {
            let out = dir.path().join(run_dir);
            let cli = parse(&[
                "--seed",
                "99",
                "-o",
                out.to_str().unwrap(),
                "corrupt",
                source_arg,
            ]);
            let written = run(cli).unwrap();
            assert_eq!(written, vec![out.join("input.txt")]);
            outputs.push(fs::read(&written[0]).unwrap());
        }

        assert_eq!(outputs[0].len(), 4000);
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn corrupt_next_to_source_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("keep.bin");
        fs::write(&source, vec![0u8; 100]).unwrap();
        let out = dir.path().to_str().unwrap();
        let source_arg = source.to_str().unwrap();

        let refused = run(parse(&["-o", out, "corrupt", source_arg]));
        assert!(refused.is_err());
        assert_eq!(fs::read(&source).unwrap(), vec![0u8; 100]);

        let forced = run(parse(&["-o", out, "corrupt", "--force", source_arg])).unwrap();
        assert_eq!(forced, vec![source.clone()]);
        assert_eq!(fs::read(&source).unwrap().len(), 100);
    }
}
