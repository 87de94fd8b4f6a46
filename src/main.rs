mod cli;

use flvsync::{
    clock::SystemClock,
    config, inspect,
    rewriter::{RewriteOptions, Rewriter},
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RewriteArgs};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // stdout may carry the rewritten stream, so logs always go to stderr.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "flvsync=trace,flvsync_media=trace".to_string()
        } else {
            "flvsync=info,flvsync_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        None => rewrite(&cli.rewrite, cli.config.as_deref()),
        Some(Commands::Rewrite(args)) => rewrite(&args, cli.config.as_deref()),
        Some(Commands::Inspect { file, json }) => inspect_file(&file, json),
        Some(Commands::Validate {
            config: config_path,
        }) => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Some(Commands::Version) => {
            println!("flvsync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn rewrite_options(args: &RewriteArgs, config_path: Option<&Path>) -> Result<RewriteOptions> {
    let mut config = config::load_config_or_default(config_path)?;

    // Command-line flags override the config file
    if let Some(threshold) = args.drift_threshold_ms {
        config.sync.drift_threshold_ms = threshold;
    }
    if let Some(interval) = args.budget_interval_ms {
        config.sync.budget_interval_ms = interval;
    }
    if let Some(ref name) = args.stream_name {
        config.metadata.stream_name = Some(name.clone());
    }
    config::validate_config(&config)?;

    let mut options = RewriteOptions::from(&config);
    options.write_timestamps = args.write_timestamps;
    Ok(options)
}

fn rewrite(args: &RewriteArgs, config_path: Option<&Path>) -> Result<()> {
    let options = rewrite_options(args, config_path)?;
    tracing::debug!("Rewrite options: {:?}", options);

    let input: Box<dyn Read> = match args.input {
        Some(ref path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input: {:?}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match args.output {
        Some(ref path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output: {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut rewriter = Rewriter::new(options, SystemClock);
    let stats = rewriter.run(input, output).context("Rewrite failed")?;

    if stats.truncated {
        tracing::info!("Input ended mid-tag after {} bytes", stats.bytes_read);
    }

    Ok(())
}

fn inspect_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let reader = BufReader::new(File::open(file)?);
    let inspection = inspect::inspect(reader)
        .with_context(|| format!("Failed to inspect {:?}", file))?;

    if json {
        let json_str = serde_json::to_string_pretty(&inspection)?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("File: {}", file.display());
    if let Some(ref header) = inspection.header {
        println!(
            "Header: version {}, flags 0x{:02x}, data offset {}",
            header.version, header.flags, header.data_offset
        );
    }
    if inspection.annotated {
        println!("Timing trailers: yes");
    }

    println!("\nTags: {}", inspection.tags.len());
    for (i, tag) in inspection.tags.iter().enumerate() {
        print!(
            "  [{}] @{} {} {}ms {} bytes",
            i, tag.offset, tag.tag_type, tag.timestamp, tag.data_size
        );
        if let Some(ref trailer) = tag.trailer {
            print!(" (wall +{}ms)", trailer.elapsed_ms);
        }
        println!();

        if let Some(ref event) = tag.event {
            match tag.value {
                Some(ref value) => println!("      {} {}", event, value),
                None => println!("      {}", event),
            }
        }
        if let Some(ref err) = tag.decode_error {
            println!("      undecodable: {}", err);
        }
    }

    if inspection.truncated {
        println!("\nStream ends mid-tag");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            println!("Default config:");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Drift threshold: {}ms", config.sync.drift_threshold_ms);
    println!("  Budget interval: {}ms", config.sync.budget_interval_ms);
    match config.metadata.stream_name {
        Some(ref name) => println!("  Stream name: {}", name),
        None => println!("  Stream name: (from source)"),
    }
}
