use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tgmark")]
#[command(about = "Convert Markdown to chat-safe HTML chunks")]
struct Cli {
    /// Input Markdown file (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Config file
    #[arg(short, long, default_value = "tgmark.toml")]
    config: PathBuf,

    /// Maximum chunk length in UTF-16 code units (overrides the config file)
    #[arg(short, long)]
    max_length: Option<usize>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Chunks)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Each chunk followed by a separator line
    Chunks,
    /// The rendered markup, unsplit
    Html,
    /// The chunks as a JSON array
    Json,
    /// The parsed document tree as JSON
    Tree,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match tgmark::Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(max_length) = cli.max_length {
        config.transport.max_message_length = max_length;
    }

    init_logging(&config.logging.level);

    let markdown = match read_input(cli.input.as_deref()) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&markdown, &config, cli.format) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(markdown: &str, config: &tgmark::Config, format: OutputFormat) -> Result<(), String> {
    match format {
        OutputFormat::Html => {
            println!("{}", tgmark::markdown_to_html_with_config(markdown, config));
        }
        OutputFormat::Tree => {
            let document = tgmark::parse_with_config(markdown, config);
            let json = serde_json::to_string_pretty(&document).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        OutputFormat::Json => {
            let chunks = tgmark::markdown_to_chunks_with_config(markdown, config)
                .map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(&chunks).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        OutputFormat::Chunks => {
            let chunks = tgmark::markdown_to_chunks_with_config(markdown, config)
                .map_err(|e| e.to_string())?;
            let total = chunks.len();
            for (i, chunk) in chunks.iter().enumerate() {
                println!("{}", chunk);
                println!(
                    "--- chunk {}/{} ({} units) ---",
                    i + 1,
                    total,
                    tgmark::text_len(chunk)
                );
            }
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
