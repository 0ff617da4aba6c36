use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use gecmark::api::{self, GEC_ROUTE};
use gecmark::cli::output::{self, FileReport, OutputFormat};
use gecmark::segmenter::{self, clean_text, UnicodeSentenceSplitter};
use gecmark::{dict, Config, Corrector, GecError, GecResponse};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn, Level};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "gecmark")]
#[command(version, about = "Grammar, spelling, profanity and gibberish markup for text", long_about = None)]
struct Cli {
    /// Files or directories to check; `-` reads stdin
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Configuration file (defaults to ./.gecmark.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of engine workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Pending requests each worker may hold
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Base URL of a remote correction/classification engine
    #[arg(long, env = "GECMARK_ENGINE_URL")]
    engine_url: Option<String>,

    /// Skip gibberish detection
    #[arg(long)]
    no_gibberish: bool,

    /// Skip spelling and profanity checks
    #[arg(long)]
    no_spelling: bool,

    /// Keep overlapping spelling/profanity spans
    #[arg(long)]
    ignore_collisions: bool,

    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long)]
    language: Option<String>,

    /// Personal dictionary file
    #[arg(long)]
    personal_dict: Option<PathBuf>,

    /// Profanity word list (repeatable)
    #[arg(long, value_name = "FILE")]
    profanity_list: Vec<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Exit with code 0 even if issues are found
    #[arg(long)]
    no_fail: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
    /// Print the sentence and line-break units of a file with their offsets
    Segment {
        /// File to segment; `-` reads stdin
        file: PathBuf,
    },
    /// Run one HTTP-style request body through the API handler
    Request {
        /// File holding the request body; stdin when omitted
        file: Option<PathBuf>,
        #[arg(long, default_value = "POST")]
        method: String,
        #[arg(long, default_value = GEC_ROUTE)]
        path: String,
        #[arg(long, default_value = "application/json")]
        content_type: String,
    },
}

#[derive(Parser, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Build a dictionary from a local word list
    Build {
        /// Language code the dictionary is installed under
        language: String,
        /// Word list, one word per line
        source: PathBuf,
    },
    /// Show dictionary info
    Info {
        /// Language code
        language: String,
    },
}

struct Input {
    name: String,
    text: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "gecmark", &mut io::stdout());
        return Ok(());
    }

    if let Some(command) = cli.command.as_ref() {
        return handle_command(command, &cli);
    }

    if cli.files.is_empty() {
        bail!("No files specified. Use --help for usage information.");
    }

    let config = build_config(&cli)?;
    let inputs = collect_inputs(&cli.files)?;
    let corrector = Corrector::new(config).context("Failed to start the markup pipeline")?;
    debug!(
        "Checking {} input(s) on {} worker(s)",
        inputs.len(),
        corrector.dispatcher().workers()
    );

    let reports = inputs
        .par_iter()
        .map(|input| check_input(&corrector, input))
        .collect::<Result<Vec<_>>>()?;

    let total_issues: usize = reports.iter().map(|r| r.response.text_markups.len()).sum();
    let colored_output = !cli.no_color;

    match cli.format {
        OutputFormat::Json => println!("{}", output::render_json(&reports)?),
        OutputFormat::Text => {
            for (report, input) in reports.iter().zip(&inputs) {
                print!(
                    "{}",
                    output::render_text(&report.file, &clean_text(&input.text), &report.response, colored_output)
                );
            }
            output::print_summary(total_issues, reports.len(), colored_output);
        }
    }

    if total_issues > 0 && !cli.no_fail {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Config file first, then command-line overrides.
fn build_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(workers) = cli.workers {
        config.pool.workers = workers;
    }
    if let Some(capacity) = cli.queue_capacity {
        config.pool.queue_capacity = capacity;
    }
    if let Some(url) = &cli.engine_url {
        config.engine.url = Some(url.clone());
    }
    if cli.no_gibberish {
        config.gibberish.enabled = false;
    }
    if cli.no_spelling {
        config.spelling.enabled = false;
    }
    if cli.ignore_collisions {
        config.spelling.ignore_collisions = true;
    }
    if let Some(language) = &cli.language {
        config.spelling.language = language.clone();
    }
    if let Some(path) = &cli.personal_dict {
        config.spelling.personal_dictionary = Some(path.clone());
    }
    if !cli.profanity_list.is_empty() {
        config.spelling.profanity_lists = cli.profanity_list.clone();
    }

    config.validate()?;
    Ok(config)
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path == Path::new("-") {
            inputs.push(Input {
                name: "-".to_string(),
                text: read_source(path)?,
            });
            continue;
        }
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            continue;
        }
        if path.is_file() {
            inputs.push(Input {
                name: path.display().to_string(),
                text: read_source(path)?,
            });
            continue;
        }

        let entries = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
        for entry in entries {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            match fs::read_to_string(entry.path()) {
                Ok(text) => inputs.push(Input {
                    name: entry.path().display().to_string(),
                    text,
                }),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }
    }

    Ok(inputs)
}

fn check_input(corrector: &Corrector, input: &Input) -> Result<FileReport> {
    let response = match corrector.markup(&input.text) {
        Ok(response) => response,
        Err(GecError::EmptyText) => {
            debug!("{} is empty", input.name);
            let text = clean_text(&input.text);
            GecResponse {
                character_count: text.chars().count(),
                corrected_text: text,
                text_markups: Vec::new(),
                error_character_count: 0,
                contains_profanity: false,
                service_time: 0.0,
            }
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to check {}", input.name)),
    };

    Ok(FileReport {
        file: input.name.clone(),
        response,
    })
}

fn handle_command(command: &Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Dict { action } => match action {
            DictCommands::List => dict::manager::list_dictionaries()?,
            DictCommands::Download { language } => dict::manager::download_dictionary(language)?,
            DictCommands::Build { language, source } => {
                dict::manager::build_dictionary(language, source)?
            }
            DictCommands::Info { language } => dict::manager::show_info(language)?,
        },
        Commands::Segment { file } => {
            let text = clean_text(&read_source(file)?);
            let units = segmenter::segment(&text, &UnicodeSentenceSplitter);
            let located = segmenter::locate_units(&text, &units);
            print!("{}", output::render_units(&located, !cli.no_color));
        }
        Commands::Request {
            file,
            method,
            path,
            content_type,
        } => {
            let body = match file {
                Some(file) => read_source(file)?,
                None => read_source(Path::new("-"))?,
            };
            let corrector = Corrector::new(build_config(cli)?)?;
            let response = api::handle(method, path, Some(content_type), body.as_bytes(), &corrector);

            eprintln!("HTTP {}", response.status);
            println!("{}", response.body);
            if !response.status.is_success() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
