use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use newsdesk_core::{
    CannedClient, FetchConfig, GeminiClient, GenerationRequest, HttpFetcher, InputSource, Language, LlmClient,
    NewsdeskError, Pipeline, Settings, posts_for_url, recent_posts, render_article, write_outputs,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

use echo::{
    format_size, print_banner, print_error, print_field, print_hint, print_info, print_step, print_success,
    print_warning,
};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draft news articles and Bluesky posts from a text file or a web page
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a greeting
    Hello,
    /// Generate a news article and a Bluesky post
    Generate(GenerateArgs),
    /// List previously written Bluesky posts
    History(HistoryArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Source text file (default: NEWS_INPUT_FILE)
    #[arg(short, long, value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Web page to fetch the source text from
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Additional instructions for the model (at most 1000 characters)
    #[arg(short, long, value_name = "TEXT")]
    prompt_extra: Option<String>,

    /// Ask for additional instructions on stdin
    #[arg(long)]
    interactive_prompt: bool,

    /// Directory for the generated files (default: NEWS_OUTPUT_DIR)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Article language: es or en (default: NEWS_LANGUAGE or es)
    #[arg(long, value_name = "LANG")]
    language: Option<Language>,

    /// Model name (default: NEWS_MODEL)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// HTTP timeout in seconds for the page fetch and the model call
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Treat this date as today when naming files (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Use the reply stored in this file instead of calling the model
    #[arg(long, value_name = "FILE", hide = true)]
    reply_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Directory with _blsky.txt files (default: BLUESKY_POSTS_DIR, then NEWS_OUTPUT_DIR)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Number of posts to show
    #[arg(short, long, default_value = "5", value_name = "NUM")]
    count: usize,

    /// Only show posts written for this URL
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,newsdesk=debug,newsdesk_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();
    init_tracing(cli.verbose);

    if let Err(e) = dotenv
        && !e.not_found()
    {
        print_warning(&format!("Ignoring .env file: {}", e));
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&format!("{:#}", err));
            if let Some(hint) = err.downcast_ref::<NewsdeskError>().and_then(NewsdeskError::suggestion) {
                print_hint(hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Hello => {
            println!("Welcome to newsdesk!");
            println!("It drafts news articles and Bluesky posts from a text file or a web page.");
            println!("Try 'newsdesk generate --help' to get started.");
            Ok(())
        }
        Command::Generate(args) => generate(args, cli.verbose),
        Command::History(args) => history(&args),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "newsdesk", &mut io::stdout());
            Ok(())
        }
    }
}

fn ask_instructions() -> anyhow::Result<Option<String>> {
    eprint!("{} ", "Additional instructions (empty for none):".bright_cyan());
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read instructions from stdin")?;

    let trimmed = line.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn generate(args: GenerateArgs, verbose: bool) -> anyhow::Result<()> {
    let mut settings = Settings::from_env_with_language(args.language)?;
    if let Some(model) = args.model {
        settings.model = model;
    }
    let output_dir = args.output_dir.or_else(|| settings.output_dir.clone());
    tracing::debug!(?settings, "settings loaded");

    if verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    // Reject a bad input selection before asking anything on stdin.
    InputSource::select(args.input_file.as_deref(), args.url.as_deref(), settings.input_file.as_deref())?;

    let mut instructions = args.prompt_extra;
    if args.interactive_prompt
        && let Some(answer) = ask_instructions()?
    {
        instructions = Some(answer);
    }

    let llm: Box<dyn LlmClient> = match &args.reply_file {
        Some(path) => Box::new(CannedClient::from_file(path).context("Failed to load the stored reply")?),
        None => Box::new(GeminiClient::new(&settings, args.timeout)?),
    };
    let fetcher = HttpFetcher::new(FetchConfig { timeout: args.timeout, ..Default::default() })?;

    let today = args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut request = GenerationRequest::new(today);
    request.input_file = args.input_file;
    request.url = args.url;
    request.instructions = instructions;

    let total = if output_dir.is_some() { 2 } else { 1 };
    print_step(1, total, &format!("Generating article with {}", llm.name()));

    let pipeline = Pipeline::new(llm.as_ref(), &fetcher, &settings);
    let generation = pipeline.run(&request)?;
    let article = &generation.article;

    print_field("Source", &generation.source.to_string());
    print_field("Text", &format_size(generation.source_text.len()));
    print_field("Title", &article.title);
    print_field("Links", &article.links.len().to_string());
    if generation.thesis.is_some() {
        print_info("Thesis announcement detected, title rewritten");
    }
    if article.bluesky_post.is_empty() {
        print_warning("The reply has no Bluesky post");
    }

    let language = pipeline.language();
    print!("{}", render_article(article, language));
    if !article.bluesky_post.is_empty() {
        println!("\n{}: {}", language.labels().bluesky, article.bluesky_post);
    }

    match output_dir {
        Some(dir) => {
            print_step(2, total, &format!("Writing files to {}", dir.display()));
            let files = write_outputs(&dir, article, &generation.naming, language)
                .with_context(|| format!("Failed to write files to {}", dir.display()))?;

            print_success(&format!("News saved to {}", files.news.display()));
            if let Some(post) = files.bluesky {
                print_success(&format!("Bluesky post saved to {}", post.display()));
            }
        }
        None => print_info("No output directory configured, nothing written"),
    }

    Ok(())
}

fn history(args: &HistoryArgs) -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    let dir = args
        .dir
        .clone()
        .or_else(|| settings.history_dir().cloned())
        .ok_or_else(|| {
            NewsdeskError::Config("no posts directory: pass --dir or set BLUESKY_POSTS_DIR".to_string())
        })?;

    let posts = match &args.url {
        Some(url) => {
            let mut posts = posts_for_url(&dir, url)?;
            posts.truncate(args.count);
            posts
        }
        None => recent_posts(&dir, args.count)?,
    };

    if posts.is_empty() {
        print_info(&format!("No posts found in {}", dir.display()));
        return Ok(());
    }

    for post in &posts {
        let name = post.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        println!("{}", name.bold());
        println!("{}\n", post.read()?);
    }

    Ok(())
}
