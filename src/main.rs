use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use promptguard::analysis::{AnalysisResponse, Analyzer};
use promptguard::cli::{Args, OutputFormat, validate_prompt};
use promptguard::output::print_results;
use std::process;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let input = match args.prompt.clone() {
        Some(p) => p,
        None => match read_stdin().await {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: failed to read prompt from stdin: {}", e);
                process::exit(1);
            }
        },
    };

    let Some(prompt) = validate_prompt(&input) else {
        eprintln!("Error: prompt is empty");
        process::exit(1);
    };

    if args.insecure {
        eprintln!(
            "WARNING: --insecure mode enabled. TLS certificate validation disabled. Traffic may be interceptable."
        );
    }

    let analyzer = match Analyzer::new(args.analyzer_config()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: Failed to initialize analyzer: {}", e);
            process::exit(1);
        }
    };

    let format = args.get_output_format();
    let show_progress = !args.quiet && format == OutputFormat::Normal;

    let start = Instant::now();
    let result = run_with_spinner(&analyzer, prompt, show_progress).await;
    let elapsed = start.elapsed();

    match result {
        Ok(response) => print_results(&response, Some(elapsed), format),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run_with_spinner(
    analyzer: &Analyzer,
    prompt: &str,
    show_progress: bool,
) -> promptguard::Result<AnalysisResponse> {
    if !show_progress {
        return analyzer.analyze(prompt).await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let mode = if analyzer.config().use_mock {
        "locally"
    } else {
        "via MCP"
    };
    spinner.set_message(format!("Analyzing prompt {}...", mode));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = analyzer.analyze(prompt).await;
    spinner.finish_and_clear();
    result
}

async fn read_stdin() -> std::io::Result<String> {
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
