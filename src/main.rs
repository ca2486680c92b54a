//! securesuite: fetch a SecureSuite token, then list, inspect or download
//! CIS benchmarks with it.

use clap::{ArgGroup, Parser};
use securesuite::config::BENCHMARK_LIST_FILE_NAME;
use securesuite::report::table::{write_benchmark_report, REPORT_FILE_NAME};
use securesuite::{BenchmarkClient, TokenManager, WorkbenchConfig, WorkbenchError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// SecureSuite token and benchmark management
#[derive(Parser, Debug)]
#[command(name = "securesuite", author, version, about)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["gettoken", "getbenchmarks", "download", "getdetails", "analyse"])
))]
struct Cli {
    /// Request a token, which also checks that the license is valid
    #[arg(long)]
    gettoken: bool,

    /// Fetch the list of available benchmarks
    #[arg(long)]
    getbenchmarks: bool,

    /// Download the benchmark with the given ID
    #[arg(long, value_name = "ID")]
    download: Option<String>,

    /// Show the details of the benchmark with the given ID
    #[arg(long, value_name = "ID")]
    getdetails: Option<String>,

    /// Summarise a saved benchmark list into a text table
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    analyse: Option<Option<PathBuf>>,

    /// License key file (XML or JSON)
    #[arg(long, value_name = "FILE", default_value = "license.xml")]
    license: PathBuf,

    /// API root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Token cache file
    #[arg(long, value_name = "FILE")]
    token_file: Option<PathBuf>,

    /// Directory for the benchmark list and downloaded archives
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output file for --analyse
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> WorkbenchConfig {
        let mut config = WorkbenchConfig::default();
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(path) = &self.token_file {
            config.token_file = path.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.download_dir = dir.clone();
            config.benchmark_list_file = dir.join(BENCHMARK_LIST_FILE_NAME);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,securesuite=debug"
    } else {
        "warn,securesuite=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, WorkbenchError> {
    let config = cli.config();

    if let Some(list) = &cli.analyse {
        let list = list.clone().unwrap_or_else(|| config.benchmark_list_file.clone());
        let report = cli
            .report
            .clone()
            .unwrap_or_else(|| list.with_file_name(REPORT_FILE_NAME));
        let rows = write_benchmark_report(&list, &report)?;
        println!(
            "Analysis complete: {} benchmarks written to '{}'.",
            rows,
            report.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let manager = TokenManager::new(config)?;
    let Some(token) = obtain_token(&manager, &cli.license) else {
        return Ok(ExitCode::FAILURE);
    };
    let client = BenchmarkClient::new(&manager, &cli.license);

    if cli.getbenchmarks {
        let listing = client.list_benchmarks(cli.verbose, Some(&token))?;
        println!(
            "Saved {} benchmarks to {}",
            listing.count,
            listing.saved_to.display()
        );
    } else if let Some(id) = &cli.getdetails {
        let details = client.benchmark_details(id, &token)?;
        let pretty = serde_json::to_string_pretty(&details)
            .map_err(|e| WorkbenchError::MalformedResponse(e.to_string()))?;
        println!("{}", pretty);
    } else if let Some(id) = &cli.download {
        let path = client.download_benchmark(id, &token)?;
        println!("{}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn obtain_token(manager: &TokenManager, license: &Path) -> Option<String> {
    match manager.get_token(license, false) {
        Some(token) => {
            let minutes = manager.config().token_validity.as_secs() / 60;
            println!("Token retrieved successfully: {}", token);
            println!("You can now use this token for authenticated API requests.");
            println!("The token is valid for {} minutes.", minutes);
            Some(token)
        }
        None => {
            println!("Failed to obtain a valid token.");
            None
        }
    }
}
