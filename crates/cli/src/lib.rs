use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use config::{ProxyConfig, ServiceConfig, DEFAULT_FETCH_TIMEOUT_SECS};
use fetch::{is_url, HttpFetcher, PageSource};
use phrasefind_protocol::{serialize_json, SearchResponse};
use phrasefind_search::{search, SearchConfig, DEFAULT_FUZZY_DISTANCE};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod fetch;
mod html_text;
mod http_api;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "phrasefind")]
#[command(about = "Locate a phrase in a page, tolerating typos and markup noise", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one document for a phrase
    Search(SearchArgs),

    /// Serve the search API over HTTP (GET|POST /api/search)
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct MatchArgs {
    /// Maximum gap between matched characters (filler allowed is one less)
    #[arg(long, default_value_t = DEFAULT_FUZZY_DISTANCE)]
    fuzzy_distance: usize,

    /// Number of whole words to return before the match
    #[arg(long, default_value_t = 0)]
    count_before: usize,

    /// Number of whole words to return after the match
    #[arg(long, default_value_t = 0)]
    count_after: usize,
}

impl MatchArgs {
    fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_fuzzy_distance(self.fuzzy_distance)
            .with_context(self.count_before, self.count_after)
    }
}

#[derive(Args)]
struct FetchArgs {
    /// Fallback proxy endpoint, called as <url>?api_key=..&url=.. (env: PHRASEFIND_PROXY_URL)
    #[arg(long)]
    proxy_url: Option<String>,

    /// API key for the fallback proxy (env: PHRASEFIND_PROXY_API_KEY)
    #[arg(long)]
    proxy_api_key: Option<String>,

    /// Timeout for each outbound page request
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout_secs: u64,
}

impl FetchArgs {
    fn service_config(&self, defaults: SearchConfig) -> Result<ServiceConfig> {
        let proxy_url = self
            .proxy_url
            .clone()
            .or_else(|| env::var(config::PROXY_URL_ENV).ok());
        let proxy_api_key = self
            .proxy_api_key
            .clone()
            .or_else(|| env::var(config::PROXY_API_KEY_ENV).ok());
        let proxy = ProxyConfig::from_parts(proxy_url.as_deref(), proxy_api_key.as_deref())?;
        ServiceConfig::new(
            defaults,
            proxy,
            Duration::from_secs(self.fetch_timeout_secs),
        )
    }
}

#[derive(Args)]
struct SearchArgs {
    /// Phrase to look for
    #[arg(short, long)]
    query: String,

    /// Fetch the document from this URL (HTML is converted to text)
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Read the document from a file (stdin when neither --url nor --file is given)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Treat file/stdin input as HTML
    #[arg(long)]
    html: bool,

    /// Print the JSON response instead of a text line
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    matching: MatchArgs,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Allow binding to non-loopback addresses
    #[arg(long)]
    public: bool,

    #[command(flatten)]
    matching: MatchArgs,

    #[command(flatten)]
    fetch: FetchArgs,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for machine-readable output.
    if let Commands::Search(args) = &cli.command {
        if args.json {
            cli.quiet = true;
        }
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Search(args) => run_search(args).await?,
        Commands::ServeHttp(args) => serve_http(args).await?,
    }

    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let service = args.fetch.service_config(args.matching.search_config())?;

    let (text, source_url) = match &args.url {
        Some(url) => {
            if !is_url(url) {
                anyhow::bail!("Wrong URL format: {url}");
            }
            let fetcher = HttpFetcher::new(&service)?;
            let body = fetcher.fetch(url).await?;
            (html_text::html_to_text(&body), url.clone())
        }
        None => {
            let raw = match &args.file {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let text = if args.html {
                html_text::html_to_text(&raw)
            } else {
                html_text::flatten_lines(&raw)
            };
            let source = args
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            (text, source)
        }
    };

    let result = search(&args.query, &text, &service.defaults)?;
    let found = result.is_found();
    let response = SearchResponse::from_result(result, source_url);

    if args.json {
        print_stdout(&serialize_json(&response)?)?;
    } else if found {
        let mut parts = Vec::with_capacity(3);
        if !response.before.is_empty() {
            parts.push(response.before.clone());
        }
        parts.push(format!("[{}]", response.found_text));
        if !response.after.is_empty() {
            parts.push(response.after.clone());
        }
        print_stdout(&parts.join(" "))?;
    } else {
        print_stdout(&format!("not found: {}", response.search_request))?;
    }

    if !found {
        std::process::exit(1);
    }

    Ok(())
}

async fn serve_http(args: ServeArgs) -> Result<()> {
    let addrs = server_security::resolve_guarded_bind_addrs(&args.bind, args.public).await?;
    let service = args.fetch.service_config(args.matching.search_config())?;
    let fetcher = HttpFetcher::new(&service)?;

    if service.proxy.is_none() {
        log::info!("Proxy fallback disabled (no proxy URL/API key configured)");
    }

    let state = Arc::new(http_api::HttpState {
        config: service,
        source: Box::new(fetcher),
    });
    let app = http_api::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving search API: {base_url}/api/search"))?;
    print_stdout(&format!("Test form: {base_url}/test"))?;
    if args.public {
        let addrs = addrs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }
    print_stdout(&format!(
        "Try: curl '{base_url}/api/search?url=https://example.com&search=example+domain&count_after=3'"
    ))?;

    axum::serve(listener, app).await?;
    Ok(())
}
