use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folio_core::{
    DocxConfig, DocxWriter, Document, ExtractConfig, ExtractionResult, Extractor, FetchConfig, ImageConfig,
    ImageStore, MarkdownConfig, TracingObserver, convert_to_json, convert_to_markdown, default_output_name,
    fetch_article, fetch_file, fetch_stdin, metadata_to_json,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the converted article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Docx,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docx" | "word" => Ok(Self::Docx),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Invalid format: {}. Valid options: docx, json, markdown", s)),
        }
    }
}

/// Convert an article page into a Word document
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Convert article pages into DOCX documents", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: <title>.docx for DOCX, stdout otherwise)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (docx, json, markdown)
    #[arg(short, long, default_value = "docx", value_name = "FORMAT")]
    format: OutputFormat,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Referer sent with page and image requests
    #[arg(long, value_name = "URL")]
    referer: Option<String>,

    /// Never fall back to the headless browser
    #[arg(long)]
    no_render: bool,

    /// Skip image download and embedding
    #[arg(long)]
    no_images: bool,

    /// Save the fetched markup to a file
    #[arg(long, value_name = "FILE")]
    save_html: Option<PathBuf>,

    /// Maximum element depth below the content root
    #[arg(long, default_value = "20", value_name = "NUM")]
    max_depth: usize,

    /// Minimum text length for the largest-container fallback root
    #[arg(long, default_value = "500", value_name = "NUM")]
    min_root_chars: usize,

    /// Keep fallback blocks that duplicate extracted ones
    #[arg(long)]
    no_dedupe: bool,

    /// Print title, author and date as JSON without extracting content
    #[arg(long)]
    metadata_only: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_url(&self) -> bool {
        Url::parse(&self.input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }

    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig {
            timeout: self.timeout,
            referer: self.referer.clone(),
            render: !self.no_render,
            ..Default::default()
        };
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        config
    }

    fn image_config(&self) -> ImageConfig {
        let mut config = ImageConfig { timeout: self.timeout.min(30), ..Default::default() };
        if let Some(ua) = &self.user_agent {
            config.user_agent = ua.clone();
        }
        if self.referer.is_some() {
            config.referer = self.referer.clone();
        }
        config
    }

    fn extract_config(&self) -> ExtractConfig {
        ExtractConfig::builder()
            .max_depth(self.max_depth)
            .min_root_chars(self.min_root_chars)
            .dedupe_fallback(!self.no_dedupe)
            .build()
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={level},folio_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn read_input(args: &Args) -> anyhow::Result<String> {
    if args.input == "-" {
        echo::print_step(1, 4, "Reading from stdin", args.verbose);
        fetch_stdin().context("Failed to read from stdin")
    } else if args.is_url() {
        echo::print_step(
            1,
            4,
            &format!("Fetching from {}", args.input.bright_white().underline()),
            args.verbose,
        );
        fetch_article(&args.input, &args.fetch_config())
            .await
            .with_context(|| format!("Failed to fetch {}", args.input))
    } else {
        echo::print_step(1, 4, &format!("Reading from file {}", args.input.bright_white()), args.verbose);
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))
    }
}

async fn write_docx(args: &Args, result: &ExtractionResult) -> anyhow::Result<PathBuf> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(&result.title)));
    let writer = DocxWriter::new(DocxConfig::default());
    tracing::debug!(path = %path.display(), blocks = result.blocks.len(), "writing document");

    let urls = result.image_urls();
    if args.no_images || urls.is_empty() {
        return writer
            .write_result(result, |_| None, &path)
            .with_context(|| format!("Failed to write {}", path.display()));
    }

    let mut store = ImageStore::new(args.image_config()).context("Failed to create image directory")?;
    let staged = store.fetch_all(urls.iter().copied()).await;
    tracing::debug!(staged, total = urls.len(), dir = %store.dir().display(), "staged images");
    echo::print_detail("Images:", &format!("{}/{} downloaded", staged, urls.len()), args.verbose);
    if staged < urls.len() {
        echo::print_warning(&format!("{} image(s) could not be downloaded", urls.len() - staged));
    }

    writer
        .write_result(result, |url| store.resolve(url).map(Path::to_path_buf), &path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_text(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
    }

    let html = read_input(&args).await?;
    echo::print_detail("Size:", &echo::format_size(html.len()), args.verbose);

    if let Some(path) = &args.save_html {
        fs::write(path, &html).with_context(|| format!("Failed to save markup to {}", path.display()))?;
        echo::print_info(&format!("Markup saved to {}", path.display()));
    }

    if args.metadata_only {
        echo::print_step(2, 4, "Resolving metadata", args.verbose);
        let doc = Document::parse(&html).context("Failed to parse markup")?;
        let json = metadata_to_json(&doc.extract_metadata(), true).context("Failed to serialize JSON")?;
        echo::print_step(4, 4, "Writing output", args.verbose);
        return write_text(args.output.as_deref(), &format!("{}\n", json));
    }

    echo::print_step(2, 4, "Extracting article content", args.verbose);
    let extractor = Extractor::with_config(args.extract_config()).observer(Arc::new(TracingObserver));
    let source_url = args.is_url().then_some(args.input.as_str());
    let result = extractor.extract(&html, source_url).context("Failed to extract content")?;

    if args.verbose {
        echo::print_summary(&result);
    }

    echo::print_step(3, 4, &format!("Rendering {:?}", args.format), args.verbose);
    match args.format {
        OutputFormat::Docx => {
            let path = write_docx(&args, &result).await?;
            echo::print_step(4, 4, "Done", args.verbose);
            echo::print_success(&format!("Document written to {}", path.display().bright_white()));
        }
        OutputFormat::Json => {
            let json = convert_to_json(&result, true).context("Failed to serialize JSON")?;
            echo::print_step(4, 4, "Writing output", args.verbose);
            write_text(args.output.as_deref(), &format!("{}\n", json))?;
        }
        OutputFormat::Markdown => {
            let config = MarkdownConfig { strip_images: args.no_images, ..Default::default() };
            let markdown = convert_to_markdown(&result, &config);
            echo::print_step(4, 4, "Writing output", args.verbose);
            write_text(args.output.as_deref(), &markdown)?;
        }
    }

    Ok(())
}
