//! Process command - extract all schemas from a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use invex_core::models::ProviderConfig;
use invex_core::{
    check_bundle, ExtractionBundle, ExtractionError, ExtractionPipeline, FailurePolicy,
    InvexError, LlmExtractor, PdfExtractor, ProviderKind, SchemaRegistry, SchemaResult,
};
use invex_llm::{LlmClient, OllamaClient, OpenAiClient};

use super::{load_config, load_registry};

const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Schema file to use instead of the configured or built-in schemas
    #[arg(short, long)]
    schemas: Option<PathBuf>,

    /// Print the extracted document text before the results
    #[arg(long)]
    show_text: bool,

    /// Record failed schemas in the output instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Invoke all schemas concurrently
    #[arg(long)]
    concurrent: bool,

    /// Run invoice consistency checks on the results
    #[arg(long)]
    check: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (schema_id,index,field,value)
    Csv,
    /// Plain text, one section per schema
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let registry = load_registry(args.schemas.as_deref(), &config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let text = read_document(&args.input)?;

    if args.show_text {
        eprintln!("{}", style("Extracted text:").bold());
        eprintln!("{}", text);
        eprintln!();
    }

    // Rejected here so no client is built for an empty document.
    if text.trim().chars().count() < config.pdf.min_text_length.max(1) {
        return Err(InvexError::EmptyDocument.into());
    }

    let client = build_client(&config.provider)?;
    debug!("Using {} provider", client.name());

    let mut extractor = LlmExtractor::new(client)
        .with_temperature(config.provider.temperature)
        .with_max_tokens(config.provider.max_tokens);
    if let Some(secs) = config.extraction.invocation_timeout_secs {
        extractor = extractor.with_timeout(Duration::from_secs(secs));
    }

    let mut pipeline = ExtractionPipeline::new(extractor)
        .with_config(&config.extraction)
        .with_min_text_length(config.pdf.min_text_length);
    if args.keep_going {
        pipeline = pipeline.with_failure_policy(FailurePolicy::Continue);
    }
    if args.concurrent {
        pipeline = pipeline.with_concurrency(true);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("Extracting {} schemas...", registry.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = pipeline.run(&text, &registry).await;
    pb.finish_and_clear();
    let bundle = result.map_err(explain_failure)?;

    for (schema_id, error) in bundle.failures() {
        warn!("Schema {} failed: {}", schema_id, error);
        eprintln!("{} {} failed: {}", style("✗").red(), schema_id, error);
    }

    if args.check {
        let issues = check_bundle(&bundle);
        if !issues.is_empty() {
            eprintln!("{}", style("Consistency issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_bundle(&bundle, &registry, args.format, args.compact)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read the document text from a PDF or a plain-text file.
fn read_document(path: &Path) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let content = PdfExtractor::read(&data).map_err(InvexError::from)?;
            debug!("PDF has {} pages", content.page_count);
            Ok(content.text)
        }
        "txt" | "text" | "md" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Build the model client selected by the provider config.
fn build_client(provider: &ProviderConfig) -> anyhow::Result<Box<dyn LlmClient>> {
    let client: Box<dyn LlmClient> = match provider.kind {
        ProviderKind::OpenAi => {
            let api_key = require_api_key(provider)?;
            Box::new(OpenAiClient::new(
                &provider.base_url,
                api_key,
                &provider.model,
                provider.timeout_secs,
            )?)
        }
        ProviderKind::Azure => {
            let api_key = require_api_key(provider)?;
            let deployment = provider.deployment.as_deref().unwrap_or(&provider.model);
            Box::new(OpenAiClient::azure(
                &provider.base_url,
                api_key,
                deployment,
                provider.api_version.as_deref(),
                provider.timeout_secs,
            )?)
        }
        ProviderKind::Ollama => {
            let base_url = if provider.base_url == ProviderConfig::default().base_url {
                OLLAMA_DEFAULT_URL
            } else {
                provider.base_url.as_str()
            };
            Box::new(OllamaClient::new(base_url, &provider.model, provider.timeout_secs)?)
        }
    };
    Ok(client)
}

fn require_api_key(provider: &ProviderConfig) -> anyhow::Result<&str> {
    provider
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No API key configured. Set OPENAI_API_KEY or provider.api_key."))
}

/// Attach a hint when the provider rejected the credentials.
fn explain_failure(err: InvexError) -> anyhow::Error {
    match &err {
        InvexError::Extraction(ExtractionError::ModelInvocation { source, .. }) if source.is_auth() => {
            anyhow::Error::new(err)
                .context("Provider rejected the credentials. Check OPENAI_API_KEY or provider.api_key.")
        }
        _ => err.into(),
    }
}

fn format_bundle(
    bundle: &ExtractionBundle,
    registry: &SchemaRegistry,
    format: OutputFormat,
    compact: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if compact => Ok(serde_json::to_string(bundle)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(bundle)?),
        OutputFormat::Csv => format_csv(bundle),
        OutputFormat::Text => Ok(format_text(bundle, registry)),
    }
}

fn format_csv(bundle: &ExtractionBundle) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["schema_id", "index", "field", "value"])?;

    for (schema_id, result) in bundle.iter() {
        if let SchemaResult::Failed { error } = result {
            wtr.write_record([schema_id, "", "error", error.as_str()])?;
            continue;
        }
        for (index, record) in result.records().iter().enumerate() {
            let index = index.to_string();
            for (field, value) in record.iter() {
                wtr.write_record([schema_id, index.as_str(), field, value.unwrap_or("")])?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(bundle: &ExtractionBundle, registry: &SchemaRegistry) -> String {
    let mut output = String::new();

    for (schema_id, result) in bundle.iter() {
        let title = registry
            .get(schema_id)
            .map(|s| s.title())
            .unwrap_or(schema_id);
        output.push_str(&format!("{}\n{}\n", title, "-".repeat(title.chars().count())));

        match result {
            SchemaResult::One(record) => {
                for (field, value) in record.iter() {
                    output.push_str(&format!("  {}: {}\n", field, value.unwrap_or("-")));
                }
            }
            SchemaResult::Many(records) if records.is_empty() => output.push_str("  (none)\n"),
            SchemaResult::Many(records) => {
                for (index, record) in records.iter().enumerate() {
                    output.push_str(&format!("  [{}]\n", index + 1));
                    for (field, value) in record.iter() {
                        output.push_str(&format!("    {}: {}\n", field, value.unwrap_or("-")));
                    }
                }
            }
            SchemaResult::Failed { error } => {
                output.push_str(&format!("  error: {}\n", error));
            }
        }
        output.push('\n');
    }

    output
}
