//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lasfera_annotations::{AnnotationClient, AnnotationId};
use lasfera_records::{BuildProgress, build_all, check_all};
use lasfera_shared::{
    AppConfig, BuildConfig, BuildReport, EntityKind, EntityReport, RecordOrdering, init_config,
    load_config, load_config_from,
};
use lasfera_viewer::{FolioMatcher, Manifest, fetch_manifest};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// La Sfera: build the edition's data files and inspect viewer/annotation data.
#[derive(Parser)]
#[command(
    name = "lasfera",
    version,
    about = "Build La Sfera's JSON data from YAML source records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root (defaults to the current directory).
    #[arg(long, global = true, env = "LASFERA_ROOT")]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/lasfera.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output order for manuscripts and locations.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OrderingArg {
    Listing,
    Key,
}

impl From<OrderingArg> for RecordOrdering {
    fn from(arg: OrderingArg) -> Self {
        match arg {
            OrderingArg::Listing => RecordOrdering::Listing,
            OrderingArg::Key => RecordOrdering::Key,
        }
    }
}

/// Flags shared by `build` and `check`.
#[derive(clap::Args, Clone, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Override `[build].ordering`.
    #[arg(long)]
    pub ordering: Option<OrderingArg>,

    /// Only warn about malformed line codes.
    #[arg(long)]
    pub lenient: bool,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build every data collection into the output directory.
    Build(BuildArgs),

    /// Load and shape every collection without writing anything.
    Check(BuildArgs),

    /// Find the manifest canvas for a folio.
    Folio {
        /// Folio identifier, e.g. "12v".
        folio: String,

        /// IIIF manifest file path or URL.
        #[arg(long)]
        manifest: String,
    },

    /// Query the annotation API.
    Annotations {
        #[command(subcommand)]
        action: AnnotationsAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Annotation subcommands.
#[derive(Subcommand)]
pub(crate) enum AnnotationsAction {
    /// List the annotations stored for a stanza.
    List {
        stanza_id: String,
    },
    /// Show one annotation.
    Show {
        id: String,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lasfera=info",
        1 => "lasfera=debug",
        _ => "lasfera=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()
            .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
    };
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(&root)?,
    };

    match cli.command {
        None => cmd_build(&root, &config, &BuildArgs::default()),
        Some(Command::Build(args)) => cmd_build(&root, &config, &args),
        Some(Command::Check(args)) => cmd_check(&root, &config, &args),
        Some(Command::Folio { folio, manifest }) => cmd_folio(&folio, &manifest, &config).await,
        Some(Command::Annotations { action }) => match action {
            AnnotationsAction::List { stanza_id } => cmd_annotations_list(&config, &stanza_id).await,
            AnnotationsAction::Show { id } => cmd_annotations_show(&config, &id).await,
        },
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(&root),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn build_config(root: &Path, config: &AppConfig, args: &BuildArgs) -> BuildConfig {
    let mut build = BuildConfig::resolve(config, root);
    if let Some(ordering) = args.ordering {
        build.ordering = ordering.into();
    }
    if args.lenient {
        build.strict_line_codes = false;
    }
    build
}

// ---------------------------------------------------------------------------
// Build / check
// ---------------------------------------------------------------------------

fn cmd_build(root: &Path, config: &AppConfig, args: &BuildArgs) -> Result<()> {
    let build = build_config(root, config, args);
    info!(
        data_dir = %build.data_dir.display(),
        output_dir = %build.output_dir.display(),
        "building data collections"
    );

    let reporter = CliProgress::new("Built");
    let report = build_all(&build, &reporter)?;
    print_summary("Data build complete!", &report);
    Ok(())
}

fn cmd_check(root: &Path, config: &AppConfig, args: &BuildArgs) -> Result<()> {
    let build = build_config(root, config, args);
    info!(data_dir = %build.data_dir.display(), "checking source records");

    let reporter = CliProgress::new("Checked");
    let report = check_all(&build, &reporter)?;
    print_summary("Source records are valid.", &report);
    Ok(())
}

fn print_summary(headline: &str, report: &BuildReport) {
    println!();
    println!("  {headline}");
    for entity in &report.entities {
        let target = entity
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<13} {:>5}  {}  {}",
            entity.kind.as_str(),
            entity.count,
            &entity.sha256[..12.min(entity.sha256.len())],
            target
        );
    }
    println!("  Time:         {:.2}s", report.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
    verb: &'static str,
}

impl CliProgress {
    fn new(verb: &'static str) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner, verb }
    }
}

impl BuildProgress for CliProgress {
    fn entity_started(&self, kind: EntityKind) {
        self.spinner.set_message(format!("Loading {kind}"));
    }

    fn entity_built(&self, report: &EntityReport) {
        self.spinner
            .println(format!("✓ {} {} {}", self.verb, report.count, report.kind));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

async fn cmd_folio(folio: &str, manifest: &str, config: &AppConfig) -> Result<()> {
    let matcher = FolioMatcher::new(folio).ok_or_else(|| eyre!("folio must not be empty"))?;

    let manifest = match Url::parse(manifest) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            fetch_manifest(&url, config.api.timeout_secs).await?
        }
        _ => Manifest::from_path(Path::new(manifest))?,
    };

    let canvases = manifest.canvases();
    match matcher.find_canvas(canvases) {
        Some(index) => {
            let canvas = &canvases[index];
            println!(
                "{} → canvas {index} {} ({})",
                matcher.folio(),
                canvas.id.as_deref().unwrap_or("-"),
                canvas.label_texts().join(" / ")
            );
        }
        None => println!(
            "no matching canvas for folio '{}' among {} canvases",
            matcher.folio(),
            canvases.len()
        ),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

fn annotation_client(config: &AppConfig) -> Result<AnnotationClient> {
    let base_url = Url::parse(&config.api.base_url)
        .map_err(|e| eyre!("invalid [api].base_url '{}': {e}", config.api.base_url))?;
    let client = AnnotationClient::new(base_url, config.api.timeout_secs)?;
    Ok(match &config.api.session_cookie {
        Some(cookie) => client.with_session_cookie(cookie.as_str()),
        None => client,
    })
}

async fn cmd_annotations_list(config: &AppConfig, stanza_id: &str) -> Result<()> {
    let client = annotation_client(config)?;
    let annotations = client.list(stanza_id).await?;

    if annotations.is_empty() {
        println!("No annotations for stanza {stanza_id}.");
        return Ok(());
    }
    for annotation in &annotations {
        println!(
            "  {:>6}  {:<11} {}",
            annotation.id.as_str(),
            annotation.annotation_type.as_str(),
            annotation.selected_text
        );
    }
    Ok(())
}

async fn cmd_annotations_show(config: &AppConfig, id: &str) -> Result<()> {
    let client = annotation_client(config)?;
    let detail = client.get(&AnnotationId::new(id)).await?;

    println!("{}", detail.annotation_type.label());
    println!();
    println!("{}", detail.annotation.as_deref().unwrap_or(""));
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
