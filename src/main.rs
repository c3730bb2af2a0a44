use clap::{Parser, Subcommand};
use opera_roster::config::{self, Overrides, RosterConfig};
use opera_roster::download::{self, DownloadOptions, HttpFetcher};
use opera_roster::imaging::{OutputFormat, Quality, RustBackend};
use opera_roster::import::{self, ImportOptions};
use opera_roster::{generate, output, server};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "opera-roster")]
#[command(about = "Static site generator for an opera artist roster")]
#[command(long_about = "\
Static site generator for an opera artist roster

Content structure:

  content/
  ├── site.json        # Agency name, description, contact, links
  ├── artists.json     # The roster (array, or {\"artists\": [...]})
  └── team.json        # Optional; overrides site.json's team
  static/
  └── assets/          # Copied verbatim into the output root
      └── images/artists/<slug>.jpg

Settings are layered: stock defaults, then roster.toml, then environment
variables and flags. Run 'opera-roster gen-config' for a documented file.")]
#[command(version)]
struct Cli {
    /// Config file (optional)
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Content directory
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Static asset directory
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Output directory
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// URL path prefix the site is deployed under, e.g. /roster
    #[arg(long, env = "BASE_PATH", global = true)]
    base_path: Option<String>,

    /// Absolute site URL used for canonical links and the sitemap
    #[arg(long, env = "SITE_URL", global = true)]
    site_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the output directory
    Build,
    /// Serve the output directory and rebuild on content changes
    Serve {
        /// Port to listen on (default from config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Download artist portraits from their photo.sourceUrl
    DownloadAssets {
        /// Overwrite files that already exist
        #[arg(long)]
        force: bool,
        /// Show what would be fetched without downloading
        #[arg(long)]
        dry_run: bool,
        /// Only this artist slug (repeatable)
        #[arg(long = "only", value_name = "SLUG")]
        only: Vec<String>,
    },
    /// Crop a local image into an artist portrait
    ImportPhoto {
        /// Source image
        #[arg(long)]
        src: PathBuf,
        /// Artist slug; names the output file
        #[arg(long)]
        slug: String,
        /// Output width in pixels
        #[arg(long, default_value_t = 800)]
        width: u32,
        /// Output height in pixels (overrides --aspect)
        #[arg(long)]
        height: Option<u32>,
        /// Aspect ratio as W:H, W/H or a decimal
        #[arg(long, default_value = "4:5")]
        aspect: String,
        /// Output format: jpg, png or webp
        #[arg(long, default_value = "jpg")]
        format: OutputFormat,
        /// JPEG quality, 1-100
        #[arg(long, default_value_t = 85, value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: u32,
        /// Overwrite an existing portrait
        #[arg(long)]
        force: bool,
    },
    /// Load and validate content without building
    Check,
    /// Print a stock roster.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Command::Serve { .. }));

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise `info` while serving and `warn` for one-shot
/// commands so their stdout stays readable.
fn init_tracing(serving: bool) {
    let level = if serving {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path, overrides: Overrides) -> anyhow::Result<RosterConfig> {
    let mut config = config::load_config(path)?;
    config.apply_overrides(overrides)?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config;
    let overrides = Overrides {
        content: cli.content,
        static_dir: cli.static_dir,
        output: cli.output,
        base_path: cli.base_path,
        base_url: cli.site_url,
    };
    let resolve = || load_config(&config_path, overrides.clone());

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Build => {
            let summary = generate::build_site(&resolve()?)?;
            output::print_build_output(&summary);
        }
        Command::Check => {
            let content = generate::check_content(&resolve()?)?;
            output::print_check_output(&content);
        }
        Command::Serve { port } => {
            let config = resolve()?;
            let port = port.unwrap_or(config.serve.port);
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config, port))?;
        }
        Command::DownloadAssets {
            force,
            dry_run,
            only,
        } => {
            let config = resolve()?;
            let fetcher = HttpFetcher::new()?;
            let options = DownloadOptions {
                force,
                dry_run,
                only,
            };
            let report = download::download_assets(
                &config.paths.content,
                &config.paths.static_dir,
                &options,
                &fetcher,
            )?;
            output::print_download_report(&report);
            if report.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::ImportPhoto {
            src,
            slug,
            width,
            height,
            aspect,
            format,
            quality,
            force,
        } => {
            let config = resolve()?;
            let options = ImportOptions {
                source: src,
                slug,
                width,
                height,
                aspect,
                format,
                quality: Quality::new(quality),
                force,
            };
            let result = import::import_photo(
                &RustBackend::new(),
                &config.paths.static_dir,
                &config.paths.content,
                &options,
            )?;
            output::print_import_result(&options.slug, &result);
        }
    }

    Ok(ExitCode::SUCCESS)
}
