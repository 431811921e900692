use clap::{Parser, Subcommand};
use ortho_baa::batch::{self, BatchSettings};
use ortho_baa::compose::{self, ComposeRequest};
use ortho_baa::config::{self, AppConfig};
use ortho_baa::export::{ExportFormat, ExportOptions};
use ortho_baa::imaging::{CropParams, ImageBackend, Quality, RustBackend};
use ortho_baa::naming::{self, NameParts};
use ortho_baa::{logging, output, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

fn parse_scale(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err("scale must be greater than 0 and at most 1".into())
    }
}

/// Where and how to write.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Output folder [default: last used folder]
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output format: pdf or jpeg [default: last used format]
    #[arg(long)]
    format: Option<ExportFormat>,

    /// Shrink after fit-to-half, in (0, 1]
    #[arg(long, value_parser = parse_scale)]
    scale: Option<f64>,

    /// JPEG quality, 1-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,
}

/// Two-stage vertical crop: keep the top N rows, then the bottom M of those.
#[derive(clap::Args, Clone)]
struct CropArgs {
    /// Crop the before photo
    #[arg(long)]
    crop_before: bool,

    /// Crop the after photo
    #[arg(long)]
    crop_after: bool,

    /// Rows kept from the top [default: from settings]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    top: Option<u32>,

    /// Rows then kept from the bottom [default: from settings]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    bottom: Option<u32>,
}

/// Which identity parts go into suggested names.
#[derive(clap::Args, Clone)]
struct NameArgs {
    /// Leave the patient ID out of suggested names
    #[arg(long)]
    no_id: bool,

    /// Leave the first name out of suggested names
    #[arg(long)]
    no_first: bool,

    /// Leave the last name out of suggested names
    #[arg(long)]
    no_last: bool,
}

#[derive(Parser)]
#[command(name = "ortho-baa")]
#[command(about = "Compose before/after photo pairs onto one printable page")]
#[command(long_about = "\
Compose before/after photo pairs onto one printable page

The before photo goes on the left, the after photo on the right, each fitted
into its half without distortion and centered. Output is a US Letter
landscape PDF or a 3300x2550 JPEG sheet.

Output names come from the patient identity in the filenames:

  045_john_doe_preop.jpg + 045_john_doe_postop.jpg
      → 045_John_Doe_BeforeAndAfter.pdf

Batch mode pairs files in a folder by their suffix (Smith-Before.jpg /
Smith-After.jpg), then pairs whatever is left two at a time in name order.
Use 'ortho-baa pairs <FOLDER>' to preview the pairing.

Settings (last output folder, format, crop rows, scale) are remembered in
$XDG_CONFIG_HOME/ortho-baa/config.toml. Run 'ortho-baa gen-config' for a
documented example.")]
#[command(version = version_string())]
struct Cli {
    /// Settings file [default: $XDG_CONFIG_HOME/ortho-baa/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export one before/after pair
    Compose {
        before: PathBuf,
        after: PathBuf,
        /// Output file name; the extension follows the format
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        crop: CropArgs,
        #[command(flatten)]
        names: NameArgs,
        /// Open the written file afterwards
        #[arg(long)]
        open: bool,
    },
    /// Export every pair guessed in a folder
    Batch {
        folder: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        crop: CropArgs,
        #[command(flatten)]
        names: NameArgs,
    },
    /// List the pairs a batch would export, without exporting
    Pairs {
        folder: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the output name suggested for a pair
    SuggestName {
        before: PathBuf,
        after: PathBuf,
        #[command(flatten)]
        names: NameArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Print the effective settings and supported input formats
    ShowConfig,
}

/// Settings resolved from the config file plus command-line overrides.
struct Resolved {
    out_dir: PathBuf,
    format: ExportFormat,
    options: ExportOptions,
    crop_before: CropParams,
    crop_after: CropParams,
    name_parts: NameParts,
}

fn name_parts(config: &AppConfig, names: &NameArgs) -> NameParts {
    NameParts {
        use_id: config.name_parts.use_id && !names.no_id,
        use_first: config.name_parts.use_first && !names.no_first,
        use_last: config.name_parts.use_last && !names.no_last,
    }
}

fn resolve(config: &AppConfig, output: &OutputArgs, crop: &CropArgs, names: &NameArgs) -> Resolved {
    let rows = CropParams::new(
        crop.top.unwrap_or(config.crop_defaults.top),
        crop.bottom.unwrap_or(config.crop_defaults.bottom),
    );
    let pick = |enabled: bool| if enabled { rows } else { CropParams::disabled() };
    let defaults = config.export_options();
    Resolved {
        out_dir: output
            .out_dir
            .clone()
            .unwrap_or_else(|| config.last_out_dir.clone()),
        format: output.format.unwrap_or(config.output_format),
        options: ExportOptions {
            scale_factor: output.scale.unwrap_or(defaults.scale_factor),
            jpeg_quality: output.quality.map(Quality::new).unwrap_or(defaults.jpeg_quality),
        },
        crop_before: pick(crop.crop_before),
        crop_after: pick(crop.crop_after),
        name_parts: name_parts(config, names),
    }
}

/// Remember the folder and format of a successful export.
fn remember(config: &AppConfig, path: Option<&Path>, out_dir: &Path, format: ExportFormat) {
    let Some(path) = path else { return };
    let updated = AppConfig {
        last_out_dir: out_dir.to_path_buf(),
        output_format: format,
        ..config.clone()
    };
    config::save_config(&updated, path);
}

/// Hand the file to the platform's default viewer.
fn open_in_viewer(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut cmd = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut cmd = std::process::Command::new("xdg-open");

    cmd.arg(path).spawn()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = cli.config.clone().or_else(config::default_config_path);
    let config = match &config_path {
        Some(path) => config::load_config(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Compose {
            before,
            after,
            name,
            output: out_args,
            crop,
            names,
            open,
        } => {
            let settings = resolve(&config, &out_args, &crop, &names);
            let request = ComposeRequest {
                before,
                after,
                crop_before: settings.crop_before,
                crop_after: settings.crop_after,
                out_dir: settings.out_dir.clone(),
                file_name: name,
                format: settings.format,
                options: settings.options,
                name_parts: settings.name_parts,
            };
            let written = compose::compose_pair(&RustBackend::new(), &request)?;
            output::print_written(&written);
            remember(&config, config_path.as_deref(), &settings.out_dir, settings.format);

            if open {
                if let Err(e) = open_in_viewer(&written) {
                    tracing::warn!(path = %written.display(), error = %e, "could not open file");
                }
            }
        }
        Command::Batch {
            folder,
            output: out_args,
            crop,
            names,
        } => {
            let backend = RustBackend::new();
            let pairs = scan::guess_pairs(&folder, backend.supported_extensions())?;
            if pairs.is_empty() {
                output::print_pairs(&[], &folder);
                return Ok(());
            }

            let resolved = resolve(&config, &out_args, &crop, &names);
            let settings = BatchSettings {
                out_dir: resolved.out_dir.clone(),
                format: resolved.format,
                options: resolved.options,
                crop_before: resolved.crop_before,
                crop_after: resolved.crop_after,
                name_parts: resolved.name_parts,
            };
            let summary = batch::run_batch(&backend, &pairs, &settings, |event| {
                output::print_batch_event(event, &settings.out_dir)
            });
            output::print_batch_summary(&summary, &settings.out_dir);
            if !summary.written.is_empty() {
                remember(&config, config_path.as_deref(), &settings.out_dir, settings.format);
            }
        }
        Command::Pairs { folder, json } => {
            let backend = RustBackend::new();
            let pairs = scan::guess_pairs(&folder, backend.supported_extensions())?;
            let previews = scan::preview_pairs(&backend, pairs);
            if json {
                println!("{}", serde_json::to_string_pretty(&previews)?);
            } else {
                output::print_pairs(&previews, &folder);
            }
        }
        Command::SuggestName {
            before,
            after,
            names,
        } => {
            let file_name = |p: &Path| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            };
            println!(
                "{}",
                naming::suggest_basename(
                    &file_name(&before),
                    &file_name(&after),
                    name_parts(&config, &names)
                )
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::ShowConfig => {
            output::print_config(
                &config,
                config_path.as_deref(),
                RustBackend::new().capabilities(),
            );
        }
    }

    Ok(())
}
