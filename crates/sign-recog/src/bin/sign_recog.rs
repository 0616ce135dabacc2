use clap::Parser;
use log::LevelFilter;
use sign_recog::detect;
use sign_recog::io::{RecognitionReport, RecognizerConfig};
use std::path::{Path, PathBuf};

#[cfg(not(feature = "tracing"))]
use sign_recog::core::init_with_level;
#[cfg(feature = "tracing")]
use sign_recog::core::init_tracing;
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

/// Locate and classify road signs in image files.
#[derive(Parser, Debug)]
#[command(name = "sign-recog", version, about, long_about = None)]
struct Cli {
    /// JSON recognizer config (color range, matcher params, templates).
    #[arg(long)]
    config: PathBuf,

    /// Write the JSON reports here instead of printing them to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level for the stderr logger.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Images to process.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn process(
    path: &Path,
    library: &sign_recog::TemplateLibrary,
    config: &RecognizerConfig,
) -> RecognitionReport {
    let name = path.display().to_string();
    let frame = match image::open(path) {
        Ok(img) => img.to_rgb8(),
        Err(err) => {
            log::warn!("{name}: cannot read image: {err}");
            return RecognitionReport::failure(name, err);
        }
    };

    match detect::recognize(&frame, library, config) {
        Ok(r) => {
            match r.classification.best() {
                Some((label, c)) => log::info!("{name}: {label} ({c:.3}) at {:?}", r.region),
                None => log::info!("{name}: region {:?} matched no template", r.region),
            }
            RecognitionReport::success(name, r.region, &r.classification)
        }
        Err(err) => {
            log::info!("{name}: {err}");
            RecognitionReport::failure(name, err)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    #[cfg(not(feature = "tracing"))]
    init_with_level(cli.log_level)?;
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init_with_filter(cli.log_level);
        init_tracing(false);
    }

    let config = RecognizerConfig::load_json(&cli.config)?;
    let base_dir = cli
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let library = config.build_library(&base_dir)?;

    let reports: Vec<_> = cli
        .images
        .iter()
        .map(|path| process(path, &library, &config))
        .collect();

    match cli.output.as_ref().or(config.output_path.as_ref()) {
        Some(out) => {
            RecognitionReport::write_all_json(&reports, out)?;
            log::info!("wrote {} reports to {}", reports.len(), out.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}
