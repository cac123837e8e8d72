//! Headless batch editing: load one image, run effects and adjustments
//! through an `EditorSession`, write the result.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::Parser;

use crate::adjust::AdjustmentKind;
use crate::buffer::ExportFormat;
use crate::config::{load_config, load_config_from, PhotoolConfig};
use crate::dispatcher::Dispatched;
use crate::effects::Catalog;
use crate::error::{AppError, AppResult};
use crate::geometry::CropRect;
use crate::session::{EditError, EditorSession, SessionOptions};

/// Photool headless photo editor.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "photool",
    version,
    about = "Apply photo effects, adjustments and crops from the command line",
    long_about = "Loads an image, applies effects in the order given, commits any\n\
                  slider adjustments as one edit, optionally crops, and writes the\n\
                  result.\n\n\
                  Example:\n  \
                  photool -i photo.jpg -o out.png --effect sepia --effect vignette --brightness 110"
)]
pub struct CliArgs {
    /// Image to edit.
    #[arg(short, long, value_name = "FILE", required_unless_present = "list_effects")]
    pub input: Option<PathBuf>,

    /// Where to write the edited image.
    #[arg(short, long, value_name = "FILE", required_unless_present = "list_effects")]
    pub output: Option<PathBuf>,

    /// Effect identifier; repeat to chain effects in order.
    #[arg(short, long = "effect", value_name = "ID")]
    pub effects: Vec<String>,

    /// Brightness percent (0-200, 100 = unchanged).
    #[arg(long, value_name = "0-200")]
    pub brightness: Option<f32>,

    /// Contrast percent (0-200, 100 = unchanged).
    #[arg(long, value_name = "0-200")]
    pub contrast: Option<f32>,

    /// Saturation percent (0-200, 100 = unchanged).
    #[arg(long, value_name = "0-200")]
    pub saturation: Option<f32>,

    /// Hue rotation in degrees.
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true)]
    pub hue: Option<f32>,

    /// Gaussian blur radius (0-20).
    #[arg(long, value_name = "0-20")]
    pub blur: Option<f32>,

    /// Normalized crop rectangle applied last.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop)]
    pub crop: Option<CropRect>,

    /// Output format: png, jpeg, webp, bmp. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Minimum processing time per effect, overriding the config file.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Read settings from this file instead of the user config.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effect catalog as JSON and exit.
    #[arg(long)]
    pub list_effects: bool,
}

impl CliArgs {
    fn adjustments(&self) -> Vec<(AdjustmentKind, f32)> {
        [
            (AdjustmentKind::Brightness, self.brightness),
            (AdjustmentKind::Contrast, self.contrast),
            (AdjustmentKind::Saturation, self.saturation),
            (AdjustmentKind::Hue, self.hue),
            (AdjustmentKind::Blur, self.blur),
        ]
        .into_iter()
        .filter_map(|(kind, value)| value.map(|value| (kind, value)))
        .collect()
    }
}

fn parse_crop(raw: &str) -> Result<CropRect, String> {
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("crop values must be numbers: {err}"))?;
    let &[x, y, width, height] = values.as_slice() else {
        return Err(format!("expected X,Y,W,H but got {} values", values.len()));
    };
    let rect = CropRect::new(x, y, width, height);
    rect.validate().map_err(str::to_string)?;
    Ok(rect)
}

pub fn execute(args: &CliArgs) -> anyhow::Result<()> {
    if args.list_effects {
        let listing = serde_json::to_string_pretty(&Catalog::builtin())
            .context("failed to serialize effect catalog")?;
        println!("{listing}");
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        anyhow::bail!("--input and --output are required");
    };

    let config = settings(args.config.as_deref())?;
    let bytes =
        read_file(input).with_context(|| format!("failed to read {}", input.display()))?;
    let format = resolve_format(args.format.as_deref(), output, &config)?;
    let encoded = process(args, &config, &bytes, format)
        .with_context(|| format!("failed to edit {}", input.display()))?;
    write_file(output, &encoded)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(output = %output.display(), bytes = encoded.len(), ?format, "image written");
    Ok(())
}

/// An explicit `--config` must load cleanly; the user config falls back to
/// defaults.
fn settings(explicit: Option<&Path>) -> AppResult<PhotoolConfig> {
    match explicit {
        Some(path) => Ok(load_config_from(path)?),
        None => Ok(load_config()),
    }
}

fn read_file(path: &Path) -> AppResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    Ok(std::fs::write(path, bytes)?)
}

/// Runs the requested edits on an encoded image and returns the encoded result.
pub fn process(
    args: &CliArgs,
    config: &PhotoolConfig,
    bytes: &[u8],
    format: ExportFormat,
) -> AppResult<Vec<u8>> {
    let mut options: SessionOptions = config.session_options();
    if let Some(delay_ms) = args.delay_ms {
        options.processing_delay = Duration::from_millis(delay_ms);
    }
    let mut session = EditorSession::new(options);
    session.load_encoded(bytes)?;

    for effect_id in &args.effects {
        match session.apply_effect(effect_id, Instant::now())? {
            Dispatched::Processing => {
                if let Some(result) = session.wait_for_effect() {
                    result?;
                }
            }
            Dispatched::CropStarted => {
                tracing::warn!("interactive crop is not available here; use --crop");
                session.cancel_crop();
            }
        }
    }

    let adjustments = args.adjustments();
    if !adjustments.is_empty() {
        let now = Instant::now();
        for (kind, value) in adjustments {
            session.set_adjustment(kind, value, now);
        }
        session.commit_adjustments()?;
    }

    if let Some(rect) = args.crop {
        crop_to(&mut session, rect)?;
    }

    Ok(session.export(format)?)
}

/// Drives a crop selection as a single drag from one corner to the other.
fn crop_to(session: &mut EditorSession, rect: CropRect) -> AppResult<()> {
    if session.apply_effect("crop", Instant::now())? != Dispatched::CropStarted {
        return Err(EditError::CropInactive.into());
    }
    session.crop_pointer_down(rect.x, rect.y)?;
    session.crop_pointer_move(rect.x + rect.width, rect.y + rect.height)?;
    session.crop_pointer_up();
    if let Err(err) = session.commit_crop() {
        session.cancel_crop();
        return Err(err.into());
    }
    Ok(())
}

fn resolve_format(
    requested: Option<&str>,
    output: &Path,
    config: &PhotoolConfig,
) -> AppResult<ExportFormat> {
    if let Some(name) = requested {
        return ExportFormat::from_name(name).ok_or_else(|| AppError::UnknownFormat {
            name: name.to_string(),
        });
    }
    Ok(output
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_name)
        .unwrap_or(config.export_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn parses_full_argument_set() {
        let args = CliArgs::try_parse_from([
            "photool",
            "-i",
            "in.png",
            "-o",
            "out.jpg",
            "--effect",
            "sepia",
            "-e",
            "rotate",
            "--brightness",
            "120",
            "--hue",
            "-30",
            "--crop",
            "0.25,0.25,0.5,0.5",
            "--delay-ms",
            "0",
        ])
        .expect("valid arguments");
        assert_eq!(args.effects, ["sepia", "rotate"]);
        assert_eq!(args.crop, Some(CropRect::new(0.25, 0.25, 0.5, 0.5)));
        assert_eq!(
            args.adjustments(),
            vec![(AdjustmentKind::Brightness, 120.0), (AdjustmentKind::Hue, -30.0)]
        );
    }

    #[test]
    fn input_and_output_are_required_unless_listing() {
        assert!(CliArgs::try_parse_from(["photool", "-i", "in.png"]).is_err());
        let args = CliArgs::try_parse_from(["photool", "--list-effects"]).expect("listing");
        assert!(args.list_effects);
    }

    #[test]
    fn crop_argument_is_validated() {
        assert!(parse_crop("0.9,0,0.2,0.2").is_err());
        assert!(parse_crop("0.1,0.1,0.5").is_err());
        assert!(parse_crop("a,b,c,d").is_err());
        assert_eq!(parse_crop(" 0, 0, 1, 1 "), Ok(CropRect::FULL));
    }

    #[test]
    fn broken_explicit_config_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2").expect("write config");
        assert!(matches!(
            settings(Some(&path)),
            Err(AppError::Config(ConfigError::Parse { .. }))
        ));
        assert!(matches!(
            settings(Some(&dir.path().join("missing.json"))),
            Err(AppError::Config(ConfigError::Read { .. }))
        ));
    }

    #[test]
    fn unreadable_input_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            read_file(&dir.path().join("absent.png")),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn format_resolution_order() {
        let config = PhotoolConfig::default();
        assert_eq!(
            resolve_format(Some("JPEG"), Path::new("x.png"), &config).expect("explicit"),
            ExportFormat::Jpeg
        );
        assert_eq!(
            resolve_format(None, Path::new("x.webp"), &config).expect("extension"),
            ExportFormat::Webp
        );
        assert_eq!(
            resolve_format(None, Path::new("x"), &config).expect("config"),
            ExportFormat::Png
        );
        assert!(matches!(
            resolve_format(Some("tiff"), Path::new("x"), &config),
            Err(AppError::UnknownFormat { .. })
        ));
    }
}
