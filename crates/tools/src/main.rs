use std::fs;
use std::path::{Path, PathBuf};

use capture::ShapeKind;
use clap::{Args, Parser, Subcommand};
use formats::{GeoJsonOutput, NormalizedGeometry};
use foundation::RawPoint;
use runtime::{Orchestrator, PlaybackConfig, RecordingRenderer, Renderer, RuntimeError};
use track::RawTrack;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flight track sampling and shape capture tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample an upload payload and print the cleaned track and clock window
    Track {
        /// Upload response (bare track object or GeoJSON FeatureCollection)
        payload: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,

        /// Also report the playback clock and the interpolated position this
        /// many wall-clock seconds into playback
        #[arg(long)]
        elapsed: Option<f64>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run playback against a headless renderer that logs every call
    Play {
        payload: PathBuf,

        #[command(flatten)]
        playback: PlaybackArgs,
    },

    /// Show the first uploaded feature as static geometry
    Show { payload: PathBuf },

    /// Replay a capture script and print the normalized GeoJSON
    Draw {
        /// JSON array of steps: {"add": [lon, lat, alt]}, {"preview": [...]},
        /// {"kind": "polygon"}, "finish", "cancel"
        script: PathBuf,

        /// line or polygon
        #[arg(long, default_value = "line")]
        kind: ShapeKind,

        /// Emit bare features instead of one-feature collections
        #[arg(long)]
        feature: bool,

        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug, Default)]
struct PlaybackArgs {
    /// JSON config file (start_index, jump_threshold, multiplier)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip this many leading samples
    #[arg(long)]
    start_index: Option<usize>,

    /// Maximum longitude jump between accepted samples, degrees
    #[arg(long)]
    jump_threshold: Option<f64>,

    /// Playback speed multiplier
    #[arg(long)]
    multiplier: Option<f64>,
}

impl PlaybackArgs {
    /// defaults < config file < FLIGHT_* env < flags
    fn resolve(&self) -> Result<PlaybackConfig, RuntimeError> {
        let base = match &self.config {
            Some(path) => PlaybackConfig::from_json_file(path)?,
            None => PlaybackConfig::default(),
        };
        let mut config = base.with_env()?;
        if let Some(v) = self.start_index {
            config.start_index = v;
        }
        if let Some(v) = self.jump_threshold {
            config.jump_threshold = v;
        }
        if let Some(v) = self.multiplier {
            config.multiplier = v;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Add([f64; 3]),
    Preview([f64; 3]),
    Kind(ShapeKindName),
    Finish,
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ShapeKindName {
    Line,
    Polygon,
}

impl From<ShapeKindName> for ShapeKind {
    fn from(k: ShapeKindName) -> Self {
        match k {
            ShapeKindName::Line => ShapeKind::Line,
            ShapeKindName::Polygon => ShapeKind::Polygon,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Track {
            payload,
            playback,
            elapsed,
            pretty,
        } => cmd_track(&payload, &playback.resolve()?, elapsed, pretty),
        Command::Play { payload, playback } => cmd_play(&payload, playback.resolve()?),
        Command::Show { payload } => cmd_show(&payload),
        Command::Draw {
            script,
            kind,
            feature,
            pretty,
        } => {
            let output = if feature {
                GeoJsonOutput::Feature
            } else {
                GeoJsonOutput::FeatureCollection
            };
            cmd_draw(&script, kind, output, pretty)
        }
    }
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&read_text(path)?)?)
}

fn print_json(value: &Value, pretty: bool) -> Result<(), serde_json::Error> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn cmd_track(
    path: &Path,
    config: &PlaybackConfig,
    elapsed: Option<f64>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = formats::parse_upload_str(&read_text(path)?)?;
    print_json(&track_report(&raw, config, elapsed)?, pretty)?;
    Ok(())
}

/// Sampled track, its clock window and, when `elapsed` is given, where
/// playback stands after that many wall-clock seconds.
fn track_report(
    raw: &RawTrack,
    config: &PlaybackConfig,
    elapsed: Option<f64>,
) -> Result<Value, RuntimeError> {
    let sampled = track::sample(raw, config.start_index, config.jump_threshold)?;
    let dropped = raw.len().saturating_sub(config.start_index) - sampled.len();
    info!(raw = raw.len(), sampled = sampled.len(), "sampled upload");

    let window = if sampled.is_empty() {
        None
    } else {
        Some(track::compute_window(&sampled, config.multiplier)?)
    };

    let at = match (window, elapsed) {
        (Some(w), Some(secs)) => {
            let clock = w.clock_at(secs);
            json!({
                "elapsed_s": secs,
                "clock": clock.to_rfc3339(),
                "position": sampled.position_at(clock).map(RawPoint::as_array),
            })
        }
        _ => Value::Null,
    };

    let window = window.map(|w| {
        json!({
            "start": w.start.to_rfc3339(),
            "stop": w.stop.to_rfc3339(),
            "multiplier": w.multiplier,
            "duration_s": w.duration_s(),
        })
    });

    let samples: Vec<Value> = sampled
        .samples()
        .iter()
        .map(|s| {
            json!({
                "time": s.timestamp.to_rfc3339(),
                "position": s.position.as_array(),
            })
        })
        .collect();

    Ok(json!({
        "raw_len": raw.len(),
        "dropped": dropped,
        "window": window,
        "at": at,
        "samples": samples,
    }))
}

fn cmd_play(path: &Path, config: PlaybackConfig) -> Result<(), Box<dyn std::error::Error>> {
    let payload = read_json(path)?;
    let mut orch = Orchestrator::new(RecordingRenderer::new(), config);
    match orch.play_payload(&payload)? {
        Some(window) => eprintln!(
            "playing {} -> {} at {}x ({} renderer calls)",
            window.start.to_rfc3339(),
            window.stop.to_rfc3339(),
            window.multiplier,
            orch.renderer().calls().len()
        ),
        None => eprintln!("nothing to play"),
    }
    Ok(())
}

fn cmd_show(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let payload = read_json(path)?;
    let mut orch = Orchestrator::new(RecordingRenderer::new(), PlaybackConfig::default());
    let entity = orch.show_payload(&payload)?;
    eprintln!(
        "showing entity {} ({} entities live)",
        entity.0,
        orch.renderer().live_entities().len()
    );
    Ok(())
}

fn cmd_draw(
    path: &Path,
    kind: ShapeKind,
    output: GeoJsonOutput,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let steps: Vec<Step> = serde_json::from_value(read_json(path)?)?;
    let mut orch = Orchestrator::new(RecordingRenderer::new(), PlaybackConfig::default());
    let shapes = replay(&mut orch, kind, output, &steps)?;
    if shapes.is_empty() {
        eprintln!("script finished no shapes");
    }
    for shape in &shapes {
        let out = if pretty {
            shape.to_geojson_string_pretty()?
        } else {
            shape.to_geojson_string()?
        };
        println!("{out}");
    }
    Ok(())
}

/// Runs `steps` through one drawing session; returns the GeoJSON of every
/// finished shape in order.
fn replay<R: Renderer>(
    orch: &mut Orchestrator<R>,
    kind: ShapeKind,
    output: GeoJsonOutput,
    steps: &[Step],
) -> Result<Vec<NormalizedGeometry>, RuntimeError> {
    let mut session = orch.begin_drawing(kind, output);
    let mut shapes = Vec::new();
    for step in steps {
        match step {
            Step::Add(p) => session.add_point(RawPoint::from_array(*p)),
            Step::Preview(p) => {
                session.move_preview(RawPoint::from_array(*p));
            }
            Step::Kind(k) => {
                session.set_kind((*k).into());
            }
            Step::Finish => {
                if let Some(finished) = session.finish()? {
                    shapes.push(finished.geojson);
                }
            }
            Step::Cancel => {
                session.cancel();
            }
        }
    }
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::{PlaybackArgs, Step, replay, track_report};
    use capture::ShapeKind;
    use formats::GeoJsonOutput;
    use foundation::RawPoint;
    use runtime::{ConfigError, Orchestrator, PlaybackConfig, RecordingRenderer, RuntimeError};
    use serde_json::json;
    use track::RawTrack;

    #[test]
    fn parses_script_steps() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"add": [1.0, 2.0, 0.0]},
            {"preview": [1.5, 2.0, 0.0]},
            {"kind": "polygon"},
            "finish",
            "cancel"
        ]))
        .unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step::Add([1.0, 2.0, 0.0]));
        assert_eq!(steps[3], Step::Finish);
    }

    #[test]
    fn replay_drops_preview_and_closes_polygon() {
        let steps: Vec<Step> = serde_json::from_value(json!([
            {"kind": "polygon"},
            {"add": [0.0, 0.0, 0.0]},
            {"add": [1.0, 0.0, 0.0]},
            {"add": [1.0, 1.0, 0.0]},
            {"preview": [9.0, 9.0, 0.0]},
            "finish",
            "finish"
        ]))
        .unwrap();
        let mut orch = Orchestrator::new(RecordingRenderer::new(), PlaybackConfig::default());
        let shapes = replay(&mut orch, ShapeKind::Line, GeoJsonOutput::Feature, &steps);
        let shapes = shapes.unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(
            serde_json::to_value(&shapes[0]).unwrap()["geometry"]["coordinates"],
            json!([[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 0.0]]])
        );
    }

    #[test]
    fn flags_override_defaults() {
        let args = PlaybackArgs {
            start_index: Some(0),
            multiplier: Some(1.0),
            ..PlaybackArgs::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.start_index, 0);
        assert_eq!(config.multiplier, 1.0);
    }

    #[test]
    fn unreadable_config_file_is_a_config_error() {
        let args = PlaybackArgs {
            config: Some("/nonexistent/flightview.json".into()),
            ..PlaybackArgs::default()
        };
        assert!(matches!(
            args.resolve(),
            Err(RuntimeError::Config(ConfigError::Io(_)))
        ));
    }

    #[test]
    fn report_locates_playback_after_elapsed_wall_time() {
        let raw = RawTrack::new(
            vec![
                RawPoint::new(10.0, 20.0, 100.0),
                RawPoint::new(10.004, 20.0, 300.0),
            ],
            vec![
                "2022-05-01T09:00:00Z".to_string(),
                "2022-05-01T09:00:20Z".to_string(),
            ],
        );
        let config = PlaybackConfig {
            start_index: 0,
            ..PlaybackConfig::default()
        };

        // 2 s of wall time at 5x is 10 s of track time, half way along.
        let report = track_report(&raw, &config, Some(2.0)).unwrap();
        assert_eq!(report["dropped"], json!(0));
        assert_eq!(report["window"]["duration_s"], json!(20.0));
        assert_eq!(report["at"]["clock"], json!("2022-05-01T09:00:10+00:00"));
        let position = report["at"]["position"].as_array().unwrap();
        assert!((position[0].as_f64().unwrap() - 10.002).abs() < 1e-9);
        assert_eq!(position[2], json!(200.0));

        let report = track_report(&raw, &config, None).unwrap();
        assert!(report["at"].is_null());
    }
}
