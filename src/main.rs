use clap::Parser;
use serde::Serialize;
use simchan::accum::SimChannel;
use simchan::config::parse_config_json;
use simchan::desc::parse_events_json;
use simchan::error::{ConfigError, Result};
use simchan::geom::Detector;
use simchan::sink::SimChannelSink;
use simchan::source::DepoSource;
use std::path::PathBuf;
use tracing::{info, warn};

const DEMO_CONFIG_JSON: &str = r#"
    {
        "sink": {
            "start_time": 0,
            "readout_time": 100000,
            "tick": 500,
            "drift_speed": 0.0016,
            "reference_time": 0,
            "extra_sigma": { "enabled": true }
        },
        "source": {
            "length_unit": "cm",
            "time_unit": "ns"
        }
    }
"#;

const DEMO_DETECTOR_JSON: &str = r#"
    {
        "units": "mm",
        "anodes": [
            {
                "ident": 0,
                "faces": [
                    {
                        "sensitive": { "min": [0, -500, 0], "max": [1000, 500, 2000] },
                        "planes": [
                            {
                                "index": 0,
                                "origin": [0, 0, 0],
                                "pitch_dir": [0, 0.5, 0.8660254],
                                "pitch": 3,
                                "first_wire_pitch": -300,
                                "nwires": 800,
                                "first_channel": 0
                            },
                            {
                                "index": 1,
                                "origin": [0, 0, 0],
                                "pitch_dir": [0, -0.5, 0.8660254],
                                "pitch": 3,
                                "first_wire_pitch": -300,
                                "nwires": 800,
                                "first_channel": 800
                            },
                            {
                                "index": 2,
                                "origin": [0, 0, 0],
                                "pitch_dir": [0, 0, 1],
                                "pitch": 3,
                                "nwires": 667,
                                "first_channel": 1600
                            }
                        ]
                    }
                ]
            }
        ]
    }
"#;

const DEMO_EVENTS_JSON: &str = r#"
    {
        "events": [
            {
                "id": 1,
                "steps": [
                    { "start": [20.0, 0.0, 30.0], "end": [20.5, 0.2, 30.6], "start_time": 100, "num_electrons": 60000, "energy": 2.1, "track_id": 1, "pdg": 13 },
                    { "start": [20.5, 0.2, 30.6], "end": [21.0, 0.4, 31.2], "start_time": 102, "num_electrons": 58000, "energy": 2.0, "track_id": 1, "pdg": 13 },
                    { "start": [21.0, 0.4, 31.2], "end": [21.5, 0.6, 31.8], "start_time": 104, "num_electrons": 61000, "energy": 2.2, "track_id": 1, "pdg": 13 },
                    { "start": [40.0, -10.0, 90.0], "end": [40.1, -10.1, 90.1], "start_time": 50, "num_electrons": 9000, "energy": 0.3, "track_id": 7, "pdg": 11 }
                ]
            },
            {
                "id": 2,
                "depos": [
                    { "pos": [300, 25, 1200], "time": 20000, "charge": -40000, "extent_long": 1.2, "extent_tran": 1.5, "id": 3, "pdg": 2212, "energy": 4.0 },
                    { "pos": [305, 25, 1203], "time": 20100, "charge": -35000, "extent_long": 1.2, "extent_tran": 1.5, "id": 3, "pdg": 2212, "energy": 3.5 }
                ]
            }
        ]
    }
"#;

#[derive(Parser)]
#[command(name = "simchan")]
#[command(about = "Rasterize ionization depositions into per-channel charge records")]
struct Cli {
    /// Job configuration JSON with "sink" and optional "source" sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detector description JSON
    #[arg(short, long)]
    detector: Option<PathBuf>,

    /// Events JSON
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Write records here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write one PNG charge frame per event into this directory
    #[cfg(feature = "im-io")]
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Use the built-in demo for any input not given on the command line
    #[arg(long)]
    demo: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct EventOutput {
    id: u64,
    channels: Vec<SimChannel>,
}

#[derive(Serialize)]
struct JobOutput {
    label: String,
    events: Vec<EventOutput>,
}

fn read_input(path: &Option<PathBuf>, demo: bool, demo_text: &str, what: &'static str) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None if demo => Ok(demo_text.to_string()),
        None => Err(ConfigError::Missing(what).into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let job = parse_config_json(&read_input(&cli.config, cli.demo, DEMO_CONFIG_JSON, "config")?)?;
    let units = job.source.resolve()?;
    let detector = Detector::from_json(&read_input(&cli.detector, cli.demo, DEMO_DETECTOR_JSON, "detector")?)?;
    let events = parse_events_json(&read_input(&cli.events, cli.demo, DEMO_EVENTS_JSON, "events")?)?;

    let mut sink = SimChannelSink::new(&detector, &job.sink)?;

    #[cfg(feature = "im-io")]
    if let Some(dir) = &cli.png_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut out = JobOutput {
        label: job.sink.output_label.clone(),
        events: Vec::with_capacity(events.events.len()),
    };

    for event in &events.events {
        let mut source = match DepoSource::from_event(event, &units) {
            Ok(source) => source,
            Err(err) => {
                warn!(event = event.id, %err, "skipping event");
                continue;
            }
        };
        if let Err(err) = sink.consume(&mut source) {
            warn!(event = event.id, %err, "skipping event");
            continue;
        }

        let records = sink.visit();
        let nides: usize = records.channels.iter().map(|sc| sc.ides.len()).sum();
        info!(event = event.id, nchannels = records.channels.len(), nides, "event done");

        #[cfg(feature = "im-io")]
        if let Some(dir) = &cli.png_dir {
            if let Some(frame) = simchan::im::ChargeFrame::from_channels(&records.channels) {
                let path = dir.join(format!("event_{}.png", event.id));
                frame.save_png(&path)?;
                info!(path = %path.display(), nchannels = frame.channels.len(), nticks = frame.nticks(), "frame written");
            }
        }

        out.events.push(EventOutput {
            id: event.id,
            channels: records.channels,
        });
    }

    let json = serde_json::to_string_pretty(&out)?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
