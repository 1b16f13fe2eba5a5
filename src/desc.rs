// JSON descriptions of detectors and events.
//
// These are the plain-data forms read from disk. They are turned into the
// working types (`geom::Detector`, `depo::Depo`) before anything is rasterized.

use crate::depo::Depo;
use crate::point::{BoundingBox, Point};
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! transparent_newtype_copy {
    ($name:ident($inner:ty)) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

transparent_newtype_copy!(ChannelId(u32));
transparent_newtype_copy!(TrackId(i32));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
    M,
}

impl LengthUnit {
    pub fn value(self) -> f64 {
        match self {
            LengthUnit::Mm => units::MM,
            LengthUnit::Cm => units::CM,
            LengthUnit::M => units::M,
        }
    }
}

// Detector
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorDesc {
    /// Unit of every length in this description.
    #[serde(default)]
    pub units: LengthUnit,
    pub anodes: Vec<AnodeDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnodeDesc {
    pub ident: u32,
    pub faces: Vec<FaceDesc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceDesc {
    pub sensitive: BoundingBox,
    pub planes: Vec<PlaneDesc>,
}

/// One wire plane. Wire `i` sits at pitch coordinate
/// `first_wire_pitch + i * pitch` measured along `pitch_dir` from `origin`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaneDesc {
    /// Readout plane index (0, 1, 2 for U, V, W). Absent for planes that are
    /// not read out.
    #[serde(default)]
    pub index: Option<usize>,
    pub origin: Point,
    pub pitch_dir: Point,
    pub pitch: f64,
    #[serde(default)]
    pub first_wire_pitch: f64,
    pub nwires: usize,
    /// Channel of wire 0; wires map to consecutive channels.
    #[serde(default)]
    pub first_channel: u32,
    /// Explicit per-wire channels, overriding `first_channel` when present.
    #[serde(default)]
    pub channels: Option<Vec<u32>>,
}

pub fn parse_detector_json(json_text: &str) -> Result<DetectorDesc, serde_json::Error> {
    serde_json::from_str(json_text)
}

// Events
// -----------------------------------------------------------------------------

/// A transport step: one energy deposit along a particle's trajectory, as the
/// upstream simulation writes it. Lengths, times and energies are in the units
/// named by the source configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepDesc {
    pub start: Point,
    pub end: Point,
    pub start_time: f64,
    #[serde(default)]
    pub end_time: Option<f64>,
    pub num_electrons: f64,
    #[serde(default)]
    pub energy: f64,
    pub track_id: i32,
    #[serde(default)]
    pub pdg: i32,
}

impl StepDesc {
    pub fn mid_point(&self) -> Point {
        (self.start + self.end) * 0.5
    }

    pub fn mid_time(&self) -> f64 {
        match self.end_time {
            Some(end) => 0.5 * (self.start_time + end),
            None => self.start_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDesc {
    pub id: u64,
    /// Depositions already drifted to the readout, in internal units.
    #[serde(default)]
    pub depos: Vec<Depo>,
    /// Raw transport steps, converted by the deposition source.
    #[serde(default)]
    pub steps: Vec<StepDesc>,
    /// Earlier-stage steps associated 1:1 with `steps`.
    #[serde(default)]
    pub prior_steps: Option<Vec<StepDesc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsDesc {
    pub events: Vec<EventDesc>,
}

pub fn parse_events_json(json_text: &str) -> Result<EventsDesc, serde_json::Error> {
    serde_json::from_str(json_text)
}
