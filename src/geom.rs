// Detector geometry as the rasterizer sees it.
//
// The traits are the read-only view the rasterizer consumes. `Detector` is a
// plain implementation built from a `DetectorDesc`; hosts with their own
// geometry service implement the traits instead.

use crate::binning::Binning;
use crate::desc::{ChannelId, DetectorDesc, PlaneDesc};
use crate::error::ConfigError;
use crate::point::{BoundingBox, Point};

pub trait WirePlane {
    /// Readout plane index, `None` for planes that are not read out.
    fn index(&self) -> Option<usize>;

    /// Pitch coordinate of `pt`, measured on the same axis as `region_binning`.
    fn pitch_distance(&self, pt: &Point) -> f64;

    /// One bin per wire; wire `i` is centered on bin `i`.
    fn region_binning(&self) -> Binning;

    fn nwires(&self) -> usize;

    fn channel(&self, wire_index: usize) -> Option<ChannelId>;
}

pub trait SensitiveFace {
    type Plane: WirePlane;

    fn contains(&self, pt: &Point) -> bool;

    fn planes(&self) -> &[Self::Plane];
}

pub trait Geometry {
    type Face: SensitiveFace;

    fn faces(&self) -> impl Iterator<Item = &Self::Face>;

    /// Every sensitive face whose volume holds `pt`. Faces may overlap, so
    /// more than one can be returned.
    fn faces_containing<'a>(&'a self, pt: &'a Point) -> impl Iterator<Item = &'a Self::Face> {
        self.faces().filter(move |face| face.contains(pt))
    }
}

// Concrete detector
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub index: usize,
    pub channel: ChannelId,
}

/// Pitch-axis positioning of a plane: where pitch zero is and which way it
/// points.
#[derive(Debug, Clone, PartialEq)]
pub struct Pimpos {
    pub origin: Point,
    pub pitch_dir: Point,
    pub region: Binning,
}

impl Pimpos {
    #[inline]
    pub fn distance(&self, pt: &Point) -> f64 {
        (*pt - self.origin).dot(&self.pitch_dir)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub index: Option<usize>,
    pub pimpos: Pimpos,
    pub wires: Vec<Wire>,
}

impl Plane {
    fn from_desc(desc: &PlaneDesc, unit: f64) -> Result<Self, ConfigError> {
        if desc.nwires == 0 {
            return Err(ConfigError::BadPlane("plane has no wires".to_string()));
        }
        if !(desc.pitch > 0.0 && desc.pitch.is_finite()) {
            return Err(ConfigError::BadPlane(format!("bad wire pitch {}", desc.pitch)));
        }
        let pitch_dir = desc
            .pitch_dir
            .norm()
            .ok_or_else(|| ConfigError::BadPlane("zero pitch direction".to_string()))?;

        let channels: Vec<u32> = match &desc.channels {
            Some(chans) => {
                if chans.len() != desc.nwires {
                    return Err(ConfigError::BadPlane(format!(
                        "{} channels for {} wires",
                        chans.len(),
                        desc.nwires
                    )));
                }
                chans.clone()
            }
            None => (0..desc.nwires as u32).map(|i| desc.first_channel + i).collect(),
        };

        let wires = channels
            .into_iter()
            .enumerate()
            .map(|(index, ch)| Wire {
                index,
                channel: ChannelId(ch),
            })
            .collect();

        let pitch = desc.pitch * unit;
        let first = desc.first_wire_pitch * unit;
        let region = Binning::new(
            desc.nwires,
            first - 0.5 * pitch,
            first + (desc.nwires as f64 - 0.5) * pitch,
        );

        Ok(Self {
            index: desc.index,
            pimpos: Pimpos {
                origin: desc.origin * unit,
                pitch_dir,
                region,
            },
            wires,
        })
    }
}

impl WirePlane for Plane {
    fn index(&self) -> Option<usize> {
        self.index
    }

    fn pitch_distance(&self, pt: &Point) -> f64 {
        self.pimpos.distance(pt)
    }

    fn region_binning(&self) -> Binning {
        self.pimpos.region
    }

    fn nwires(&self) -> usize {
        self.wires.len()
    }

    fn channel(&self, wire_index: usize) -> Option<ChannelId> {
        self.wires.get(wire_index).map(|w| w.channel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub sensitive: BoundingBox,
    pub planes: Vec<Plane>,
}

impl SensitiveFace for Face {
    type Plane = Plane;

    fn contains(&self, pt: &Point) -> bool {
        self.sensitive.inside(pt)
    }

    fn planes(&self) -> &[Plane] {
        &self.planes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anode {
    pub ident: u32,
    pub faces: Vec<Face>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    pub anodes: Vec<Anode>,
}

impl Detector {
    pub fn from_desc(desc: &DetectorDesc) -> Result<Self, ConfigError> {
        let unit = desc.units.value();
        let mut anodes = Vec::with_capacity(desc.anodes.len());
        for anode_desc in &desc.anodes {
            let mut faces = Vec::with_capacity(anode_desc.faces.len());
            for face_desc in &anode_desc.faces {
                let planes = face_desc
                    .planes
                    .iter()
                    .map(|pd| Plane::from_desc(pd, unit))
                    .collect::<Result<Vec<_>, _>>()?;
                let sensitive = BoundingBox::from_corners(
                    face_desc.sensitive.min * unit,
                    face_desc.sensitive.max * unit,
                );
                faces.push(Face { sensitive, planes });
            }
            anodes.push(Anode {
                ident: anode_desc.ident,
                faces,
            });
        }

        let detector = Self { anodes };
        if detector.faces().next().is_none() {
            return Err(ConfigError::NoFaces);
        }
        Ok(detector)
    }

    pub fn from_json(json_text: &str) -> Result<Self, ConfigError> {
        let desc = crate::desc::parse_detector_json(json_text)?;
        Self::from_desc(&desc)
    }
}

impl Geometry for Detector {
    type Face = Face;

    fn faces(&self) -> impl Iterator<Item = &Face> {
        self.anodes.iter().flat_map(|a| a.faces.iter())
    }
}
