use crate::accum::SimChannel;
use crate::config::{ExtraSigma, PlaneConfig, SinkConfig};
use crate::desc::{AnodeDesc, ChannelId, DetectorDesc, FaceDesc, LengthUnit, PlaneDesc};
use crate::geom::Detector;
use crate::point::{BoundingBox, Point};

pub const U_FIRST_CHANNEL: u32 = 0;
pub const V_FIRST_CHANNEL: u32 = 1000;
pub const W_FIRST_CHANNEL: u32 = 2000;

fn stub_plane_desc(index: usize, pitch_dir: Point, first_wire_pitch: f64, nwires: usize, first_channel: u32) -> PlaneDesc {
    PlaneDesc {
        index: Some(index),
        origin: Point::default(),
        pitch_dir,
        pitch: 5.0,
        first_wire_pitch,
        nwires,
        first_channel,
        channels: None,
    }
}

/// One anode with one face covering x in [0, 1000], y in [-500, 500] and
/// z in [0, 2000] mm. U and V are at +-60 degrees, W measures z directly.
/// All planes have a 5 mm pitch.
pub fn three_plane_detector() -> Detector {
    let c60 = 0.5;
    let s60 = 3.0_f64.sqrt() / 2.0;
    let desc = DetectorDesc {
        units: LengthUnit::Mm,
        anodes: vec![AnodeDesc {
            ident: 0,
            faces: vec![FaceDesc {
                sensitive: BoundingBox::from_corners(
                    Point::new(0.0, -500.0, 0.0),
                    Point::new(1000.0, 500.0, 2000.0),
                ),
                planes: vec![
                    stub_plane_desc(0, Point::new(0.0, c60, s60), -300.0, 500, U_FIRST_CHANNEL),
                    stub_plane_desc(1, Point::new(0.0, -c60, s60), -300.0, 500, V_FIRST_CHANNEL),
                    stub_plane_desc(2, Point::new(0.0, 0.0, 1.0), 0.0, 401, W_FIRST_CHANNEL),
                ],
            }],
        }],
    };
    Detector::from_desc(&desc).unwrap()
}

/// 100 ticks of 500 ns starting at t=0, drifting at 1.6 mm/us, with the
/// planes 0, 4 and 8 mm from the response plane.
pub fn test_config() -> SinkConfig {
    SinkConfig {
        start_time: 0.0,
        readout_time: 50_000.0,
        tick: Some(500.0),
        nsigma: 3.0,
        drift_speed: Some(0.0016),
        reference_time: 0.0,
        use_energy: false,
        default_energy: 100.0,
        extra_sigma: ExtraSigma::default(),
        output_label: "testSC".to_string(),
        output_length_unit: LengthUnit::Cm,
        planes: vec![
            PlaneConfig::new(0.0, 0.402993 * 0.3),
            PlaneConfig::new(4.0, 0.402993 * 0.5),
            PlaneConfig::new(8.0, 0.188060 * 0.2),
        ],
    }
}

pub fn plane_of_channel(channel: ChannelId) -> usize {
    match channel.0 {
        c if c < V_FIRST_CHANNEL => 0,
        c if c < W_FIRST_CHANNEL => 1,
        _ => 2,
    }
}

pub fn total_on_plane(records: &[SimChannel], iplane: usize) -> f64 {
    records
        .iter()
        .filter(|sc| plane_of_channel(sc.channel) == iplane)
        .map(|sc| sc.total_charge())
        .sum()
}
