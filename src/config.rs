// Run configuration.
//
// Every time is in ns and every length in mm unless the field says otherwise
// (see `units`). `drift_speed` and `tick` have no defaults: a run without them
// is refused.

use crate::binning::Binning;
use crate::desc::LengthUnit;
use crate::error::ConfigError;
use crate::units::{MM, MS, US};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub sink: SinkConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

pub fn parse_config_json(json_text: &str) -> Result<JobConfig, ConfigError> {
    Ok(serde_json::from_str(json_text)?)
}

/// Extra Gaussian smearing added in quadrature to each deposition's extents,
/// for point-like depositions that would otherwise be under-resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtraSigma {
    #[serde(default)]
    pub enabled: bool,
    /// Drift-axis smearing in units of (drift distance per us).
    #[serde(default = "default_time_factor")]
    pub time_factor: f64,
}

impl Default for ExtraSigma {
    fn default() -> Self {
        Self {
            enabled: false,
            time_factor: default_time_factor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaneConfig {
    /// Distance from this plane to the response plane along the drift axis.
    pub to_rp: f64,
    #[serde(default)]
    pub time_offset: f64,
    /// Drift-axis shift applied to stored positions. Defaults to `to_rp`.
    #[serde(default)]
    pub standoff: Option<f64>,
    /// Extra pitch smearing as a fraction of the wire pitch.
    #[serde(default)]
    pub extra_pitch_fraction: f64,
}

impl PlaneConfig {
    pub fn new(to_rp: f64, extra_pitch_fraction: f64) -> Self {
        Self {
            to_rp,
            time_offset: 0.0,
            standoff: None,
            extra_pitch_fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SinkConfig {
    #[serde(default = "default_start_time")]
    pub start_time: f64,
    #[serde(default = "default_readout_time")]
    pub readout_time: f64,
    #[serde(default)]
    pub tick: Option<f64>,
    #[serde(default = "default_nsigma")]
    pub nsigma: f64,
    #[serde(default)]
    pub drift_speed: Option<f64>,
    /// Time that maps to tick zero.
    #[serde(default = "default_reference_time", alias = "g4_ref_time")]
    pub reference_time: f64,
    #[serde(default)]
    pub use_energy: bool,
    /// Energy stored per deposition when `use_energy` is off.
    #[serde(default = "default_energy")]
    pub default_energy: f64,
    #[serde(default)]
    pub extra_sigma: ExtraSigma,
    #[serde(default = "default_output_label")]
    pub output_label: String,
    /// Unit of the positions written to the output records.
    #[serde(default = "default_output_length_unit")]
    pub output_length_unit: LengthUnit,
    /// Per readout plane, indexed by plane index.
    #[serde(default = "default_planes")]
    pub planes: Vec<PlaneConfig>,
}

fn default_start_time() -> f64 {
    -1.6 * MS
}
fn default_readout_time() -> f64 {
    4.8 * MS
}
fn default_nsigma() -> f64 {
    3.0
}
fn default_reference_time() -> f64 {
    -4050.0 * US
}
fn default_energy() -> f64 {
    100.0
}
fn default_time_factor() -> f64 {
    1.428249
}
fn default_output_label() -> String {
    "simpleSC".to_string()
}
fn default_output_length_unit() -> LengthUnit {
    LengthUnit::Cm
}
fn default_planes() -> Vec<PlaneConfig> {
    vec![
        PlaneConfig::new(94.0 * MM, 0.402993 * 0.3),
        PlaneConfig::new(97.0 * MM, 0.402993 * 0.5),
        PlaneConfig::new(100.0 * MM, 0.188060 * 0.2),
    ]
}

impl SinkConfig {
    /// MicroBooNE-like settings with every required value filled in.
    pub fn uboone() -> Self {
        Self {
            start_time: default_start_time(),
            readout_time: default_readout_time(),
            tick: Some(0.5 * US),
            nsigma: default_nsigma(),
            drift_speed: Some(1.098 * MM / US),
            reference_time: default_reference_time(),
            use_energy: false,
            default_energy: default_energy(),
            extra_sigma: ExtraSigma::default(),
            output_label: default_output_label(),
            output_length_unit: default_output_length_unit(),
            planes: default_planes(),
        }
    }

    pub fn validate(&self) -> Result<SinkParams, ConfigError> {
        let tick = self.tick.ok_or(ConfigError::Missing("tick"))?;
        let drift_speed = self.drift_speed.ok_or(ConfigError::Missing("drift_speed"))?;

        positive("tick", tick)?;
        positive("drift_speed", drift_speed)?;
        positive("readout_time", self.readout_time)?;
        positive("nsigma", self.nsigma)?;
        finite("start_time", self.start_time)?;
        finite("reference_time", self.reference_time)?;
        finite("default_energy", self.default_energy)?;
        if !(self.extra_sigma.time_factor >= 0.0 && self.extra_sigma.time_factor.is_finite()) {
            return Err(ConfigError::Invalid {
                name: "extra_sigma.time_factor",
                value: self.extra_sigma.time_factor,
            });
        }

        // Partial trailing ticks are not read out.
        let ratio = self.readout_time / tick;
        if !(ratio >= 1.0 && ratio < i64::MAX as f64) {
            return Err(ConfigError::Invalid {
                name: "readout_time",
                value: self.readout_time,
            });
        }
        let nticks = ratio as usize;

        let mut planes = Vec::with_capacity(self.planes.len());
        for pc in &self.planes {
            finite("to_rp", pc.to_rp)?;
            finite("time_offset", pc.time_offset)?;
            let standoff = pc.standoff.unwrap_or(pc.to_rp);
            finite("standoff", standoff)?;
            if !(pc.extra_pitch_fraction >= 0.0 && pc.extra_pitch_fraction.is_finite()) {
                return Err(ConfigError::Invalid {
                    name: "extra_pitch_fraction",
                    value: pc.extra_pitch_fraction,
                });
            }
            planes.push(PlaneParams {
                prop_offset: pc.to_rp / drift_speed + pc.time_offset,
                standoff,
                extra_pitch_fraction: pc.extra_pitch_fraction,
            });
        }

        let extra_sigma_long = if self.extra_sigma.enabled {
            Some(self.extra_sigma.time_factor * drift_speed * US)
        } else {
            None
        };

        Ok(SinkParams {
            tbins: Binning::new(nticks, self.start_time, self.start_time + self.readout_time),
            tick,
            nsigma: self.nsigma,
            drift_speed,
            reference_time: self.reference_time,
            use_energy: self.use_energy,
            default_energy: self.default_energy,
            extra_sigma_long,
            output_length_unit: self.output_length_unit.value(),
            planes,
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { name, value })
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid { name, value })
    }
}

/// Per-plane values derived from `PlaneConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneParams {
    /// Time from this plane to the response plane plus the fixed offset.
    pub prop_offset: f64,
    pub standoff: f64,
    pub extra_pitch_fraction: f64,
}

/// Checked, derived form of `SinkConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkParams {
    pub tbins: Binning,
    pub tick: f64,
    pub nsigma: f64,
    pub drift_speed: f64,
    pub reference_time: f64,
    pub use_energy: bool,
    pub default_energy: f64,
    /// Drift-axis smearing length added in quadrature, when enabled.
    pub extra_sigma_long: Option<f64>,
    pub output_length_unit: f64,
    pub planes: Vec<PlaneParams>,
}

// Source
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    /// Multiplies the number of electrons of a step to give depo charge.
    /// Negative by default: drifting electrons carry negative charge.
    #[serde(default = "default_charge_scale")]
    pub charge_scale: f64,
    #[serde(default = "default_length_unit")]
    pub length_unit: String,
    #[serde(default = "default_time_unit")]
    pub time_unit: String,
    #[serde(default = "default_energy_unit")]
    pub energy_unit: String,
}

fn default_charge_scale() -> f64 {
    -1.0
}
fn default_length_unit() -> String {
    "cm".to_string()
}
fn default_time_unit() -> String {
    "ns".to_string()
}
fn default_energy_unit() -> String {
    "MeV".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            charge_scale: default_charge_scale(),
            length_unit: default_length_unit(),
            time_unit: default_time_unit(),
            energy_unit: default_energy_unit(),
        }
    }
}

/// Unit multipliers resolved from `SourceConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceUnits {
    pub charge_scale: f64,
    pub length: f64,
    pub time: f64,
    pub energy: f64,
}

impl SourceConfig {
    pub fn resolve(&self) -> Result<SourceUnits, ConfigError> {
        finite("charge_scale", self.charge_scale)?;
        let unit = |name: &str| {
            crate::units::by_name(name).ok_or_else(|| ConfigError::UnknownUnit(name.to_string()))
        };
        Ok(SourceUnits {
            charge_scale: self.charge_scale,
            length: unit(&self.length_unit)?,
            time: unit(&self.time_unit)?,
            energy: unit(&self.energy_unit)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn missing_drift_speed_is_fatal() {
        let cfg = parse_config_json(r#"{"sink": {"tick": 500}}"#).unwrap();
        assert!(matches!(
            cfg.sink.validate(),
            Err(ConfigError::Missing("drift_speed"))
        ));
    }

    #[test]
    fn missing_tick_is_fatal() {
        let cfg = parse_config_json(r#"{"sink": {"drift_speed": 0.0016}}"#).unwrap();
        assert!(matches!(cfg.sink.validate(), Err(ConfigError::Missing("tick"))));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let mut cfg = SinkConfig::uboone();
        cfg.nsigma = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { name: "nsigma", .. })
        ));

        let mut cfg = SinkConfig::uboone();
        cfg.drift_speed = Some(-1.0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { name: "drift_speed", .. })
        ));
    }

    #[test]
    fn defaults_fill_the_rest() {
        let cfg = parse_config_json(
            r#"{"sink": {"tick": 500, "drift_speed": 0.001098, "g4_ref_time": -250000}}"#,
        )
        .unwrap();
        assert_eq!(cfg.sink.nsigma, 3.0);
        assert_eq!(cfg.sink.reference_time, -250.0 * US);
        assert_eq!(cfg.sink.planes.len(), 3);
        assert_eq!(cfg.sink.output_label, "simpleSC");
        assert_eq!(cfg.source, SourceConfig::default());

        let params = cfg.sink.validate().unwrap();
        assert_eq!(params.tbins.nbins(), 9600);
        assert_eq!(params.tbins.min(), -1.6 * MS);
        assert!(params.extra_sigma_long.is_none());
        assert_abs_diff_eq!(params.planes[2].prop_offset, 100.0 / 0.001098, epsilon = 1e-6);
        assert_eq!(params.planes[0].standoff, 94.0);
    }

    #[test]
    fn readout_window_truncates_to_whole_ticks() {
        let mut cfg = SinkConfig::uboone();
        cfg.readout_time = 1250.0;
        let params = cfg.validate().unwrap();
        assert_eq!(params.tbins.nbins(), 2);

        cfg.readout_time = 400.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { name: "readout_time", .. })
        ));

        cfg.readout_time = 1.0e300;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { name: "readout_time", .. })
        ));
    }

    #[test]
    fn extra_sigma_long_uses_drift_speed() {
        let mut cfg = SinkConfig::uboone();
        cfg.extra_sigma.enabled = true;
        let params = cfg.validate().unwrap();
        let expect = 1.428249 * 1.098;
        assert_abs_diff_eq!(params.extra_sigma_long.unwrap(), expect, epsilon = 1e-9);
    }

    #[test]
    fn source_units_resolve_by_name() {
        let src = SourceConfig::default().resolve().unwrap();
        assert_eq!(src.length, crate::units::CM);
        assert_eq!(src.charge_scale, -1.0);

        let bad = SourceConfig {
            time_unit: "fortnight".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(bad.resolve(), Err(ConfigError::UnknownUnit(_))));
    }
}
