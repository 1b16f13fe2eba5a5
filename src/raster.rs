// Depositions to per-channel ionization records.
//
// For each deposition, every sensitive face holding it and every readout
// plane of that face get one Gaussian diffusion patch. Patch cells are mapped
// to channels through the plane's wires and to readout ticks through the
// plane's propagation offset.

use crate::accum::{ChannelAccumulator, Ide, SimChannel, flush};
use crate::config::{PlaneParams, SinkConfig, SinkParams};
use crate::depo::Depo;
use crate::diffusion::GaussianDiffusion;
use crate::error::{ConfigError, InputError};
use crate::gauss::GausDesc;
use crate::geom::{Geometry, SensitiveFace, WirePlane};
use tracing::{debug, trace};

/// Cells with this much charge or less are dropped.
pub const NOISE_FLOOR: f64 = 1.0;

/// Immutable per-run state: geometry plus checked configuration.
pub struct RasterContext<'g, G: Geometry> {
    geom: &'g G,
    params: SinkParams,
}

impl<'g, G: Geometry> RasterContext<'g, G> {
    /// Fails when the configuration is incomplete or a readout plane of the
    /// geometry has no plane configuration.
    pub fn new(geom: &'g G, config: &SinkConfig) -> Result<Self, ConfigError> {
        let params = config.validate()?;

        let mut nfaces = 0;
        for face in geom.faces() {
            nfaces += 1;
            for plane in face.planes() {
                if let Some(iplane) = plane.index() {
                    if iplane >= params.planes.len() {
                        return Err(ConfigError::MissingPlane(iplane));
                    }
                }
            }
        }
        if nfaces == 0 {
            return Err(ConfigError::NoFaces);
        }

        debug!(
            nfaces,
            nticks = params.tbins.nbins(),
            nsigma = params.nsigma,
            "raster context ready"
        );
        Ok(Self { geom, params })
    }

    pub fn params(&self) -> &SinkParams {
        &self.params
    }

    /// Rasterizes a whole event with a fresh accumulator.
    ///
    /// Every deposition is checked before any is rasterized, so a bad input
    /// produces an error and no records.
    pub fn process(&self, depos: &[Depo]) -> Result<Vec<SimChannel>, InputError> {
        for (index, depo) in depos.iter().enumerate() {
            if let Some(reason) = depo.invalid_reason() {
                return Err(InputError::BadDepo { index, reason });
            }
        }

        let mut accum = ChannelAccumulator::new();
        let mut nides = 0;
        for depo in depos {
            nides += self.rasterize(depo, &mut accum);
        }

        let channels = flush(&mut accum);
        debug!(
            ndepos = depos.len(),
            nides,
            nchannels = channels.len(),
            "event rasterized"
        );
        Ok(channels)
    }

    /// Adds one deposition's contributions to `accum`. Returns how many
    /// `Ide`s were added. Depositions outside every sensitive face add
    /// nothing.
    pub fn rasterize(&self, depo: &Depo, accum: &mut ChannelAccumulator) -> usize {
        let mut nfaces = 0;
        let mut nides = 0;
        for face in self.geom.faces_containing(&depo.pos) {
            nfaces += 1;
            for plane in face.planes() {
                let Some(iplane) = plane.index() else {
                    continue;
                };
                let pp = &self.params.planes[iplane];
                nides += self.rasterize_plane(depo, plane, iplane, pp, accum);
            }
        }

        if nfaces == 0 {
            trace!(
                id = depo.id,
                x = depo.pos.x,
                y = depo.pos.y,
                z = depo.pos.z,
                "depo outside sensitive volumes"
            );
        }
        nides
    }

    /// The diffusion of `depo` as seen by `plane`.
    pub fn diffusion<P: WirePlane>(
        &self,
        depo: &Depo,
        plane: &P,
        pp: &PlaneParams,
    ) -> GaussianDiffusion {
        let p = &self.params;

        let mut sigma_long = depo.extent_long;
        let mut sigma_tran = depo.extent_tran;
        if let Some(extra_long) = p.extra_sigma_long {
            sigma_long = sigma_long.hypot(extra_long);
            let pitch = plane.region_binning().binsize();
            sigma_tran = sigma_tran.hypot(pitch * pp.extra_pitch_fraction);
        }

        GaussianDiffusion::new(
            depo.charge,
            GausDesc::new(depo.time, sigma_long / p.drift_speed),
            GausDesc::new(plane.pitch_distance(&depo.pos), sigma_tran),
        )
    }

    fn rasterize_plane<P: WirePlane>(
        &self,
        depo: &Depo,
        plane: &P,
        iplane: usize,
        pp: &PlaneParams,
        accum: &mut ChannelAccumulator,
    ) -> usize {
        let p = &self.params;
        let wbins = plane.region_binning();
        let gd = self.diffusion(depo, plane, pp);
        let Some(patch) = gd.patch(&p.tbins, &wbins, p.nsigma) else {
            trace!(id = depo.id, iplane, "no overlap with plane");
            return 0;
        };

        let (track_id, truth_energy) = depo.provenance();
        let energy = if p.use_energy { truth_energy } else { p.default_energy };

        let unit = p.output_length_unit;
        let x = (depo.pos.x - pp.standoff) / unit;
        let y = depo.pos.y / unit;
        let z = depo.pos.z / unit;

        let nwires = plane.nwires() as i64;
        let ntbins = p.tbins.nbins() as i64;

        let mut nides = 0;
        for pbin in 0..patch.npitch() {
            let abs_pbin = pbin as i64 + patch.poffset_bin;
            if abs_pbin < 0 || abs_pbin >= nwires {
                continue;
            }
            let Some(channel) = plane.channel(abs_pbin as usize) else {
                continue;
            };

            for (tbin, cell) in patch.im.row(pbin).iter().enumerate() {
                let abs_tbin = tbin as i64 + patch.toffset_bin;
                if abs_tbin < 0 || abs_tbin >= ntbins {
                    continue;
                }

                let charge = cell.abs();
                // Written so NaN cells are dropped too.
                if !(charge > NOISE_FLOOR) {
                    continue;
                }

                let tdc = p.tbins.center(abs_tbin) + pp.prop_offset;
                let Some(tick) = self.tick_of(tdc) else {
                    trace!(id = depo.id, iplane, tdc, "tick before reference time");
                    continue;
                };

                accum.insert(
                    channel,
                    Ide {
                        tick,
                        charge,
                        x,
                        y,
                        z,
                        track_id,
                        energy: energy * (charge / depo.charge).abs(),
                    },
                );
                nides += 1;
            }
        }
        nides
    }

    /// Readout tick holding time `tdc`, or `None` when it falls before the
    /// reference time or beyond the tick counter.
    pub fn tick_of(&self, tdc: f64) -> Option<u32> {
        let t = (tdc - self.params.reference_time) / self.params.tick;
        if t >= 0.0 && t < u32::MAX as f64 {
            Some(t as u32)
        } else {
            None
        }
    }
}
