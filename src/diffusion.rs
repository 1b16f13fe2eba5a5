use crate::binning::Binning;
use crate::gauss::GausDesc;
use crate::im::PatchIm;

/// A deposition's charge spread over a block of (pitch, time) bins.
///
/// Pixel `(tbin, pbin)` of `im` is the charge landing in global bin
/// `(toffset_bin + tbin, poffset_bin + pbin)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub im: PatchIm,
    pub poffset_bin: i64,
    pub toffset_bin: i64,
}

impl Patch {
    pub fn npitch(&self) -> usize {
        self.im.h
    }

    pub fn ntime(&self) -> usize {
        self.im.w
    }

    pub fn charge(&self) -> f64 {
        self.im.sum()
    }
}

/// Independent Gaussians along time and pitch carrying one deposition's
/// charge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianDiffusion {
    pub time_desc: GausDesc,
    pub pitch_desc: GausDesc,
    pub charge: f64,
}

impl GaussianDiffusion {
    pub fn new(charge: f64, time_desc: GausDesc, pitch_desc: GausDesc) -> Self {
        Self {
            time_desc,
            pitch_desc,
            charge,
        }
    }

    /// Rasterizes onto `tbins` x `pbins`, truncating each axis at `nsigma`.
    ///
    /// Returns `None` when either axis misses its binning. The patch holds
    /// `|charge|` times the covered Gaussian mass; the sign is dropped.
    pub fn patch(&self, tbins: &Binning, pbins: &Binning, nsigma: f64) -> Option<Patch> {
        let tsamp = self.time_desc.sample(tbins, nsigma)?;
        let psamp = self.pitch_desc.sample(pbins, nsigma)?;

        let mut im = PatchIm::outer(&psamp.weights, &tsamp.weights);
        im.mul_const_inplace(self.charge.abs());

        Some(Patch {
            im,
            poffset_bin: psamp.offset_bin,
            toffset_bin: tsamp.offset_bin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bins() -> (Binning, Binning) {
        (Binning::new(100, 0.0, 100.0), Binning::new(50, -25.0, 25.0))
    }

    #[test]
    fn point_diffusion_is_a_single_cell() {
        let (tbins, pbins) = bins();
        let gd = GaussianDiffusion::new(-250.0, GausDesc::new(40.5, 0.0), GausDesc::new(0.5, 0.0));
        let patch = gd.patch(&tbins, &pbins, 3.0).unwrap();
        assert_eq!((patch.npitch(), patch.ntime()), (1, 1));
        assert_eq!(patch.toffset_bin, 40);
        assert_eq!(patch.poffset_bin, 25);
        assert_eq!(patch.im.arr, vec![250.0]);
    }

    #[test]
    fn patch_is_outer_product_scaled_by_charge() {
        let (tbins, pbins) = bins();
        let gd = GaussianDiffusion::new(1000.0, GausDesc::new(50.0, 2.0), GausDesc::new(0.0, 1.5));
        let patch = gd.patch(&tbins, &pbins, 3.0).unwrap();

        let tw = gd.time_desc.sample(&tbins, 3.0).unwrap();
        let pw = gd.pitch_desc.sample(&pbins, 3.0).unwrap();
        assert_eq!(patch.ntime(), tw.len());
        assert_eq!(patch.npitch(), pw.len());
        assert_abs_diff_eq!(patch.charge(), 1000.0 * tw.sum() * pw.sum(), epsilon = 1e-9);

        let v = *patch.im.get(2, 1, 0).unwrap();
        assert_abs_diff_eq!(v, 1000.0 * tw.weights[2] * pw.weights[1], epsilon = 1e-12);
    }

    #[test]
    fn either_axis_missing_means_no_patch() {
        let (tbins, pbins) = bins();
        let late = GaussianDiffusion::new(1.0, GausDesc::new(500.0, 2.0), GausDesc::new(0.0, 1.0));
        assert!(late.patch(&tbins, &pbins, 3.0).is_none());
        let wide = GaussianDiffusion::new(1.0, GausDesc::new(50.0, 2.0), GausDesc::new(40.0, 1.0));
        assert!(wide.patch(&tbins, &pbins, 3.0).is_none());
    }

    #[test]
    fn sign_is_dropped() {
        let (tbins, pbins) = bins();
        let t = GausDesc::new(30.0, 1.2);
        let p = GausDesc::new(3.3, 0.7);
        let pos = GaussianDiffusion::new(5000.0, t, p).patch(&tbins, &pbins, 3.0).unwrap();
        let neg = GaussianDiffusion::new(-5000.0, t, p).patch(&tbins, &pbins, 3.0).unwrap();
        assert_eq!(pos, neg);
    }
}
