use crate::binning::Binning;

/// A 1D Gaussian: center and width in the units of the axis it lives on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GausDesc {
    pub center: f64,
    pub sigma: f64,
}

/// Bin-integrated weights of one Gaussian over a run of consecutive bins.
#[derive(Clone, Debug, PartialEq)]
pub struct GausSamples {
    /// Index of the first covered bin in the binning the samples came from.
    pub offset_bin: i64,
    pub weights: Vec<f64>,
}

impl GausSamples {
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

impl GausDesc {
    pub const fn new(center: f64, sigma: f64) -> Self {
        Self { center, sigma }
    }

    /// Zero width, or so narrow that `1 / sigma` overflows.
    #[inline]
    pub fn is_point(&self) -> bool {
        self.sigma == 0.0 || !(1.0 / (std::f64::consts::SQRT_2 * self.sigma)).is_finite()
    }

    /// Signed distance from the center to `x` in units of sigma, or in plain
    /// axis units for a point-like Gaussian.
    #[inline]
    pub fn distance(&self, x: f64) -> f64 {
        if self.is_point() {
            x - self.center
        } else {
            (x - self.center) / self.sigma
        }
    }

    pub fn sigma_range(&self, nsigma: f64) -> (f64, f64) {
        (self.center - nsigma * self.sigma, self.center + nsigma * self.sigma)
    }

    /// True when `[center - n*sigma, center + n*sigma]` touches the binning's
    /// range. A point-like Gaussian must sit inside the range itself.
    pub fn overlaps(&self, bins: &Binning, nsigma: f64) -> bool {
        let eff_nsigma = if self.is_point() { 0.0 } else { nsigma };
        let nmin_sigma = self.distance(bins.min());
        let nmax_sigma = self.distance(bins.max());
        !(nmin_sigma > eff_nsigma || nmax_sigma < -eff_nsigma)
    }

    /// Integral of the unit-normalized density over each of `nbins` bins of
    /// width `step` starting at `start`. A point-like Gaussian puts all of its
    /// mass in a single bin.
    pub fn binint(&self, start: f64, step: f64, nbins: usize) -> Vec<f64> {
        if self.is_point() {
            return vec![1.0];
        }

        let scale = 1.0 / (std::f64::consts::SQRT_2 * self.sigma);
        let erfs: Vec<f64> = (0..=nbins)
            .map(|ind| {
                let x = (start + step * ind as f64 - self.center) * scale;
                0.5 * libm::erf(x)
            })
            .collect();

        erfs.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Discretizes this Gaussian on `bins`, truncated at `nsigma`.
    ///
    /// Returns `None` when the truncated support misses the binning entirely,
    /// which callers treat as "no contribution on this axis". The weights are
    /// not renormalized, so their sum is the Gaussian mass actually covered.
    pub fn sample(&self, bins: &Binning, nsigma: f64) -> Option<GausSamples> {
        if !self.overlaps(bins, nsigma) {
            return None;
        }

        let (lo, hi) = self.sigma_range(nsigma);
        let (first, last) = bins.sample_bin_range(lo, hi);
        if first >= last {
            return None;
        }

        let nbins = (last - first) as usize;
        let weights = self.binint(bins.edge(first), bins.binsize(), nbins);
        Some(GausSamples {
            offset_bin: first,
            weights,
        })
    }
}
