/// Uniform 1D binning over `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Binning {
    nbins: usize,
    min: f64,
    max: f64,
    binsize: f64,
}

impl Binning {
    /// Panics if `nbins` is zero or the range is empty; callers validate
    /// configuration before building binnings.
    pub fn new(nbins: usize, min: f64, max: f64) -> Self {
        assert!(nbins > 0, "binning needs at least one bin");
        assert!(max > min, "binning range is empty: [{min}, {max}]");
        Self {
            nbins,
            min,
            max,
            binsize: (max - min) / nbins as f64,
        }
    }

    #[inline]
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn binsize(&self) -> f64 {
        self.binsize
    }

    /// Index of the bin holding `val`. May be negative or `>= nbins`.
    #[inline]
    pub fn bin(&self, val: f64) -> i64 {
        ((val - self.min) / self.binsize).floor() as i64
    }

    /// Low edge of bin `ind` (`edge(nbins)` is `max`).
    #[inline]
    pub fn edge(&self, ind: i64) -> f64 {
        self.min + ind as f64 * self.binsize
    }

    #[inline]
    pub fn center(&self, ind: i64) -> f64 {
        self.min + (ind as f64 + 0.5) * self.binsize
    }

    #[inline]
    pub fn inside(&self, val: f64) -> bool {
        self.min <= val && val < self.max
    }

    /// Half-open range of bins `[first, last)` touched by `[minval, maxval]`,
    /// clipped to `[0, nbins)`. Empty when `first >= last`.
    pub fn sample_bin_range(&self, minval: f64, maxval: f64) -> (i64, i64) {
        let first = self.bin(minval).max(0);
        let last = self.bin(maxval).saturating_add(1).min(self.nbins as i64);
        (first, last)
    }
}
