#[derive(Debug, Clone, PartialEq)]
pub struct Im<T, const N_CH: usize> {
    pub w: usize,
    pub h: usize,
    pub s: usize, // stride in elements (w * N_CH)
    pub arr: Vec<T>,
}

// Constructor
// -----------------------------------------------------------------------------
impl<T: Copy + Default, const N_CH: usize> Im<T, N_CH> {
    pub fn new(w: usize, h: usize) -> Self {
        let s = w * N_CH;
        let arr = vec![T::default(); s * h];
        Self { w, h, s, arr }
    }
}

impl<T, const N_CH: usize> Im<T, N_CH> {
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize, ch: usize) -> &T {
        unsafe { self.arr.get_unchecked(y * self.s + x * N_CH + ch) }
    }

    #[inline(always)]
    pub unsafe fn get_unchecked_mut(&mut self, x: usize, y: usize, ch: usize) -> &mut T {
        unsafe { self.arr.get_unchecked_mut(y * self.s + x * N_CH + ch) }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, ch: usize) -> Option<&T> {
        if x >= self.w || y >= self.h || ch >= N_CH {
            return None;
        }
        self.arr.get(y * self.s + x * N_CH + ch)
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, ch: usize) -> Option<&mut T> {
        if x >= self.w || y >= self.h || ch >= N_CH {
            return None;
        }
        self.arr.get_mut(y * self.s + x * N_CH + ch)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Row `y` as a slice (all channels interleaved).
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.arr[y * self.s..(y + 1) * self.s]
    }
}

// Floating point pixel helpers.
// -----------------------------------------------------------------------------

macro_rules! impl_float_im {
    ($($t:ty),* $(,)?) => {
        $(
            impl<const N_CH: usize> Im<$t, N_CH> {
                pub fn sum(&self) -> $t {
                    self.arr.iter().sum()
                }

                pub fn abs_sum(&self) -> $t {
                    self.arr.iter().map(|v| v.abs()).sum()
                }

                /// Largest pixel value, or zero for an empty image.
                pub fn max_val(&self) -> $t {
                    self.arr.iter().copied().fold(0.0, <$t>::max)
                }

                pub fn mul_const_inplace(&mut self, k: $t) -> &mut Self {
                    for v in &mut self.arr {
                        *v *= k;
                    }
                    self
                }
            }
        )*
    };
}

impl_float_im!(f32, f64);

impl Im<f64, 1> {
    /// Outer product image: pixel `(x, y)` is `cols[x] * rows[y]`.
    pub fn outer(rows: &[f64], cols: &[f64]) -> Self {
        let mut im = Self::new(cols.len(), rows.len());
        for (y, r) in rows.iter().enumerate() {
            let base = y * im.s;
            for (x, c) in cols.iter().enumerate() {
                im.arr[base + x] = r * c;
            }
        }
        im
    }
}

/// Diffusion patch weights: pitch bins down, time bins across.
pub type PatchIm = Im<f64, 1>;

/// Dense charge frame: channels down, ticks across.
pub type ChargeIm = Im<f32, 1>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_product_layout() {
        let im = PatchIm::outer(&[1.0, 2.0], &[0.5, 0.25, 0.125]);
        assert_eq!(im.w, 3);
        assert_eq!(im.h, 2);
        assert_eq!(im.row(1), &[1.0, 0.5, 0.25]);
        assert_eq!(im.get(2, 0, 0), Some(&0.125));
        assert_eq!(im.get(3, 0, 0), None);
        assert_eq!(im.sum(), 1.75 * 1.5);
    }

    #[test]
    fn mul_const_and_max() {
        let mut im = ChargeIm::new(2, 2);
        im.arr.copy_from_slice(&[1.0, -4.0, 2.0, 3.0]);
        im.mul_const_inplace(2.0);
        assert_eq!(im.max_val(), 6.0);
        assert_eq!(im.abs_sum(), 20.0);
    }

    #[test]
    fn can_new_f32_im() {
        let im = ChargeIm::new(3, 2);
        assert_eq!(im.s, 3);
        assert_eq!(im.arr.len(), 3 * 2);
        assert!(im.arr.iter().all(|&v| v == 0.0));
        assert!(!im.is_empty());
        assert!(ChargeIm::new(0, 4).is_empty());
    }
}
