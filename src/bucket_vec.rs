use std::slice;

/// Append-only list stored as fixed-capacity buckets.
///
/// Pushing never moves earlier elements, so long per-channel lists grow
/// without repeated reallocation and copying. Iteration is in push order.
#[derive(Debug, Clone)]
pub struct BucketVec<T, const BUCKET_SIZE: usize = 64> {
    buckets: Vec<Vec<T>>,
    len: usize,
}

impl<T, const BUCKET_SIZE: usize> Default for BucketVec<T, BUCKET_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const BUCKET_SIZE: usize> BucketVec<T, BUCKET_SIZE> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        match self.buckets.last_mut() {
            Some(bucket) if bucket.len() < BUCKET_SIZE => bucket.push(value),
            _ => {
                let mut bucket = Vec::with_capacity(BUCKET_SIZE);
                bucket.push(value);
                self.buckets.push(bucket);
            }
        }
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            bucket_iter: self.buckets.iter(),
            elem_iter: None,
            remaining: self.len,
        }
    }

    /// Flattens into one contiguous vector in push order.
    pub fn into_vec(self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        for bucket in self.buckets {
            out.extend(bucket);
        }
        out
    }
}

pub struct Iter<'a, T> {
    bucket_iter: slice::Iter<'a, Vec<T>>,
    elem_iter: Option<slice::Iter<'a, T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(elems) = self.elem_iter.as_mut() {
                if let Some(item) = elems.next() {
                    self.remaining -= 1;
                    return Some(item);
                }
            }

            let bucket = self.bucket_iter.next()?;
            self.elem_iter = Some(bucket.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
