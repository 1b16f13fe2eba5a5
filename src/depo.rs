use crate::desc::TrackId;
use crate::point::Point;
use serde::Deserialize;

/// One point-like ionization deposition, in internal units.
///
/// `extent_long` is the Gaussian sigma along the drift axis (a length) and
/// `extent_tran` the sigma transverse to it. Zero means no smearing on that
/// axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Depo {
    pub pos: Point,
    pub time: f64,
    pub charge: f64,
    #[serde(default)]
    pub extent_long: f64,
    #[serde(default)]
    pub extent_tran: f64,
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub pdg: i32,
    #[serde(default)]
    pub energy: f64,
    /// The earlier-stage deposition this one was derived from.
    #[serde(default)]
    pub prior: Option<Box<Depo>>,
}

impl Depo {
    pub fn new(pos: Point, time: f64, charge: f64) -> Self {
        Self {
            pos,
            time,
            charge,
            extent_long: 0.0,
            extent_tran: 0.0,
            id: 0,
            pdg: 0,
            energy: 0.0,
            prior: None,
        }
    }

    pub fn with_extent(mut self, extent_long: f64, extent_tran: f64) -> Self {
        self.extent_long = extent_long;
        self.extent_tran = extent_tran;
        self
    }

    pub fn with_truth(mut self, id: i32, pdg: i32, energy: f64) -> Self {
        self.id = id;
        self.pdg = pdg;
        self.energy = energy;
        self
    }

    pub fn with_prior(mut self, prior: Depo) -> Self {
        self.prior = Some(Box::new(prior));
        self
    }

    /// Track id and energy to attribute charge to. The immediate prior wins
    /// over this deposition's own values; deeper links are not followed.
    pub fn provenance(&self) -> (TrackId, f64) {
        match &self.prior {
            Some(prior) => (TrackId(prior.id), prior.energy),
            None => (TrackId(self.id), self.energy),
        }
    }

    /// Reason this deposition can't be rasterized, if any.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if !self.pos.is_finite() {
            return Some("non-finite position");
        }
        if !self.time.is_finite() {
            return Some("non-finite time");
        }
        if !self.charge.is_finite() {
            return Some("non-finite charge");
        }
        if !(self.extent_long >= 0.0 && self.extent_long.is_finite()) {
            return Some("bad longitudinal extent");
        }
        if !(self.extent_tran >= 0.0 && self.extent_tran.is_finite()) {
            return Some("bad transverse extent");
        }
        None
    }
}

/// Orders depositions by time. Ties keep their input order.
pub fn sort_by_time(depos: &mut [Depo]) {
    depos.sort_by(|a, b| a.time.total_cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_prefers_prior() {
        let orig = Depo::new(Point::default(), 0.0, -10.0).with_truth(7, 13, 2.5);
        let drifted = Depo::new(Point::new(1.0, 0.0, 0.0), 5.0, -8.0)
            .with_truth(99, 13, 0.3)
            .with_prior(orig);
        assert_eq!(drifted.provenance(), (TrackId(7), 2.5));

        let bare = Depo::new(Point::default(), 0.0, 1.0).with_truth(3, 11, 0.1);
        assert_eq!(bare.provenance(), (TrackId(3), 0.1));
    }

    #[test]
    fn provenance_stops_at_first_prior() {
        let root = Depo::new(Point::default(), 0.0, 1.0).with_truth(1, 0, 1.0);
        let mid = Depo::new(Point::default(), 0.0, 1.0)
            .with_truth(2, 0, 2.0)
            .with_prior(root);
        let leaf = Depo::new(Point::default(), 0.0, 1.0).with_prior(mid);
        assert_eq!(leaf.provenance().0, TrackId(2));
    }

    #[test]
    fn invalid_reason_flags_negative_extent() {
        let d = Depo::new(Point::default(), 0.0, 1.0).with_extent(-1.0, 0.0);
        assert_eq!(d.invalid_reason(), Some("bad longitudinal extent"));
        let d = Depo::new(Point::new(f64::NAN, 0.0, 0.0), 0.0, 1.0);
        assert_eq!(d.invalid_reason(), Some("non-finite position"));
        assert!(Depo::new(Point::default(), 0.0, 1.0).invalid_reason().is_none());
    }

    #[test]
    fn sort_by_time_is_stable() {
        let mut depos = vec![
            Depo::new(Point::default(), 5.0, 1.0).with_truth(1, 0, 0.0),
            Depo::new(Point::default(), 1.0, 1.0).with_truth(2, 0, 0.0),
            Depo::new(Point::default(), 5.0, 1.0).with_truth(3, 0, 0.0),
        ];
        sort_by_time(&mut depos);
        let ids: Vec<i32> = depos.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
