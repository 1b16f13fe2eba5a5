// Deposition source.
//
// Turns one event's transport steps into depositions, strictly ordered by
// time, and ends the stream with an explicit end-of-stream item.

use crate::config::SourceUnits;
use crate::depo::{Depo, sort_by_time};
use crate::desc::{EventDesc, StepDesc};
use crate::error::InputError;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    Depo(Depo),
    EndOfStream,
}

#[derive(Debug, Clone)]
pub struct DepoSource {
    queue: VecDeque<Depo>,
    eos_sent: bool,
}

/// Converts one step to a deposition in internal units. Steps carry no
/// extent, so the result is point-like.
pub fn depo_from_step(step: &StepDesc, units: &SourceUnits) -> Depo {
    Depo::new(
        step.mid_point() * units.length,
        step.mid_time() * units.time,
        units.charge_scale * step.num_electrons,
    )
    .with_truth(step.track_id, step.pdg, step.energy * units.energy)
}

impl DepoSource {
    pub fn from_depos(mut depos: Vec<Depo>) -> Self {
        sort_by_time(&mut depos);
        Self {
            queue: depos.into(),
            eos_sent: false,
        }
    }

    /// `prior_steps`, when given, must pair 1:1 with `steps`; each prior
    /// becomes the `prior` of the matching deposition.
    pub fn from_steps(
        steps: &[StepDesc],
        prior_steps: Option<&[StepDesc]>,
        units: &SourceUnits,
    ) -> Result<Self, InputError> {
        if let Some(priors) = prior_steps {
            if priors.len() != steps.len() {
                return Err(InputError::InconsistentSize {
                    what: "prior steps",
                    expected: steps.len(),
                    found: priors.len(),
                });
            }
        }

        let depos = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let depo = depo_from_step(step, units);
                match prior_steps {
                    Some(priors) => depo.with_prior(depo_from_step(&priors[i], units)),
                    None => depo,
                }
            })
            .collect();

        Ok(Self::from_depos(depos))
    }

    /// Every deposition of `event`: the ready-made ones followed by the
    /// converted steps, all in time order.
    pub fn from_event(event: &EventDesc, units: &SourceUnits) -> Result<Self, InputError> {
        let from_steps = Self::from_steps(&event.steps, event.prior_steps.as_deref(), units)?;
        let mut depos = event.depos.clone();
        depos.extend(from_steps.queue);
        debug!(
            event = event.id,
            ndepos = depos.len(),
            nsteps = event.steps.len(),
            "event source ready"
        );
        Ok(Self::from_depos(depos))
    }

    /// Depositions not yet handed out.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Next deposition, then one `EndOfStream`, then `None` forever.
    pub fn next_item(&mut self) -> Option<SourceItem> {
        if let Some(depo) = self.queue.pop_front() {
            return Some(SourceItem::Depo(depo));
        }
        if self.eos_sent {
            return None;
        }
        self.eos_sent = true;
        Some(SourceItem::EndOfStream)
    }
}

impl Iterator for DepoSource {
    type Item = SourceItem;

    fn next(&mut self) -> Option<SourceItem> {
        self.next_item()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::desc::TrackId;
    use crate::point::Point;
    use approx::assert_abs_diff_eq;

    fn stub_step(track_id: i32, t: f64, z: f64) -> StepDesc {
        StepDesc {
            start: Point::new(1.0, 0.0, z),
            end: Point::new(3.0, 0.0, z),
            start_time: t,
            end_time: Some(t + 2.0),
            num_electrons: 1000.0,
            energy: 0.01,
            track_id,
            pdg: 13,
        }
    }

    fn units() -> SourceUnits {
        SourceConfig::default().resolve().unwrap()
    }

    #[test]
    fn steps_become_sorted_depos_then_eos() {
        let steps = vec![stub_step(1, 50.0, 0.0), stub_step(2, 10.0, 1.0), stub_step(3, 30.0, 2.0)];
        let mut src = DepoSource::from_steps(&steps, None, &units()).unwrap();
        assert_eq!(src.len(), 3);

        let mut ids = Vec::new();
        let mut last_time = f64::NEG_INFINITY;
        while let Some(SourceItem::Depo(depo)) = src.next_item() {
            assert!(depo.time >= last_time);
            last_time = depo.time;
            ids.push(depo.id);
        }
        assert_eq!(ids, vec![2, 3, 1]);
        // The loop above consumed the end-of-stream marker.
        assert_eq!(src.next_item(), None);
        assert_eq!(src.next_item(), None);
    }

    #[test]
    fn empty_source_yields_only_eos() {
        let mut src = DepoSource::from_depos(Vec::new());
        assert!(src.is_empty());
        assert_eq!(src.next_item(), Some(SourceItem::EndOfStream));
        assert_eq!(src.next_item(), None);
    }

    #[test]
    fn step_conversion_applies_units_and_charge_scale() {
        let depo = depo_from_step(&stub_step(4, 10.0, 1.5), &units());
        assert_eq!(depo.pos, Point::new(20.0, 0.0, 15.0));
        assert_abs_diff_eq!(depo.time, 11.0);
        assert_eq!(depo.charge, -1000.0);
        assert_abs_diff_eq!(depo.energy, 0.01);
        assert_eq!(depo.extent_long, 0.0);
        assert_eq!(depo.provenance().0, TrackId(4));
    }

    #[test]
    fn prior_steps_must_pair_with_steps() {
        let steps = vec![stub_step(1, 0.0, 0.0), stub_step(2, 1.0, 0.0)];
        let priors = vec![stub_step(9, 0.0, 0.0)];
        let err = DepoSource::from_steps(&steps, Some(&priors), &units()).unwrap_err();
        assert!(matches!(
            err,
            InputError::InconsistentSize {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn priors_attach_to_matching_depos() {
        let steps = vec![stub_step(1, 20.0, 0.0), stub_step(2, 10.0, 0.0)];
        let priors = vec![stub_step(11, 0.0, 0.0), stub_step(12, 0.0, 0.0)];
        let src = DepoSource::from_steps(&steps, Some(&priors), &units()).unwrap();
        let tracks: Vec<TrackId> = src
            .filter_map(|item| match item {
                SourceItem::Depo(d) => Some(d.provenance().0),
                SourceItem::EndOfStream => None,
            })
            .collect();
        assert_eq!(tracks, vec![TrackId(12), TrackId(11)]);
    }
}
