use crate::bucket_vec::BucketVec;
use crate::desc::{ChannelId, TrackId};
use serde::Serialize;
use std::collections::HashMap;

/// One slice of ionization charge seen by a channel at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ide {
    pub tick: u32,
    /// Number of electrons, always non-negative.
    pub charge: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub track_id: TrackId,
    pub energy: f64,
}

/// All charge recorded on one channel for one event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimChannel {
    pub channel: ChannelId,
    pub ides: Vec<Ide>,
}

impl SimChannel {
    pub fn total_charge(&self) -> f64 {
        self.ides.iter().map(|ide| ide.charge).sum()
    }

    pub fn ides_at(&self, tick: u32) -> impl Iterator<Item = &Ide> {
        self.ides.iter().filter(move |ide| ide.tick == tick)
    }

    /// Inclusive `(first, last)` tick with any charge.
    pub fn tick_range(&self) -> Option<(u32, u32)> {
        let first = self.ides.iter().map(|ide| ide.tick).min()?;
        let last = self.ides.iter().map(|ide| ide.tick).max()?;
        Some((first, last))
    }
}

/// Per-channel, insertion-ordered lists of `Ide`s for the event in progress.
///
/// Inserts never merge: two contributions at the same channel and tick stay
/// separate so each keeps its track id.
#[derive(Debug, Default)]
pub struct ChannelAccumulator {
    by_channel: HashMap<ChannelId, BucketVec<Ide>>,
    len: usize,
}

impl ChannelAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: ChannelId, ide: Ide) {
        self.by_channel.entry(channel).or_default().push(ide);
        self.len += 1;
    }

    /// Total number of `Ide`s over all channels.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn nchannels(&self) -> usize {
        self.by_channel.len()
    }

    pub fn get(&self, channel: ChannelId) -> impl Iterator<Item = &Ide> {
        self.by_channel.get(&channel).into_iter().flat_map(|bv| bv.iter())
    }

    /// Takes every channel's list, leaving the accumulator empty. Channel
    /// order is unspecified; each channel appears once.
    pub fn drain(&mut self) -> Vec<(ChannelId, Vec<Ide>)> {
        self.len = 0;
        self.by_channel
            .drain()
            .map(|(channel, ides)| (channel, ides.into_vec()))
            .collect()
    }
}

/// Empties `accum` into output records, one per channel that saw charge,
/// ordered by channel id.
pub fn flush(accum: &mut ChannelAccumulator) -> Vec<SimChannel> {
    let mut out: Vec<SimChannel> = accum
        .drain()
        .into_iter()
        .filter(|(_, ides)| !ides.is_empty())
        .map(|(channel, ides)| SimChannel { channel, ides })
        .collect();
    out.sort_by_key(|sc| sc.channel);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ide(tick: u32, charge: f64, track: i32) -> Ide {
        Ide {
            tick,
            charge,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            track_id: TrackId(track),
            energy: 0.0,
        }
    }

    #[test]
    fn insert_appends_without_merging() {
        let mut acc = ChannelAccumulator::new();
        acc.insert(ChannelId(5), ide(10, 100.0, 1));
        acc.insert(ChannelId(5), ide(10, 50.0, 2));
        acc.insert(ChannelId(9), ide(11, 7.0, 1));
        assert_eq!(acc.len(), 3);
        assert_eq!(acc.nchannels(), 2);

        let on5: Vec<_> = acc.get(ChannelId(5)).map(|i| i.track_id).collect();
        assert_eq!(on5, vec![TrackId(1), TrackId(2)]);
        assert_eq!(acc.get(ChannelId(77)).count(), 0);
    }

    #[test]
    fn drain_empties_and_second_drain_is_empty() {
        let mut acc = ChannelAccumulator::new();
        for t in 0..200 {
            acc.insert(ChannelId(t % 3), ide(t, 1.5, 0));
        }

        let mut groups = acc.drain();
        groups.sort_by_key(|(ch, _)| *ch);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.iter().map(|(_, v)| v.len()).sum::<usize>(), 200);
        // Insertion order survives per channel.
        let ticks: Vec<u32> = groups[1].1.iter().take(3).map(|i| i.tick).collect();
        assert_eq!(ticks, vec![1, 4, 7]);

        assert!(acc.is_empty());
        assert_eq!(acc.nchannels(), 0);
        assert!(acc.drain().is_empty());
    }

    #[test]
    fn flush_sorts_by_channel_and_resets() {
        let mut acc = ChannelAccumulator::new();
        acc.insert(ChannelId(30), ide(1, 2.0, 1));
        acc.insert(ChannelId(4), ide(2, 3.0, 1));
        acc.insert(ChannelId(4), ide(3, 4.0, 1));

        let out = flush(&mut acc);
        let chans: Vec<ChannelId> = out.iter().map(|sc| sc.channel).collect();
        assert_eq!(chans, vec![ChannelId(4), ChannelId(30)]);
        assert_eq!(out[0].total_charge(), 7.0);
        assert_eq!(out[0].tick_range(), Some((2, 3)));
        assert_eq!(out[0].ides_at(3).count(), 1);

        assert!(flush(&mut acc).is_empty());
    }
}
