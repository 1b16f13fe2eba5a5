use super::core::ChargeIm;
use crate::accum::SimChannel;
use crate::desc::ChannelId;

/// Dense view of one event's records: row `y` is `channels[y]`, column `x`
/// is tick `tick0 + x`. Contributions from different tracks at the same
/// channel and tick are summed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeFrame {
    pub channels: Vec<ChannelId>,
    pub tick0: u32,
    pub im: ChargeIm,
}

impl ChargeFrame {
    /// `None` when no record carries any charge.
    pub fn from_channels(records: &[SimChannel]) -> Option<Self> {
        let (first, last) = records
            .iter()
            .filter_map(|sc| sc.tick_range())
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))?;

        let rows: Vec<&SimChannel> = records.iter().filter(|sc| !sc.ides.is_empty()).collect();
        let w = (last - first) as usize + 1;
        let mut im = ChargeIm::new(w, rows.len());
        for (y, sc) in rows.iter().enumerate() {
            for ide in &sc.ides {
                let x = (ide.tick - first) as usize;
                if let Some(px) = im.get_mut(x, y, 0) {
                    *px += ide.charge as f32;
                }
            }
        }

        Some(Self {
            channels: rows.iter().map(|sc| sc.channel).collect(),
            tick0: first,
            im,
        })
    }

    /// Summed charge at `(channel, tick)`, zero where nothing landed.
    pub fn charge_at(&self, channel: ChannelId, tick: u32) -> f32 {
        let Some(y) = self.channels.iter().position(|&c| c == channel) else {
            return 0.0;
        };
        let Some(x) = tick.checked_sub(self.tick0) else {
            return 0.0;
        };
        self.im.get(x as usize, y, 0).copied().unwrap_or(0.0)
    }

    pub fn nticks(&self) -> usize {
        self.im.w
    }
}
