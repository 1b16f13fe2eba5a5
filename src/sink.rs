// Staged sink.
//
// Hosts that push depositions one at a time (and collect records when the
// event is done) drive the rasterizer through `SimChannelSink` instead of
// calling `RasterContext::process` with a whole event.

use crate::accum::{ChannelAccumulator, SimChannel, flush};
use crate::config::SinkConfig;
use crate::depo::Depo;
use crate::error::{ConfigError, InputError};
use crate::geom::Geometry;
use crate::raster::RasterContext;
use crate::source::{DepoSource, SourceItem};
use serde::Serialize;
use tracing::{debug, warn};

/// One event's output, tagged with the configured label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRecords {
    pub label: String,
    pub channels: Vec<SimChannel>,
}

pub struct SimChannelSink<'g, G: Geometry> {
    ctx: RasterContext<'g, G>,
    label: String,
    accum: ChannelAccumulator,
    ndepos: usize,
}

impl<'g, G: Geometry> SimChannelSink<'g, G> {
    pub fn new(geom: &'g G, config: &SinkConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            ctx: RasterContext::new(geom, config)?,
            label: config.output_label.clone(),
            accum: ChannelAccumulator::new(),
            ndepos: 0,
        })
    }

    pub fn context(&self) -> &RasterContext<'g, G> {
        &self.ctx
    }

    /// Rasterizes `depo` into the event in progress and passes it through
    /// unchanged. An invalid deposition discards the event in progress.
    pub fn accept<'d>(&mut self, depo: &'d Depo) -> Result<&'d Depo, InputError> {
        if let Some(reason) = depo.invalid_reason() {
            let index = self.ndepos;
            self.abort();
            return Err(InputError::BadDepo { index, reason });
        }
        self.ctx.rasterize(depo, &mut self.accum);
        self.ndepos += 1;
        Ok(depo)
    }

    /// Pulls depositions from `source` until its end-of-stream marker.
    /// Returns how many were accepted.
    pub fn consume(&mut self, source: &mut DepoSource) -> Result<usize, InputError> {
        let mut n = 0;
        while let Some(item) = source.next_item() {
            match item {
                SourceItem::Depo(depo) => {
                    self.accept(&depo)?;
                    n += 1;
                }
                SourceItem::EndOfStream => break,
            }
        }
        Ok(n)
    }

    /// Ends the event: returns its records and starts a new, empty one.
    pub fn visit(&mut self) -> ChannelRecords {
        let nides = self.accum.len();
        let channels = flush(&mut self.accum);
        debug!(
            label = %self.label,
            ndepos = self.ndepos,
            nides,
            nchannels = channels.len(),
            "event flushed"
        );
        self.ndepos = 0;
        ChannelRecords {
            label: self.label.clone(),
            channels,
        }
    }

    fn abort(&mut self) {
        if !self.accum.is_empty() {
            warn!(ndepos = self.ndepos, nides = self.accum.len(), "discarding partial event");
        }
        self.accum.drain();
        self.ndepos = 0;
    }
}
