//! Live FLV rewriting pipeline.
//!
//! One sequential loop: read a tag, let the drift tracker decide which
//! synthetic tags are due, write those, write the (possibly re-synthesized)
//! tag, and follow every written tag with a timing trailer. Output is flushed
//! once per input tag so the stream leaves at the pace it arrives.

pub mod drift;
pub mod synth;
pub mod trailer;

pub use drift::{Channel, DriftTracker, StreamClockState, SyncRequest};
pub use trailer::{parse_trailer, TrailerInfo, TRAILER_LEN};

use crate::clock::Clock;
use crate::config::Config;
use bytes::Bytes;
use flvsync_media::flv::{ANNOTATED_FLAGS, SIGNATURE};
use flvsync_media::{
    FileHeader, FlvReader, FlvWriter, Framed, ScriptEvent, SourceMetadata, Tag, TagType,
    ON_METADATA,
};
use serde::Serialize;
use std::io::{Read, Write};

/// Errors that stop a rewrite.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Framing or I/O failure.
    #[error(transparent)]
    Media(#[from] flvsync_media::Error),

    /// A script tag could not be processed.
    #[error("Failed to rewrite {tag_type} tag at {timestamp}ms: {source}")]
    Tag {
        tag_type: TagType,
        timestamp: i32,
        #[source]
        source: flvsync_media::Error,
    },
}

/// Tunables for a rewrite run.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteOptions {
    pub drift_threshold_ms: u32,
    pub budget_interval_ms: u64,
    /// Overrides the `streamName` of the source metadata.
    pub stream_name: Option<String>,
    /// Accepted for compatibility; trailers are always written.
    pub write_timestamps: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            drift_threshold_ms: drift::DEFAULT_DRIFT_THRESHOLD_MS,
            budget_interval_ms: drift::DEFAULT_BUDGET_INTERVAL_MS,
            stream_name: None,
            write_timestamps: false,
        }
    }
}

impl From<&Config> for RewriteOptions {
    fn from(config: &Config) -> Self {
        Self {
            drift_threshold_ms: config.sync.drift_threshold_ms,
            budget_interval_ms: config.sync.budget_interval_ms,
            stream_name: config.metadata.stream_name.clone(),
            write_timestamps: false,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub tags_read: u64,
    pub metadata_rewritten: u64,
    pub clock_syncs: u64,
    pub bandwidth_budgets: u64,
    pub unrecognized_scripts: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// The input ended inside a header, tag or size field.
    pub truncated: bool,
}

/// Rewrites one stream. Holds the per-run clock state, so use a fresh
/// instance for every stream.
pub struct Rewriter<C> {
    options: RewriteOptions,
    clock: C,
    tracker: DriftTracker,
    stats: RewriteStats,
}

impl<C: Clock> Rewriter<C> {
    pub fn new(options: RewriteOptions, clock: C) -> Self {
        let tracker = DriftTracker::new(options.drift_threshold_ms, options.budget_interval_ms);
        Self {
            options,
            clock,
            tracker,
            stats: RewriteStats::default(),
        }
    }

    pub fn stats(&self) -> &RewriteStats {
        &self.stats
    }

    pub fn clock_state(&self) -> &StreamClockState {
        self.tracker.state()
    }

    /// Rewrite `input` into `output` until the input is exhausted.
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<RewriteStats, RewriteError> {
        let mut reader = FlvReader::new(input);
        let mut writer = FlvWriter::new(output);

        let result = self.pump(&mut reader, &mut writer);
        self.stats.bytes_read = reader.bytes_read();
        self.stats.bytes_written = writer.bytes_written();
        result?;

        tracing::info!(
            tags = self.stats.tags_read,
            clock_syncs = self.stats.clock_syncs,
            budgets = self.stats.bandwidth_budgets,
            bytes_written = self.stats.bytes_written,
            truncated = self.stats.truncated,
            "Stream ended"
        );
        Ok(self.stats.clone())
    }

    fn pump<R: Read, W: Write>(
        &mut self,
        reader: &mut FlvReader<R>,
        writer: &mut FlvWriter<W>,
    ) -> Result<(), RewriteError> {
        match reader.read_header()? {
            Framed::Complete(header) => {
                tracing::debug!(
                    version = header.version,
                    flags = header.flags,
                    "FLV header"
                );
                writer.write_header(&header.with_flags(ANNOTATED_FLAGS))?;
                writer.flush()?;
            }
            Framed::EndOfStream(mut rest) => {
                FileHeader::annotate_partial(&mut rest);
                writer.write_raw(&SIGNATURE)?;
                writer.write_raw(&rest)?;
                writer.flush()?;
                self.stats.truncated = true;
                return Ok(());
            }
        }

        loop {
            let tag = match reader.read_tag()? {
                Framed::Complete(tag) => tag,
                Framed::EndOfStream(partial) => {
                    if !partial.is_empty() {
                        self.stats.truncated = true;
                        writer.write_raw(&partial)?;
                        writer.flush()?;
                    }
                    return Ok(());
                }
            };

            if !self.process_tag(&tag, reader, writer)? {
                return Ok(());
            }
            writer.flush()?;
        }
    }

    /// Handle one complete tag. Returns `false` once the input has ended.
    fn process_tag<R: Read, W: Write>(
        &mut self,
        tag: &Tag,
        reader: &mut FlvReader<R>,
        writer: &mut FlvWriter<W>,
    ) -> Result<bool, RewriteError> {
        self.stats.tags_read += 1;
        let elapsed = self.tracker.elapsed_ms(self.clock.now_ms());
        let tag_type = tag.tag_type();

        let replacement = if tag_type.is_script() {
            self.intercept_script(tag)?
        } else {
            None
        };

        for request in self.tracker.observe(tag_type, tag.timestamp(), elapsed) {
            let event = synth::event_for(&request);
            match request {
                SyncRequest::ClockSync { .. } => self.stats.clock_syncs += 1,
                SyncRequest::BandwidthBudget => self.stats.bandwidth_budgets += 1,
            }
            self.write_event(writer, &event, tag.timestamp(), elapsed)?;
        }

        let previous_size = reader.read_previous_tag_size()?;

        if let Some(bytes) = replacement {
            // The source size field describes the dropped tag; the
            // replacement carries its own.
            writer.write_raw(&bytes)?;
            trailer::write_trailer(writer, TagType::Script, elapsed)?;
            self.tracker.mark_metadata();
            self.stats.metadata_rewritten += 1;
            if let Framed::EndOfStream(_) = previous_size {
                self.stats.truncated = true;
                return Ok(false);
            }
            return Ok(true);
        }

        writer.write_tag(tag)?;
        match previous_size {
            Framed::Complete(field) => {
                writer.write_raw(&field)?;
                trailer::write_trailer(writer, tag_type, elapsed)?;
                Ok(true)
            }
            Framed::EndOfStream(partial) => {
                writer.write_raw(&partial)?;
                self.stats.truncated = true;
                Ok(false)
            }
        }
    }

    /// Decode a script tag; returns the encoded replacement for metadata.
    fn intercept_script(&mut self, tag: &Tag) -> Result<Option<Bytes>, RewriteError> {
        let fail = |source: flvsync_media::Error| RewriteError::Tag {
            tag_type: tag.tag_type(),
            timestamp: tag.timestamp(),
            source,
        };

        // Arguments of other events are never decoded, so any AMF0 content
        // in them passes through.
        let name = ScriptEvent::decode_name(&tag.payload).map_err(fail)?;
        if name != ON_METADATA {
            self.stats.unrecognized_scripts += 1;
            tracing::warn!(
                event = %name,
                timestamp = tag.timestamp(),
                "Passing through unrecognized script event"
            );
            return Ok(None);
        }

        let event = ScriptEvent::decode(&tag.payload).map_err(fail)?;
        let source = SourceMetadata::from_event(&event).map_err(fail)?;
        let stream_name = self
            .options
            .stream_name
            .clone()
            .or(source.stream_name)
            .ok_or_else(|| fail(flvsync_media::Error::missing_field(ON_METADATA, "streamName")))?;

        tracing::info!(
            stream_name = %stream_name,
            width = source.width,
            height = source.height,
            "Rewriting stream metadata"
        );

        let replacement = synth::metadata_event(&stream_name, source.width, source.height);
        let bytes = replacement.encode_tag(tag.timestamp()).map_err(fail)?;
        Ok(Some(bytes))
    }

    fn write_event<W: Write>(
        &mut self,
        writer: &mut FlvWriter<W>,
        event: &ScriptEvent,
        timestamp: i32,
        elapsed: u64,
    ) -> Result<(), RewriteError> {
        tracing::debug!(event = %event.name, timestamp, elapsed, "Injecting script tag");
        writer.write_raw(&event.encode_tag(timestamp)?)?;
        trailer::write_trailer(writer, TagType::Script, elapsed)?;
        Ok(())
    }
}
