//! Event sinks: consumers of a compiled timeline.
//!
//! [`SmfWriter`] produces a Standard MIDI File (SMF) Type 1.  Each compiled
//! track becomes one MTrk chunk; the first chunk also carries the initial
//! tempo.  The file's division is the timeline's global resolution, so
//! event ticks are written without rescaling.

use std::io::Write;

use crate::error::SinkError;
use crate::timeline::{micros_per_quarter, CompiledEvent, EventKind, Timeline, TrackEvents};

/// Largest delta time a variable-length quantity can hold.
const MAX_VLQ: u64 = 0x0FFF_FFFF;

/// Largest ticks-per-quarter division (bit 15 selects SMPTE timing).
const MAX_DIVISION: u32 = 0x7FFF;

/// Largest microseconds-per-quarter a set-tempo meta event can hold.
const MAX_TEMPO_MICROS: u32 = 0xFF_FFFF;

/// Something that accepts a compiled timeline.
pub trait EventSink {
    type Output;

    fn consume(&mut self, timeline: &Timeline) -> Result<Self::Output, SinkError>;
}

/// Encodes a timeline as SMF Type 1 bytes.
#[derive(Debug, Clone)]
pub struct SmfWriter {
    /// Write a track-name meta event at the start of each track.
    pub track_names: bool,
}

impl Default for SmfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SmfWriter {
    pub fn new() -> Self {
        Self { track_names: true }
    }

    /// Build the complete Standard MIDI File bytes.
    pub fn to_bytes(&self, timeline: &Timeline) -> Result<Vec<u8>, SinkError> {
        let division = u16::try_from(timeline.resolution)
            .ok()
            .filter(|d| *d > 0 && u32::from(*d) <= MAX_DIVISION)
            .ok_or(SinkError::ResolutionOutOfRange(timeline.resolution))?;

        let mut out = Vec::new();

        // MThd header
        out.extend_from_slice(b"MThd");
        out.extend_from_slice(&6u32.to_be_bytes()); // header length
        out.extend_from_slice(&1u16.to_be_bytes()); // format type 1
        out.extend_from_slice(&(timeline.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&division.to_be_bytes());

        for (i, track) in timeline.tracks.iter().enumerate() {
            let initial_tempo = (i == 0).then_some(timeline.initial_tempo);
            let data = self.encode_track(track, initial_tempo)?;
            out.extend_from_slice(b"MTrk");
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(&data);
        }

        tracing::debug!(
            bytes = out.len(),
            tracks = timeline.tracks.len(),
            division,
            "encoded standard midi file"
        );
        Ok(out)
    }

    /// Encode and write the file to `writer`.
    pub fn write_to<W: Write>(&self, timeline: &Timeline, mut writer: W) -> Result<(), SinkError> {
        let bytes = self.to_bytes(timeline)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Encode a track's events into raw MTrk bytes (delta-time encoded).
    fn encode_track(
        &self,
        track: &TrackEvents,
        initial_tempo: Option<u32>,
    ) -> Result<Vec<u8>, SinkError> {
        let mut data = Vec::new();

        if self.track_names {
            let name = track
                .name
                .clone()
                .unwrap_or_else(|| format!("Track {}", track.index + 1));
            let name_bytes = name.as_bytes();
            data.push(0x00); // delta time 0
            data.push(0xFF);
            data.push(0x03); // track name
            write_vlq(&mut data, name_bytes.len() as u64)?;
            data.extend_from_slice(name_bytes);
        }

        if let Some(bpm) = initial_tempo {
            data.push(0x00);
            data.extend_from_slice(&tempo_meta(bpm)?);
        }

        // Compiled tracks are already in tick order; sorting keeps
        // hand-built tracks valid too.
        let mut sorted: Vec<&CompiledEvent> = track.events.iter().collect();
        sorted.sort_by_key(|e| e.tick);

        let mut last_tick: u64 = 0;
        for event in sorted {
            write_vlq(&mut data, event.tick - last_tick)?;
            data.extend_from_slice(&event_bytes(event)?);
            last_tick = event.tick;
        }

        // End of track
        data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

        Ok(data)
    }
}

impl EventSink for SmfWriter {
    type Output = Vec<u8>;

    fn consume(&mut self, timeline: &Timeline) -> Result<Vec<u8>, SinkError> {
        self.to_bytes(timeline)
    }
}

/// Raw MIDI message bytes (status + data) for one event.
pub fn event_bytes(event: &CompiledEvent) -> Result<Vec<u8>, SinkError> {
    let ch = event.channel & 0x0F;
    let bytes = match event.kind {
        EventKind::ProgramChange { program } => vec![0xC0 | ch, program],
        EventKind::NoteOn { pitch, velocity } => vec![0x90 | ch, pitch, velocity],
        EventKind::NoteOff { pitch, velocity } => vec![0x80 | ch, pitch, velocity],
        EventKind::TempoChange { bpm } => tempo_meta(bpm)?.to_vec(),
    };
    Ok(bytes)
}

/// Meta event: FF 51 03 tt tt tt
///
/// The tempo is stored in 24 bits, so only 4..=60_000_000 bpm fit.
fn tempo_meta(bpm: u32) -> Result<[u8; 6], SinkError> {
    let uspq = micros_per_quarter(bpm)
        .filter(|us| (1..=MAX_TEMPO_MICROS).contains(us))
        .ok_or(SinkError::TempoOutOfRange(bpm))?;
    Ok([
        0xFF,
        0x51,
        0x03,
        ((uspq >> 16) & 0xFF) as u8,
        ((uspq >> 8) & 0xFF) as u8,
        (uspq & 0xFF) as u8,
    ])
}

/// Write a variable-length quantity (VLQ) to a byte vector.
fn write_vlq(out: &mut Vec<u8>, value: u64) -> Result<(), SinkError> {
    if value > MAX_VLQ {
        return Err(SinkError::DeltaOutOfRange(value));
    }
    let mut value = value as u32;
    if value == 0 {
        out.push(0);
        return Ok(());
    }
    let mut buf = [0u8; 4];
    let mut i = 0;
    while value > 0 {
        buf[i] = (value & 0x7F) as u8;
        value >>= 7;
        if i > 0 {
            buf[i] |= 0x80;
        }
        i += 1;
    }
    // Write in reverse order
    out.extend(buf[..i].iter().rev());
    Ok(())
}
