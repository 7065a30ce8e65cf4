//! scoreseq: compiles a symbolic music score into a tick-indexed MIDI
//! event timeline.
//!
//! A [`Score`] is an ordered list of tracks, each an ordered list of bars
//! of notes.  [`compile`] reconciles the bars' resolutions into one global
//! resolution, assigns each track a channel, checks every bar's notes fill
//! it, and walks the notes to produce absolute-tick events.  The resulting
//! [`Timeline`] can be handed to an [`EventSink`] such as [`SmfWriter`].
//!
//! # Example
//! ```
//! use scoreseq::{compile, Bar, CompilerOptions, Note, NoteDuration, Score, Track};
//!
//! let bar = Bar::with_notes(120, 4, vec![
//!     Note::new(60, NoteDuration::Half),
//!     Note::new(64, NoteDuration::Half),
//! ]);
//! let score = Score::with_tracks(vec![Track::melodic(0, vec![bar])]);
//!
//! let timeline = compile(&score, &CompilerOptions::default()).unwrap();
//! assert_eq!(timeline.resolution, 4);
//! assert_eq!(timeline.tracks[0].channel, 0);
//! ```

pub mod catalog;
pub mod channel;
pub mod compiler;
pub mod config;
pub mod error;
pub mod model;
pub mod resolution;
pub mod sink;
pub mod timeline;
pub mod validate;

use serde::Deserialize;

#[cfg(target_os = "android")]
pub mod android;

pub use catalog::{midi_pitch, DrumNote, NoteDuration};
pub use compiler::{compile, CompileContext};
pub use config::{CompilerOptions, NoteOffPlacement, NOTE_VELOCITY};
pub use error::{CompileError, EmptyScoreReason, Error, SinkError};
pub use model::*;
pub use resolution::global_resolution;
pub use sink::{EventSink, SmfWriter};
pub use timeline::{CompiledEvent, EventKind, Timeline, TrackEvents};

/// JSON input of the string entry points: a score plus optional compiler
/// options, e.g. `{ "tracks": [...], "options": { "note_off": "nominal-end" } }`.
#[derive(Debug, Deserialize)]
struct CompileRequest {
    #[serde(flatten)]
    score: Score,
    #[serde(default)]
    options: CompilerOptions,
}

/// Compile a score and encode it as a Standard MIDI File.
pub fn compile_to_smf(score: &Score, options: &CompilerOptions) -> Result<Vec<u8>, Error> {
    let timeline = compile(score, options)?;
    Ok(SmfWriter::new().to_bytes(&timeline)?)
}

/// Convert a compiled timeline to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn timeline_to_json(timeline: &Timeline) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(timeline)?)
}

/// Compile a score given as JSON and return the timeline as JSON.
/// An `options` object next to the tracks overrides the defaults.
pub fn compile_json(score_json: &str) -> Result<String, Error> {
    let request: CompileRequest = serde_json::from_str(score_json)?;
    let timeline = compile(&request.score, &request.options)?;
    timeline_to_json(&timeline)
}

/// Compile a score given as JSON into Standard MIDI File bytes.
pub fn compile_json_to_smf(score_json: &str) -> Result<Vec<u8>, Error> {
    let request: CompileRequest = serde_json::from_str(score_json)?;
    compile_to_smf(&request.score, &request.options)
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI: for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Read a C string argument as UTF-8, or `None` if null or invalid.
///
/// # Safety
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn c_str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Compile a JSON score and return the timeline JSON as a C string.
/// The caller must free the returned string with `scoreseq_free_string`.
/// Returns null on any failure.
///
/// # Safety
/// `score_json` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn scoreseq_compile_json(score_json: *const c_char) -> *mut c_char {
    let Some(json) = (unsafe { c_str_arg(score_json) }) else {
        return std::ptr::null_mut();
    };

    match compile_json(json) {
        Ok(out) => CString::new(out).unwrap_or_default().into_raw(),
        Err(e) => {
            tracing::warn!(error = %e, "scoreseq_compile_json failed");
            std::ptr::null_mut()
        }
    }
}

/// Compile a JSON score into Standard MIDI File bytes.
/// Writes the byte count to `out_len`; the caller must free the buffer
/// with `scoreseq_free_bytes`.  Returns null on any failure.
///
/// # Safety
/// `score_json` must be a valid null-terminated UTF-8 C string and
/// `out_len` must point to writable memory.
#[no_mangle]
pub unsafe extern "C" fn scoreseq_compile_midi(
    score_json: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    if out_len.is_null() {
        return std::ptr::null_mut();
    }
    let Some(json) = (unsafe { c_str_arg(score_json) }) else {
        return std::ptr::null_mut();
    };

    match compile_json_to_smf(json) {
        Ok(bytes) => {
            let boxed = bytes.into_boxed_slice();
            unsafe { *out_len = boxed.len() };
            Box::into_raw(boxed) as *mut u8
        }
        Err(e) => {
            tracing::warn!(error = %e, "scoreseq_compile_midi failed");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by scoreseq functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a scoreseq function, or null.
#[no_mangle]
pub unsafe extern "C" fn scoreseq_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

/// Free a byte buffer previously returned by `scoreseq_compile_midi`.
///
/// # Safety
/// `ptr` and `len` must come from the same `scoreseq_compile_midi` call,
/// or `ptr` must be null.
#[no_mangle]
pub unsafe extern "C" fn scoreseq_free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len));
        }
    }
}
