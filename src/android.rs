//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::{jbyteArray, jstring};
use jni::JNIEnv;

use crate::{compile_json, compile_json_to_smf};

/// Compile a JSON score and return the timeline as JSON.
///
/// Called from Kotlin as:
///   external fun compileJson(scoreJson: String): String?
#[no_mangle]
pub extern "system" fn Java_com_scoreseq_ScoreSeq_compileJson(
    mut env: JNIEnv,
    _class: JClass,
    score_json: JString,
) -> jstring {
    let json: String = match env.get_string(&score_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match compile_json(&json) {
        Ok(out) => match env.new_string(&out) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "compileJson failed");
            std::ptr::null_mut()
        }
    }
}

/// Compile a JSON score into Standard MIDI File bytes.
///
/// Called from Kotlin as:
///   external fun compileMidi(scoreJson: String): ByteArray?
#[no_mangle]
pub extern "system" fn Java_com_scoreseq_ScoreSeq_compileMidi(
    mut env: JNIEnv,
    _class: JClass,
    score_json: JString,
) -> jbyteArray {
    let json: String = match env.get_string(&score_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match compile_json_to_smf(&json) {
        Ok(bytes) => match env.byte_array_from_slice(&bytes) {
            Ok(array) => array.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "compileMidi failed");
            std::ptr::null_mut()
        }
    }
}
