//! Cleartext framing for oracle callbacks.
//!
//! A cleartext payload is a concatenation of frames, each a 4-byte
//! big-endian length followed by that many bytes:
//!
//! ```text
//! | len (u32 BE) | bytes ... | len (u32 BE) | bytes ... | ...
//! ```
//!
//! Report reveals carry three UTF-8 frames (title, body, category). Count
//! reveals carry a single 8-byte big-endian unsigned integer frame. Frames
//! past the ones a decoder needs are ignored. The category frame is capped at
//! [`MAX_CATEGORY_LEN`] bytes, the other text frames at [`MAX_FIELD_LEN`].

use soroban_sdk::{Bytes, Env, String};

use crate::LedgerError;

const FRAME_HEADER_LEN: u32 = 4;

/// Upper bound on a single revealed text field, in bytes.
pub const MAX_FIELD_LEN: u32 = 4096;

/// Upper bound on a revealed category label, in bytes.
pub const MAX_CATEGORY_LEN: u32 = 128;

const COUNT_FRAME_LEN: u32 = 8;

/// Plaintext of a report as delivered by the oracle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevealedFields {
    pub title: String,
    pub body: String,
    pub category: String,
}

pub fn decode_report(env: &Env, cleartexts: &Bytes) -> Result<RevealedFields, LedgerError> {
    let (title, offset) = read_frame(cleartexts, 0)?;
    let (body, offset) = read_frame(cleartexts, offset)?;
    let (category, _) = read_frame(cleartexts, offset)?;
    if category.len() > MAX_CATEGORY_LEN {
        return Err(LedgerError::DecodeError);
    }

    Ok(RevealedFields {
        title: frame_to_string(env, &title)?,
        body: frame_to_string(env, &body)?,
        category: frame_to_string(env, &category)?,
    })
}

pub fn decode_count(cleartexts: &Bytes) -> Result<u64, LedgerError> {
    let (frame, _) = read_frame(cleartexts, 0)?;
    if frame.len() != COUNT_FRAME_LEN {
        return Err(LedgerError::DecodeError);
    }
    let mut buf = [0u8; COUNT_FRAME_LEN as usize];
    frame.copy_into_slice(&mut buf);
    Ok(u64::from_be_bytes(buf))
}

/// Frames `fields` the way `decode_report` expects. Used by relayers and tests.
pub fn encode_strings(env: &Env, fields: &[&str]) -> Bytes {
    let mut out = Bytes::new(env);
    for field in fields {
        out.extend_from_array(&(field.len() as u32).to_be_bytes());
        out.extend_from_slice(field.as_bytes());
    }
    out
}

pub fn encode_count(env: &Env, count: u64) -> Bytes {
    let mut out = Bytes::new(env);
    out.extend_from_array(&COUNT_FRAME_LEN.to_be_bytes());
    out.extend_from_array(&count.to_be_bytes());
    out
}

fn read_frame(cleartexts: &Bytes, offset: u32) -> Result<(Bytes, u32), LedgerError> {
    let header_end = offset
        .checked_add(FRAME_HEADER_LEN)
        .ok_or(LedgerError::DecodeError)?;
    if header_end > cleartexts.len() {
        return Err(LedgerError::DecodeError);
    }

    let mut header = [0u8; FRAME_HEADER_LEN as usize];
    cleartexts
        .slice(offset..header_end)
        .copy_into_slice(&mut header);
    let len = u32::from_be_bytes(header);

    let end = header_end
        .checked_add(len)
        .ok_or(LedgerError::DecodeError)?;
    if end > cleartexts.len() {
        return Err(LedgerError::DecodeError);
    }

    Ok((cleartexts.slice(header_end..end), end))
}

fn frame_to_string(env: &Env, frame: &Bytes) -> Result<String, LedgerError> {
    let len = frame.len();
    if len > MAX_FIELD_LEN {
        return Err(LedgerError::DecodeError);
    }

    let mut buf = [0u8; MAX_FIELD_LEN as usize];
    frame.copy_into_slice(&mut buf[..len as usize]);
    let text = core::str::from_utf8(&buf[..len as usize]).map_err(|_| LedgerError::DecodeError)?;

    Ok(String::from_str(env, text))
}
