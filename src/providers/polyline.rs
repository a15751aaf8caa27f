//! Encoded polyline decoding (precision 1e5).
//!
//! Each coordinate is a pair of zig-zag encoded deltas (latitude first),
//! written as 5-bit groups offset by 63 with 0x20 as the continuation bit.
//! Output is longitude first.

use thiserror::Error;

use crate::providers::types::LngLat;

const PRECISION: f64 = 1e5;
const OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;
/// 64-bit values never need more than 13 chunks; anything longer is garbage.
const MAX_SHIFT: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character {0:?} at byte {1}")]
    InvalidCharacter(char, usize),

    #[error("truncated value at byte {0}")]
    Truncated(usize),

    #[error("latitude without longitude at byte {0}")]
    MissingLongitude(usize),

    #[error("value too long at byte {0}")]
    Overflow(usize),
}

/// Decode `encoded` into `[lng, lat]` pairs.
pub fn decode(encoded: &str) -> Result<Vec<LngLat>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        let (dlat, next) = decode_value(bytes, index)?;
        if next >= bytes.len() {
            return Err(PolylineError::MissingLongitude(next));
        }
        let (dlng, next) = decode_value(bytes, next)?;

        lat = lat.checked_add(dlat).ok_or(PolylineError::Overflow(index))?;
        lng = lng.checked_add(dlng).ok_or(PolylineError::Overflow(index))?;
        index = next;
        coordinates.push([lng as f64 / PRECISION, lat as f64 / PRECISION]);
    }

    Ok(coordinates)
}

/// Decode one zig-zag varint starting at `start`; returns it and the next index.
fn decode_value(bytes: &[u8], start: usize) -> Result<(i64, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut index = start;

    loop {
        let byte = *bytes.get(index).ok_or(PolylineError::Truncated(index))?;
        if !(OFFSET..=b'~').contains(&byte) {
            return Err(PolylineError::InvalidCharacter(byte as char, index));
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow(index));
        }

        let chunk = u64::from(byte - OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        index += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        !(result >> 1) as i64
    } else {
        (result >> 1) as i64
    };
    Ok((value, index))
}
