//! Endian-aware writer over an abstract sink
//!
//! [`DataWriter`] forwards every primitive write to its sink and, with swap
//! enabled, reverses the byte order of multi-byte integers first. Floats
//! are reinterpreted as integers of the same width and routed through the
//! swapped integer writes so the exact bit pattern survives, NaN payloads
//! included. Single-byte and variable-length writes are never swapped.

use crate::error::{Error, Result};
use crate::sink::DataSink;

/// Writer that conditionally byte-swaps multi-byte values before handing
/// them to the sink's native-order writes.
///
/// Swap state lives on the sink when it advertises a byte-order capability
/// of its own, and on the writer otherwise. Manual swapping is always
/// available, so [`DataWriter::is_swappable`] is always true.
pub struct DataWriter<S: DataSink> {
    sink: S,
    swap: bool,
}

impl<S: DataSink> DataWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, swap: false }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_swappable(&self) -> bool {
        true
    }

    pub fn is_swap(&self) -> bool {
        match self.sink.swap_control() {
            Some(ctl) if ctl.is_swappable() => ctl.is_swap(),
            _ => self.swap,
        }
    }

    pub fn set_swap(&mut self, swap: bool) {
        match self.sink.swap_control_mut() {
            Some(ctl) if ctl.is_swappable() => ctl.set_swap(swap),
            _ => self.swap = swap,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    // ------------------------------------------------------------------
    // Never-swapped writes
    // ------------------------------------------------------------------

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.sink.write_bytes(data)
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.sink.write_u8(v)
    }

    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.sink.write_i8(v)
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.sink.write_bool(v)
    }

    /// A UTF-16 code unit; code units keep the sink's native order even in
    /// swap mode.
    pub fn write_char16(&mut self, v: u16) -> Result<()> {
        self.sink.write_char16(v)
    }

    // ------------------------------------------------------------------
    // Swapped multi-byte writes
    // ------------------------------------------------------------------

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_u16(v)
    }

    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_i16(v)
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_u32(v)
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_i32(v)
    }

    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_u64(v)
    }

    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        let v = if self.is_swap() { v.swap_bytes() } else { v };
        self.sink.write_i64(v)
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        if self.is_swap() {
            // swap the raw bit pattern, never the float value
            self.write_u32(v.to_bits())
        } else {
            self.sink.write_f32(v)
        }
    }

    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        if self.is_swap() {
            // swap the raw bit pattern, never the float value
            self.write_u64(v.to_bits())
        } else {
            self.sink.write_f64(v)
        }
    }

    // ------------------------------------------------------------------
    // String writes (never swapped)
    // ------------------------------------------------------------------

    /// The string's raw bytes, no length prefix.
    pub fn write_str_bytes(&mut self, s: &str) -> Result<()> {
        self.sink.write_bytes(s.as_bytes())
    }

    /// The string as UTF-16 code units, no length prefix.
    pub fn write_str_utf16(&mut self, s: &str) -> Result<()> {
        for unit in s.encode_utf16() {
            self.sink.write_char16(unit)?;
        }
        Ok(())
    }

    /// The string in modified UTF-8 with a u16 byte-length prefix: NUL is
    /// encoded as `C0 80` and supplementary characters as CESU-8 surrogate
    /// pairs. Strings encoding to more than 65535 bytes are rejected.
    pub fn write_str_mutf8(&mut self, s: &str) -> Result<()> {
        let encoded = encode_modified_utf8(s);
        if encoded.len() > u16::MAX as usize {
            return Err(Error::argument(format!(
                "encoded string of {} bytes exceeds the 65535 byte prefix",
                encoded.len()
            )));
        }
        self.sink.write_u16(encoded.len() as u16)?;
        self.sink.write_bytes(&encoded)
    }
}

fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        let cp = c as u32;
        match cp {
            0x01..=0x7F => out.push(cp as u8),
            0x00..=0x7FF => {
                // two-byte form; NUL lands here on purpose
                out.push(0xC0 | (cp >> 6) as u8);
                out.push(0x80 | (cp & 0x3F) as u8);
            }
            0x800..=0xFFFF => {
                out.push(0xE0 | (cp >> 12) as u8);
                out.push(0x80 | ((cp >> 6) & 0x3F) as u8);
                out.push(0x80 | (cp & 0x3F) as u8);
            }
            _ => {
                // supplementary plane: each UTF-16 surrogate as three bytes
                let v = cp - 0x10000;
                for unit in [0xD800 + (v >> 10), 0xDC00 + (v & 0x3FF)] {
                    out.push(0xE0 | (unit >> 12) as u8);
                    out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                    out.push(0x80 | (unit & 0x3F) as u8);
                }
            }
        }
    }
    out
}
