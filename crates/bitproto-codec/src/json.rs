//! Allocation-free JSON formatting.
//!
//! Walks a message descriptor and its storage buffer, writing canonical
//! JSON into a caller-supplied byte buffer: fields in wire order, booleans
//! as `true`/`false`, integers in decimal, enums as their numeric value,
//! arrays as `[...]`, no whitespace. Unsigned 64-bit values print as bare
//! decimal even beyond 2^53.

use crate::descriptor::{MessageDescriptor, TypeDescriptor};
use crate::value::{read_int, read_uint};
use std::fmt::{self, Write as _};
use thiserror::Error;

/// JSON formatting failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The output buffer is too small for the formatted message.
    #[error("output buffer full")]
    BufferFull,
}

/// Formats a message value as JSON into `out`, returning the bytes written.
pub fn format_json(
    descriptor: &MessageDescriptor,
    value: &[u8],
    out: &mut [u8],
) -> Result<usize, FormatError> {
    let mut writer = Cursor { out, pos: 0 };
    write_message(&mut writer, descriptor, value)?;
    Ok(writer.pos)
}

/// A forward-only cursor over a byte buffer.
struct Cursor<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl fmt::Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        if self.pos + bytes.len() > self.out.len() {
            return Err(fmt::Error);
        }
        self.out[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}

fn write_message(
    w: &mut Cursor,
    descriptor: &MessageDescriptor,
    value: &[u8],
) -> Result<(), FormatError> {
    put(w, "{")?;
    for (idx, field) in descriptor.fields.iter().enumerate() {
        if idx > 0 {
            put(w, ",")?;
        }
        write!(w, "\"{}\":", field.name).map_err(|_| FormatError::BufferFull)?;
        let storage = &value[field.offset..field.offset + field.ty.storage_size()];
        write_value(w, &field.ty, storage)?;
    }
    put(w, "}")
}

fn write_value(w: &mut Cursor, ty: &TypeDescriptor, storage: &[u8]) -> Result<(), FormatError> {
    match ty {
        TypeDescriptor::Bool => put(w, if storage[0] != 0 { "true" } else { "false" }),
        TypeDescriptor::Byte => {
            write!(w, "{}", storage[0]).map_err(|_| FormatError::BufferFull)
        }
        TypeDescriptor::Uint { .. } | TypeDescriptor::Enum { .. } => {
            let size = ty.storage_size();
            write!(w, "{}", read_uint(storage, 0, size)).map_err(|_| FormatError::BufferFull)
        }
        TypeDescriptor::Int { .. } => {
            let size = ty.storage_size();
            write!(w, "{}", read_int(storage, 0, size)).map_err(|_| FormatError::BufferFull)
        }
        TypeDescriptor::Alias { to } => write_value(w, to, storage),
        TypeDescriptor::Array(array) => {
            put(w, "[")?;
            let stride = array.elem.storage_size();
            for k in 0..array.cap {
                if k > 0 {
                    put(w, ",")?;
                }
                write_value(w, &array.elem, &storage[k * stride..(k + 1) * stride])?;
            }
            put(w, "]")
        }
        TypeDescriptor::Message(message) => write_message(w, message, storage),
    }
}

fn put(w: &mut Cursor, s: &str) -> Result<(), FormatError> {
    w.write_str(s).map_err(|_| FormatError::BufferFull)
}
