//! Extensibility length prefixes.
//!
//! An extensible entity writes a 16-bit little-endian prefix immediately
//! before its payload: a message writes its payload bit-count (the prefix
//! itself is not counted), an array writes its element count. On decode the
//! prefix tells the consumer how much the producer actually wrote, so a
//! consumer with a shorter schema can skip the surplus and a consumer with
//! a longer one can stop early.
//!
//! Both sides must agree on whether an entity is extensible; a
//! non-extensible reader of extensible bytes will misread the prefix as
//! payload.

use crate::bits::copy_bits;
use crate::codec::ProcessContext;

/// Writes the 16-bit prefix at the cursor.
pub(crate) fn encode_ahead(ctx: &mut ProcessContext, value: u16) {
    let bytes = value.to_le_bytes();
    copy_bits(16, ctx.s, &bytes, ctx.i, 0);
    ctx.i += 16;
}

/// Reads the 16-bit prefix at the cursor.
pub(crate) fn decode_ahead(ctx: &mut ProcessContext) -> u16 {
    let mut bytes = [0u8; 2];
    copy_bits(16, &mut bytes, ctx.s, 0, ctx.i);
    ctx.i += 16;
    u16::from_le_bytes(bytes)
}
