//! Descriptor-driven encode and decode.
//!
//! A single synchronous walk over the descriptor graph moves bits between a
//! message value's storage buffer and the wire buffer. The walk carries a
//! small mutable context: the direction, a bit cursor, and the wire buffer.
//!
//! Contract, as in every bitproto runtime: the caller sizes the wire buffer
//! to the message's byte width and pre-zeroes the destination side (the
//! wire buffer when encoding, the value when decoding). The codec validates
//! nothing at runtime; the schema fixed every dimension at compile time.

use crate::bits::{copy_bits, sign_extend};
use crate::descriptor::{ArrayDescriptor, MessageDescriptor, TypeDescriptor};
use crate::exten;

/// Mutable state threaded through one encode or decode call.
pub struct ProcessContext<'buf> {
    /// Direction: `true` when encoding into `s`.
    pub is_encode: bool,
    /// Bit cursor into `s`.
    pub i: usize,
    /// Wire buffer: destination when encoding, source when decoding.
    pub s: &'buf mut [u8],
}

/// Encodes a message value into `buffer`.
///
/// `value` is the message's storage; `buffer` must hold at least
/// [`MessageDescriptor::nbytes`] pre-zeroed bytes. The value is only read,
/// but is borrowed exclusively: a value may be used by one codec call at a
/// time.
pub fn encode(descriptor: &MessageDescriptor, value: &mut [u8], buffer: &mut [u8]) {
    let mut ctx = ProcessContext {
        is_encode: true,
        i: 0,
        s: buffer,
    };
    process_message(descriptor, &mut ctx, value);
}

/// Decodes `buffer` into a pre-zeroed message value.
pub fn decode(descriptor: &MessageDescriptor, value: &mut [u8], buffer: &mut [u8]) {
    let mut ctx = ProcessContext {
        is_encode: false,
        i: 0,
        s: buffer,
    };
    process_message(descriptor, &mut ctx, value);
}

/// Dispatches one value by its type descriptor. `data` is exactly the
/// value's storage slice.
pub(crate) fn process_type(ty: &TypeDescriptor, ctx: &mut ProcessContext, data: &mut [u8]) {
    match ty {
        TypeDescriptor::Bool => process_bool(ctx, data),
        TypeDescriptor::Byte => process_base(8, ctx, data),
        TypeDescriptor::Uint { nbits } | TypeDescriptor::Enum { nbits } => {
            process_base(usize::from(*nbits), ctx, data)
        }
        TypeDescriptor::Int { nbits } => {
            let nbits = usize::from(*nbits);
            process_base(nbits, ctx, data);
            if !ctx.is_encode {
                sign_extend(data, nbits);
            }
        }
        TypeDescriptor::Alias { to } => process_type(to, ctx, data),
        TypeDescriptor::Array(array) => process_array(array, ctx, data),
        TypeDescriptor::Message(message) => process_message(message, ctx, data),
    }
}

/// Copies a base value of `nbits` between storage and the wire.
fn process_base(nbits: usize, ctx: &mut ProcessContext, data: &mut [u8]) {
    if ctx.is_encode {
        copy_bits(nbits, ctx.s, data, ctx.i, 0);
    } else {
        copy_bits(nbits, data, ctx.s, 0, ctx.i);
    }
    ctx.i += nbits;
}

/// Bool converts at the codec boundary: any nonzero storage byte encodes
/// wire bit 1; the decoded storage byte is exactly 0 or 1.
fn process_bool(ctx: &mut ProcessContext, data: &mut [u8]) {
    if ctx.is_encode {
        let bit = [u8::from(data[0] != 0)];
        copy_bits(1, ctx.s, &bit, ctx.i, 0);
    } else {
        let mut bit = [0u8];
        copy_bits(1, &mut bit, ctx.s, 0, ctx.i);
        data[0] = bit[0];
    }
    ctx.i += 1;
}

fn process_array(array: &ArrayDescriptor, ctx: &mut ProcessContext, data: &mut [u8]) {
    let mut ahead = 0usize;
    if array.extensible {
        if ctx.is_encode {
            exten::encode_ahead(ctx, array.cap as u16);
        } else {
            ahead = usize::from(exten::decode_ahead(ctx));
        }
    }
    let payload_start = ctx.i;
    let elem_nbits = array.elem.nbits();
    let elem_size = array.elem.storage_size();

    // Standard-width integer elements are contiguous in storage; one block
    // copy replaces the per-element loop. Not taken when decoding an
    // extensible array, where the producer may have written fewer elements.
    if array.elem.is_packed_integer() && (ctx.is_encode || !array.extensible) {
        process_base(array.cap * elem_nbits, ctx, &mut data[..array.cap * elem_size]);
    } else {
        for k in 0..array.cap {
            if array.extensible && !ctx.is_encode && ctx.i >= payload_start + ahead * elem_nbits
            {
                break;
            }
            process_type(&array.elem, ctx, &mut data[k * elem_size..(k + 1) * elem_size]);
        }
    }

    // Skip past elements the producer wrote beyond our capacity.
    if array.extensible && !ctx.is_encode {
        let produced_end = payload_start + ahead * elem_nbits;
        if produced_end >= ctx.i {
            ctx.i = produced_end;
        }
    }
}

fn process_message(message: &MessageDescriptor, ctx: &mut ProcessContext, data: &mut [u8]) {
    let mut ahead = 0usize;
    if message.extensible {
        if ctx.is_encode {
            exten::encode_ahead(ctx, message.payload_nbits() as u16);
        } else {
            ahead = usize::from(exten::decode_ahead(ctx));
        }
    }
    let payload_start = ctx.i;

    for field in &message.fields {
        // Stop once the producer's payload is exhausted; remaining fields
        // keep their zeroed state.
        if message.extensible && !ctx.is_encode && ctx.i >= payload_start + ahead {
            break;
        }
        let storage = &mut data[field.offset..field.offset + field.ty.storage_size()];
        process_type(&field.ty, ctx, storage);
    }

    // Skip trailing fields of a newer producer so sibling values that
    // follow this message read the correct bits.
    if message.extensible && !ctx.is_encode {
        let produced_end = payload_start + ahead;
        if produced_end >= ctx.i {
            ctx.i = produced_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ArrayDescriptor, MessageDescriptor, TypeDescriptor};
    use crate::value::{read_int, read_uint, write_int, write_uint};

    #[test]
    fn test_single_uint32_is_little_endian() {
        let desc = MessageDescriptor::new(false, vec![("x", 1, TypeDescriptor::Uint { nbits: 32 })]);
        let mut value = vec![0u8; desc.storage_size()];
        write_uint(&mut value, 0, 4, 0x0102_0304);

        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_dense_bit_packing() {
        // uint3 a=5, bool b=1, uint3 c=3, uint5 d=20, uint7 e=127
        // packs to 19 bits: 101 1 011 00101 1111111 (LSB-first per value)
        // = 0x3D 0xFA 0x07.
        let desc = MessageDescriptor::new(
            false,
            vec![
                ("a", 1, TypeDescriptor::Uint { nbits: 3 }),
                ("b", 2, TypeDescriptor::Bool),
                ("c", 3, TypeDescriptor::Uint { nbits: 3 }),
                ("d", 4, TypeDescriptor::Uint { nbits: 5 }),
                ("e", 5, TypeDescriptor::Uint { nbits: 7 }),
            ],
        );
        let mut value = vec![0u8; desc.storage_size()];
        write_uint(&mut value, desc.field("a").unwrap().offset, 1, 5);
        value[desc.field("b").unwrap().offset] = 1;
        write_uint(&mut value, desc.field("c").unwrap().offset, 1, 3);
        write_uint(&mut value, desc.field("d").unwrap().offset, 1, 20);
        write_uint(&mut value, desc.field("e").unwrap().offset, 1, 127);

        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0x3D, 0xFA, 0x07]);

        let mut back = vec![0u8; desc.storage_size()];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(back, value);
    }

    #[test]
    fn test_bool_nonzero_normalizes_to_one_bit() {
        let desc = MessageDescriptor::new(false, vec![("flag", 1, TypeDescriptor::Bool)]);
        let mut value = vec![0xCAu8];
        let mut wire = vec![0u8; 1];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0x01]);

        let mut back = vec![0u8; 1];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(back, [0x01]);
    }

    #[test]
    fn test_int_sign_extension_on_decode() {
        let desc = MessageDescriptor::new(false, vec![("y", 1, TypeDescriptor::Int { nbits: 24 })]);
        let mut wire = vec![0xFF, 0xFF, 0xFF];
        let mut value = vec![0u8; desc.storage_size()];
        decode(&desc, &mut value, &mut wire);
        assert_eq!(read_int(&value, 0, 4), -1);

        let mut wire = vec![0x00, 0x00, 0x80];
        let mut value = vec![0u8; desc.storage_size()];
        decode(&desc, &mut value, &mut wire);
        assert_eq!(read_int(&value, 0, 4), -8_388_608);
    }

    #[test]
    fn test_int_array_round_trip() {
        // int24[2] with p[0] = -11, p[1] = 0 encodes to F5 FF FF 00 00 00.
        let desc = MessageDescriptor::new(
            false,
            vec![(
                "p",
                1,
                TypeDescriptor::Array(ArrayDescriptor::new(
                    false,
                    2,
                    TypeDescriptor::Int { nbits: 24 },
                )),
            )],
        );
        let mut value = vec![0u8; desc.storage_size()];
        write_int(&mut value, 0, 4, -11);
        write_int(&mut value, 4, 4, 0);

        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0xF5, 0xFF, 0xFF, 0x00, 0x00, 0x00]);

        let mut back = vec![0u8; desc.storage_size()];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(read_int(&back, 0, 4), -11);
        assert_eq!(read_int(&back, 4, 4), 0);
    }

    #[test]
    fn test_enum_processes_as_backing_uint() {
        let desc = MessageDescriptor::new(false, vec![("c", 1, TypeDescriptor::Enum { nbits: 3 })]);
        let mut value = vec![3u8];
        let mut wire = vec![0u8; 1];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0x03]);

        // Unknown enum values round-trip unvalidated.
        let mut wire = vec![0x07];
        let mut back = vec![0u8; 1];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(back, [0x07]);
    }

    #[test]
    fn test_byte_array_fast_path_matches_wire_format() {
        let desc = MessageDescriptor::new(
            false,
            vec![(
                "data",
                1,
                TypeDescriptor::Array(ArrayDescriptor::new(false, 4, TypeDescriptor::Byte)),
            )],
        );
        let mut value = vec![0x11, 0x22, 0x33, 0x44];
        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        assert_eq!(wire, [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn test_bit_spanning_scalar() {
        // uint3 a=5 then uint32 b=0xDEADBEEF, 35 bits over 5 bytes.
        let desc = MessageDescriptor::new(
            false,
            vec![
                ("a", 1, TypeDescriptor::Uint { nbits: 3 }),
                ("b", 2, TypeDescriptor::Uint { nbits: 32 }),
            ],
        );
        let mut value = vec![0u8; desc.storage_size()];
        write_uint(&mut value, 0, 1, 5);
        write_uint(&mut value, 1, 4, 0xDEAD_BEEF);

        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        // 0b101 then 0xDEADBEEF shifted left by 3.
        let expected = {
            let mut bytes = [0u8; 5];
            let packed = 0b101u64 | (0xDEAD_BEEFu64 << 3);
            bytes.copy_from_slice(&packed.to_le_bytes()[..5]);
            bytes
        };
        assert_eq!(wire, expected);

        let mut back = vec![0u8; desc.storage_size()];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(read_uint(&back, 1, 4), 0xDEAD_BEEF);
    }

    #[test]
    fn test_zero_value_encodes_all_zero() {
        let desc = MessageDescriptor::new(
            false,
            vec![
                ("a", 1, TypeDescriptor::Uint { nbits: 11 }),
                ("b", 2, TypeDescriptor::Bool),
                ("c", 3, TypeDescriptor::Int { nbits: 13 }),
            ],
        );
        let mut value = vec![0u8; desc.storage_size()];
        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        assert!(wire.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_nested_message_round_trip() {
        let inner = MessageDescriptor::new(
            false,
            vec![
                ("x", 1, TypeDescriptor::Uint { nbits: 5 }),
                ("y", 2, TypeDescriptor::Uint { nbits: 5 }),
            ],
        );
        let desc = MessageDescriptor::new(
            false,
            vec![
                ("head", 1, TypeDescriptor::Uint { nbits: 3 }),
                ("point", 2, TypeDescriptor::Message(inner)),
            ],
        );
        let mut value = vec![0u8; desc.storage_size()];
        write_uint(&mut value, desc.field("head").unwrap().offset, 1, 7);
        let point = desc.field("point").unwrap().offset;
        write_uint(&mut value, point, 1, 21);
        write_uint(&mut value, point + 1, 1, 9);

        let mut wire = vec![0u8; desc.nbytes()];
        encode(&desc, &mut value, &mut wire);
        let mut back = vec![0u8; desc.storage_size()];
        decode(&desc, &mut back, &mut wire);
        assert_eq!(back, value);
    }
}
