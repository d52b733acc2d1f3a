// End-to-end wire format tests: schema text through the compiler, bridged
// to descriptors, encoded and decoded by the runtime codec.

use bitproto::codec::value::{read_int, read_uint, write_int, write_uint};
use bitproto::codec::{decode, encode, format_json, BitPlan};
use bitproto::{compile_str, descriptor_for};
use bitproto_codec::MessageDescriptor;

/// Compiles a schema and returns the descriptor of one message.
fn message_descriptor(source: &str, name: &str) -> MessageDescriptor {
    let compiled = compile_str(source).expect("compile failed");
    let id = compiled.schema.find_message(name).expect("message exists");
    descriptor_for(&compiled.schema, id)
}

#[test]
fn test_all_ones_packing() {
    // 3+3+5+4+11+6 = 32 bits; saturating every field lights every bit.
    let desc = message_descriptor(
        "proto t\n\
         message M { uint3 a=1; uint3 b=2; uint5 c=3; uint4 d=4; uint11 e=5; uint6 f=6 }",
        "M",
    );
    assert_eq!(desc.nbytes(), 4);

    let mut value = vec![0u8; desc.storage_size()];
    for (name, v) in [("a", 7u64), ("b", 7), ("c", 31), ("d", 15), ("e", 2047), ("f", 63)] {
        let field = desc.field(name).unwrap();
        write_uint(&mut value, field.offset, field.ty.storage_size(), v);
    }

    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);
    assert_eq!(wire, [0xFF, 0xFF, 0xFF, 0xFF]);

    let mut back = vec![0u8; desc.storage_size()];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(back, value);
}

#[test]
fn test_signed_array_wire_bytes() {
    let desc = message_descriptor("proto t\nmessage N { int24[2] p = 1 }", "N");
    assert_eq!(desc.nbytes(), 6);

    let mut value = vec![0u8; desc.storage_size()];
    let p = desc.field("p").unwrap().offset;
    write_int(&mut value, p, 4, -11);
    write_int(&mut value, p + 4, 4, 0);

    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);
    assert_eq!(wire, [0xF5, 0xFF, 0xFF, 0x00, 0x00, 0x00]);

    let mut back = vec![0u8; desc.storage_size()];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(read_int(&back, p, 4), -11);
    assert_eq!(read_int(&back, p + 4, 4), 0);
}

#[test]
fn test_enum_field_wire_byte() {
    let desc = message_descriptor(
        "proto t\n\
         enum C : uint3 { U=0; R=1; G=2; B=3 }\n\
         message E { C c=1 }",
        "E",
    );
    assert_eq!(desc.nbytes(), 1);

    let mut value = vec![3u8];
    let mut wire = vec![0u8; 1];
    encode(&desc, &mut value, &mut wire);
    assert_eq!(wire, [0x03]);

    let mut back = vec![0u8; 1];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(back, [3]);
}

#[test]
fn test_extensible_versions_interoperate() {
    let v1 = message_descriptor("proto t\nmessage P' { uint8 a=1 }", "P");
    let v2 = message_descriptor("proto t\nmessage P' { uint8 a=1; uint8 b=2 }", "P");
    assert_eq!(v1.nbytes(), 3);
    assert_eq!(v2.nbytes(), 4);

    // Newer producer, older consumer.
    let mut value = vec![0x12, 0x34];
    let mut wire = vec![0u8; v2.nbytes()];
    encode(&v2, &mut value, &mut wire);
    assert_eq!(wire, [0x10, 0x00, 0x12, 0x34]);

    let mut old = vec![0u8; v1.storage_size()];
    decode(&v1, &mut old, &mut wire);
    assert_eq!(old, [0x12]);

    // Older producer, newer consumer.
    let mut value = vec![0x12];
    let mut wire = vec![0u8; v1.nbytes()];
    encode(&v1, &mut value, &mut wire);
    assert_eq!(wire, [0x08, 0x00, 0x12]);

    wire.resize(v2.nbytes(), 0);
    let mut new = vec![0u8; v2.storage_size()];
    decode(&v2, &mut new, &mut wire);
    assert_eq!(new, [0x12, 0x00]);
}

#[test]
fn test_nested_extensible_in_middle() {
    let desc = message_descriptor(
        "proto t\n\
         message Middle' { bool x = 1 }\n\
         message Outer { Middle m = 1; uint7 tail = 2 }",
        "Outer",
    );
    assert_eq!(desc.nbytes(), 3);

    let mut value = vec![0u8; desc.storage_size()];
    value[desc.field("m").unwrap().offset] = 1;
    value[desc.field("tail").unwrap().offset] = 127;

    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);
    assert_eq!(wire, [0x01, 0x00, 0xFF]);

    let mut back = vec![0u8; desc.storage_size()];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(back, value);
}

#[test]
fn test_bit_spanning_scalar() {
    let desc = message_descriptor("proto t\nmessage S { uint3 a=1; uint32 b=2 }", "S");
    assert_eq!(desc.nbytes(), 5);

    let mut value = vec![0u8; desc.storage_size()];
    write_uint(&mut value, desc.field("a").unwrap().offset, 1, 5);
    write_uint(&mut value, desc.field("b").unwrap().offset, 4, 0xDEAD_BEEF);

    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);
    let packed = 0b101u64 | (0xDEAD_BEEFu64 << 3);
    assert_eq!(wire, packed.to_le_bytes()[..5]);

    let mut back = vec![0u8; desc.storage_size()];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(read_uint(&back, desc.field("b").unwrap().offset, 4), 0xDEAD_BEEF);
}

#[test]
fn test_endianness_of_uint32() {
    let desc = message_descriptor("proto t\nmessage W { uint32 x = 1 }", "W");
    let mut value = vec![0u8; 4];
    write_uint(&mut value, 0, 4, 0x0102_0304);
    let mut wire = vec![0u8; 4];
    encode(&desc, &mut value, &mut wire);
    assert_eq!(wire, [0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn test_sign_extension_of_int24() {
    let desc = message_descriptor("proto t\nmessage Y { int24 y = 1 }", "Y");
    for (wire_bytes, expected) in [
        ([0xFFu8, 0xFF, 0xFF], -1i64),
        ([0xFF, 0xFF, 0x7F], 8_388_607),
        ([0x00, 0x00, 0x80], -8_388_608),
    ] {
        let mut wire = wire_bytes.to_vec();
        let mut value = vec![0u8; desc.storage_size()];
        decode(&desc, &mut value, &mut wire);
        assert_eq!(read_int(&value, 0, 4), expected);
    }
}

#[test]
fn test_zero_value_invariance() {
    let desc = message_descriptor(
        "proto t\n\
         message Z { bool a=1; uint13 b=2; int24 c=3; byte[3] d=4 }",
        "Z",
    );
    let mut value = vec![0u8; desc.storage_size()];
    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);
    assert!(wire.iter().all(|b| *b == 0));
}

#[test]
fn test_field_additivity() {
    let compiled = compile_str(
        "proto t\n\
         message A { uint3 x=1; int24 y=2; byte[5] z=3 }\n\
         message B' { uint3 x=1 }",
    )
    .expect("compile failed");
    let schema = &compiled.schema;

    let a = schema.message(schema.find_message("A").unwrap());
    let sum: u32 = a.fields.iter().map(|f| schema.nbits_of(&f.ty)).sum();
    assert_eq!(a.nbits, sum);
    assert_eq!(a.nbits, 3 + 24 + 40);

    let b = schema.message(schema.find_message("B").unwrap());
    assert_eq!(b.nbits, 3 + 16);
}

#[test]
fn test_round_trip_through_alias_and_nesting() {
    let desc = message_descriptor(
        "proto t\n\
         type Stamp = int64\n\
         enum Mode : uint2 { OFF=0; ON=1 }\n\
         message Gps { int19[3] pos = 1 }\n\
         message Drone {\n\
             Mode mode = 1\n\
             Stamp at = 2\n\
             Gps gps = 3\n\
             bool armed = 4\n\
         }",
        "Drone",
    );
    assert_eq!(desc.nbits(), 2 + 64 + 57 + 1);

    let mut value = vec![0u8; desc.storage_size()];
    write_uint(&mut value, desc.field("mode").unwrap().offset, 1, 1);
    write_int(&mut value, desc.field("at").unwrap().offset, 8, -1_234_567_890);
    let gps = desc.field("gps").unwrap().offset;
    write_int(&mut value, gps, 4, -200_000);
    write_int(&mut value, gps + 4, 4, 150_000);
    write_int(&mut value, gps + 8, 4, -1);
    value[desc.field("armed").unwrap().offset] = 1;

    let mut wire = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value, &mut wire);

    let mut back = vec![0u8; desc.storage_size()];
    decode(&desc, &mut back, &mut wire);
    assert_eq!(back, value);
    assert_eq!(read_int(&back, gps, 4), -200_000);
}

#[test]
fn test_plan_agrees_with_interpreter_end_to_end() {
    let desc = message_descriptor(
        "proto t\n\
         message Mixed { uint3 a=1; bool b=2; int24 c=3; byte[4] d=4; uint31 e=5 }",
        "Mixed",
    );
    let plan = BitPlan::new(&desc).expect("plan");

    let mut value = vec![0u8; desc.storage_size()];
    write_uint(&mut value, desc.field("a").unwrap().offset, 1, 6);
    value[desc.field("b").unwrap().offset] = 1;
    write_int(&mut value, desc.field("c").unwrap().offset, 4, -99);
    let d = desc.field("d").unwrap().offset;
    value[d] = 0xDE;
    value[d + 3] = 0xAD;
    write_uint(&mut value, desc.field("e").unwrap().offset, 4, 0x7FFF_FFFF);

    let mut wire_walk = vec![0u8; desc.nbytes()];
    encode(&desc, &mut value.clone(), &mut wire_walk);
    let mut wire_plan = vec![0u8; desc.nbytes()];
    plan.encode(&value, &mut wire_plan);
    assert_eq!(wire_plan, wire_walk);

    let mut back = vec![0u8; desc.storage_size()];
    plan.decode(&mut back, &wire_plan);
    assert_eq!(back, value);
}

#[test]
fn test_plan_refused_for_extensible_schema() {
    let desc = message_descriptor(
        "proto t\n\
         message Inner' { uint8 x = 1 }\n\
         message Outer { Inner inner = 1 }",
        "Outer",
    );
    assert!(BitPlan::new(&desc).is_err());
}

#[test]
fn test_json_formatting_end_to_end() {
    let desc = message_descriptor(
        "proto t\n\
         enum Mode : uint2 { OFF=0; ON=1 }\n\
         message Status { bool ok=1; Mode mode=2; int24 depth=3; byte[2] tag=4 }",
        "Status",
    );
    let mut value = vec![0u8; desc.storage_size()];
    value[desc.field("ok").unwrap().offset] = 1;
    write_uint(&mut value, desc.field("mode").unwrap().offset, 1, 1);
    write_int(&mut value, desc.field("depth").unwrap().offset, 4, -42);
    let tag = desc.field("tag").unwrap().offset;
    value[tag] = 7;
    value[tag + 1] = 9;

    let mut out = vec![0u8; 256];
    let written = format_json(&desc, &value, &mut out).expect("format");
    assert_eq!(
        std::str::from_utf8(&out[..written]).unwrap(),
        r#"{"ok":true,"mode":1,"depth":-42,"tag":[7,9]}"#
    );
}
