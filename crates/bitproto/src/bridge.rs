//! Resolved schema → codec descriptors.
//!
//! This is what generated code would otherwise hard-code: one descriptor
//! graph per message type, built from the schema IR. Descriptors own their
//! nested descriptors; build once, then share.

use bitproto_ast::ir::{MessageId, Schema, Type};
use bitproto_codec::{ArrayDescriptor, MessageDescriptor, TypeDescriptor};

/// Builds the codec descriptor for a resolved message.
pub fn descriptor_for(schema: &Schema, id: MessageId) -> MessageDescriptor {
    let descriptor = build_message(schema, id);
    debug_assert_eq!(
        descriptor.nbits() as u32,
        schema.message(id).nbits,
        "descriptor and schema disagree on message size"
    );
    descriptor
}

fn build_message(schema: &Schema, id: MessageId) -> MessageDescriptor {
    let message = schema.message(id);
    MessageDescriptor::new(
        message.extensible,
        message
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.as_str(),
                    u16::from(field.number),
                    build_type(schema, &field.ty),
                )
            })
            .collect(),
    )
}

fn build_type(schema: &Schema, ty: &Type) -> TypeDescriptor {
    match ty {
        Type::Bool => TypeDescriptor::Bool,
        Type::Byte => TypeDescriptor::Byte,
        Type::Uint { nbits } => TypeDescriptor::Uint {
            nbits: u16::from(*nbits),
        },
        Type::Int { nbits } => TypeDescriptor::Int {
            nbits: u16::from(*nbits),
        },
        Type::Enum(id) => TypeDescriptor::Enum {
            nbits: u16::from(schema.enum_def(*id).nbits),
        },
        Type::Alias(id) => TypeDescriptor::Alias {
            to: Box::new(build_type(schema, &schema.alias(*id).target)),
        },
        Type::Array(array) => TypeDescriptor::Array(ArrayDescriptor::new(
            array.extensible,
            usize::from(array.cap),
            build_type(schema, &array.elem),
        )),
        Type::Message(id) => TypeDescriptor::Message(build_message(schema, *id)),
    }
}
