//! Resolved schema IR.
//!
//! Semantic analysis lowers a set of parsed files into one [`Schema`]: flat
//! arenas of protos, messages, enums, aliases and constants addressed by
//! typed ids. Parent/child relations are ids rather than references, so the
//! graph has no ownership cycles while lookups stay O(1).
//!
//! Every size-bearing node carries its computed `nbits`, including the
//! 16-bit length prefix of extensible messages and arrays. A message is
//! guaranteed ≤ 65535 bits by the time it lands here.

use crate::foundation::Span;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Index into `Schema::protos`.
    ProtoId
);
define_id!(
    /// Index into `Schema::messages`.
    MessageId
);
define_id!(
    /// Index into `Schema::enums`.
    EnumId
);
define_id!(
    /// Index into `Schema::aliases`.
    AliasId
);
define_id!(
    /// Index into `Schema::constants`.
    ConstId
);

/// A fully resolved type.
///
/// Base types are interned values: two uses of `uint3` compare equal.
/// Named types (enums, aliases, messages) compare by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Byte,
    Uint { nbits: u8 },
    Int { nbits: u8 },
    Enum(EnumId),
    Alias(AliasId),
    Array(Box<ArrayType>),
    Message(MessageId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub elem: Type,
    pub cap: u16,
    pub extensible: bool,
}

/// A constant or option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
        }
    }
}

/// Id of any top-level or message-nested definition, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefId {
    Message(MessageId),
    Enum(EnumId),
    Alias(AliasId),
    Const(ConstId),
}

/// One compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proto {
    pub name: String,
    pub filepath: PathBuf,
    /// Validated proto-scope options by dotted name.
    pub options: IndexMap<String, Value>,
    /// Import alias → imported proto.
    pub imports: IndexMap<String, ProtoId>,
    /// Top-level definitions in declaration order.
    pub defs: Vec<DefId>,
    pub span: Span,
}

/// A message: ordered numbered fields, packed without padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub proto: ProtoId,
    pub extensible: bool,
    /// Fields sorted by ascending field number (wire order).
    pub fields: Vec<Field>,
    /// Message-scope definitions (nested messages/enums, consts, aliases).
    pub nested: Vec<DefId>,
    /// Total wire bits, including the 16-bit prefix when extensible.
    pub nbits: u32,
    /// `max_bytes` option, when set to a positive value.
    pub max_bytes: Option<u32>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub number: u8,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub proto: ProtoId,
    /// Backing uint width, 1..=64.
    pub nbits: u8,
    pub members: Vec<EnumMember>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: u64,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub proto: ProtoId,
    pub target: Type,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub proto: ProtoId,
    pub value: Value,
    pub span: Span,
}

/// The resolved compilation: all protos reachable from the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub protos: Vec<Proto>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub aliases: Vec<Alias>,
    pub constants: Vec<Constant>,
    pub root: ProtoId,
}

impl Schema {
    pub fn proto(&self, id: ProtoId) -> &Proto {
        &self.protos[id.index()]
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.index()]
    }

    pub fn enum_def(&self, id: EnumId) -> &Enum {
        &self.enums[id.index()]
    }

    pub fn alias(&self, id: AliasId) -> &Alias {
        &self.aliases[id.index()]
    }

    pub fn constant(&self, id: ConstId) -> &Constant {
        &self.constants[id.index()]
    }

    pub fn root_proto(&self) -> &Proto {
        self.proto(self.root)
    }

    /// Finds a message by name in the root proto's top-level definitions.
    pub fn find_message(&self, name: &str) -> Option<MessageId> {
        self.root_proto().defs.iter().find_map(|def| match def {
            DefId::Message(id) if self.message(*id).name == name => Some(*id),
            _ => None,
        })
    }

    /// Wire bits of a type. Message and enum sizes were computed during
    /// resolution; arrays and aliases derive from their parts.
    pub fn nbits_of(&self, ty: &Type) -> u32 {
        match ty {
            Type::Bool => 1,
            Type::Byte => 8,
            Type::Uint { nbits } | Type::Int { nbits } => u32::from(*nbits),
            Type::Enum(id) => u32::from(self.enum_def(*id).nbits),
            Type::Alias(id) => self.nbits_of(&self.alias(*id).target),
            Type::Array(array) => {
                let payload = u32::from(array.cap) * self.nbits_of(&array.elem);
                if array.extensible {
                    payload + 16
                } else {
                    payload
                }
            }
            Type::Message(id) => self.message(*id).nbits,
        }
    }

    /// Encoded byte length of a type: `ceil(nbits / 8)`.
    pub fn nbytes_of(&self, ty: &Type) -> u32 {
        self.nbits_of(ty).div_ceil(8)
    }
}

/// Smallest of {1, 2, 4, 8} bytes covering `nbits` of integer storage.
pub fn covering_bytes(nbits: u32) -> u32 {
    match nbits {
        1..=8 => 1,
        9..=16 => 2,
        17..=32 => 4,
        33..=64 => 8,
        _ => unreachable!("integer widths are validated to 1..=64"),
    }
}
