//! Type descriptors and in-memory storage layout.
//!
//! A descriptor graph is the runtime form of a schema type: it tells the
//! codec how many wire bits each value takes and where it lives inside the
//! caller's flat storage buffer. Descriptors are built once (by generated
//! code or from a resolved schema) and only borrowed during codec calls;
//! they are immutable and freely shareable across threads.
//!
//! # Storage layout
//!
//! Values live in a packed little-endian storage buffer:
//!
//! - `bool` and `byte` take one byte
//! - `uint<N>` / `int<N>` take the smallest of {1, 2, 4, 8} bytes covering N
//! - an enum takes its backing uint's storage
//! - an array is `cap` elements at a fixed stride of the element's storage
//! - a message packs its fields in ascending field-number order

/// Descriptor of a single type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Bool,
    Byte,
    Uint { nbits: u16 },
    Int { nbits: u16 },
    /// Processed exactly like its backing uint; unknown values round-trip.
    Enum { nbits: u16 },
    Alias { to: Box<TypeDescriptor> },
    Array(ArrayDescriptor),
    Message(MessageDescriptor),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    pub extensible: bool,
    pub cap: usize,
    pub elem: Box<TypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub extensible: bool,
    /// Fields in ascending field-number order (wire order).
    pub fields: Vec<FieldDescriptor>,
    /// Total wire bits, including the 16-bit prefix when extensible.
    nbits: usize,
    /// Total storage bytes of one message value.
    storage_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u16,
    /// Byte offset of this field's value inside the message storage.
    pub offset: usize,
    pub ty: TypeDescriptor,
}

impl TypeDescriptor {
    /// Wire bits this type occupies, including extensibility prefixes.
    pub fn nbits(&self) -> usize {
        match self {
            TypeDescriptor::Bool => 1,
            TypeDescriptor::Byte => 8,
            TypeDescriptor::Uint { nbits }
            | TypeDescriptor::Int { nbits }
            | TypeDescriptor::Enum { nbits } => usize::from(*nbits),
            TypeDescriptor::Alias { to } => to.nbits(),
            TypeDescriptor::Array(array) => array.nbits(),
            TypeDescriptor::Message(message) => message.nbits(),
        }
    }

    /// In-memory bytes one value of this type occupies.
    pub fn storage_size(&self) -> usize {
        match self {
            TypeDescriptor::Bool | TypeDescriptor::Byte => 1,
            TypeDescriptor::Uint { nbits }
            | TypeDescriptor::Int { nbits }
            | TypeDescriptor::Enum { nbits } => covering_bytes(usize::from(*nbits)),
            TypeDescriptor::Alias { to } => to.storage_size(),
            TypeDescriptor::Array(array) => array.cap * array.elem.storage_size(),
            TypeDescriptor::Message(message) => message.storage_size(),
        }
    }

    /// Whether values of this type fill their storage exactly: a base
    /// integer family member whose wire width equals its storage width.
    /// Arrays of such elements are contiguous in memory and can be copied
    /// as one block.
    pub fn is_packed_integer(&self) -> bool {
        match self {
            TypeDescriptor::Byte => true,
            TypeDescriptor::Uint { nbits }
            | TypeDescriptor::Int { nbits }
            | TypeDescriptor::Enum { nbits } => {
                let nbits = usize::from(*nbits);
                nbits == covering_bytes(nbits) * 8
            }
            TypeDescriptor::Alias { to } => to.is_packed_integer(),
            _ => false,
        }
    }

    /// Whether this type, or anything reachable from it, is extensible.
    pub fn any_extensible(&self) -> bool {
        match self {
            TypeDescriptor::Bool
            | TypeDescriptor::Byte
            | TypeDescriptor::Uint { .. }
            | TypeDescriptor::Int { .. }
            | TypeDescriptor::Enum { .. } => false,
            TypeDescriptor::Alias { to } => to.any_extensible(),
            TypeDescriptor::Array(array) => array.extensible || array.elem.any_extensible(),
            TypeDescriptor::Message(message) => {
                message.extensible || message.fields.iter().any(|f| f.ty.any_extensible())
            }
        }
    }
}

impl ArrayDescriptor {
    pub fn new(extensible: bool, cap: usize, elem: TypeDescriptor) -> Self {
        Self {
            extensible,
            cap,
            elem: Box::new(elem),
        }
    }

    pub fn nbits(&self) -> usize {
        let payload = self.cap * self.elem.nbits();
        if self.extensible {
            payload + 16
        } else {
            payload
        }
    }
}

impl MessageDescriptor {
    /// Builds a message descriptor from `(name, number, type)` triples,
    /// sorting fields into wire order and assigning storage offsets.
    pub fn new(extensible: bool, fields: Vec<(&str, u16, TypeDescriptor)>) -> Self {
        let mut fields: Vec<_> = fields
            .into_iter()
            .map(|(name, number, ty)| (name.to_string(), number, ty))
            .collect();
        fields.sort_by_key(|(_, number, _)| *number);

        let mut offset = 0;
        let mut nbits = if extensible { 16 } else { 0 };
        let fields: Vec<FieldDescriptor> = fields
            .into_iter()
            .map(|(name, number, ty)| {
                let field = FieldDescriptor {
                    name,
                    number,
                    offset,
                    ty,
                };
                offset += field.ty.storage_size();
                nbits += field.ty.nbits();
                field
            })
            .collect();

        Self {
            extensible,
            fields,
            nbits,
            storage_size: offset,
        }
    }

    /// Total wire bits, including the prefix when extensible.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Wire bits of the payload alone; this is the value an extensible
    /// message writes into its length prefix.
    pub fn payload_nbits(&self) -> usize {
        if self.extensible {
            self.nbits - 16
        } else {
            self.nbits
        }
    }

    /// Encoded byte length: `ceil(nbits / 8)`.
    pub fn nbytes(&self) -> usize {
        self.nbits.div_ceil(8)
    }

    /// Bytes of storage one value of this message needs.
    pub fn storage_size(&self) -> usize {
        self.storage_size
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Smallest of {1, 2, 4, 8} bytes covering `nbits` of integer storage.
pub fn covering_bytes(nbits: usize) -> usize {
    match nbits {
        1..=8 => 1,
        9..=16 => 2,
        17..=32 => 4,
        _ => 8,
    }
}
