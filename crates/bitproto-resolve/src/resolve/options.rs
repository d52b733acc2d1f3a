//! Recognized options and their validation.

use bitproto_ast::foundation::Span;
use bitproto_ast::ir::Value;
use bitproto_ast::{CompileError, ErrorKind};

/// Expected value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Str,
}

/// Describes one recognized option.
pub struct OptionDescriptor {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Extra range check on top of the type check.
    pub validator: Option<fn(&Value) -> bool>,
    pub description: &'static str,
}

/// Options recognized at proto scope.
pub const PROTO_OPTIONS: &[OptionDescriptor] = &[
    OptionDescriptor {
        name: "c.struct_packing_alignment",
        kind: ValueKind::Int,
        validator: Some(|v| matches!(v.as_int(), Some(n) if (0..=8).contains(&n))),
        description: "struct packing alignment for C output, 0 to 8",
    },
    OptionDescriptor {
        name: "c.name_prefix",
        kind: ValueKind::Str,
        validator: None,
        description: "prefix on generated C type names",
    },
    OptionDescriptor {
        name: "go.package_path",
        kind: ValueKind::Str,
        validator: None,
        description: "import path used by downstream Go protos",
    },
    OptionDescriptor {
        name: "py.module_name",
        kind: ValueKind::Str,
        validator: None,
        description: "module name used by downstream Python protos",
    },
];

/// Options recognized at message scope.
pub const MESSAGE_OPTIONS: &[OptionDescriptor] = &[OptionDescriptor {
    name: "max_bytes",
    kind: ValueKind::Int,
    validator: Some(|v| matches!(v.as_int(), Some(n) if n >= 0)),
    description: "maximum encoded byte size of the message",
}];

/// Checks an option assignment against a scope's descriptor table.
pub fn validate_option(
    descriptors: &[OptionDescriptor],
    name: &str,
    value: &Value,
    span: Span,
) -> Result<(), CompileError> {
    let Some(descriptor) = descriptors.iter().find(|d| d.name == name) else {
        return Err(CompileError::new(
            ErrorKind::UnknownOption,
            span,
            format!("option '{}' is not recognized in this scope", name),
        ));
    };

    let type_ok = match descriptor.kind {
        ValueKind::Int => matches!(value, Value::Int(_)),
        ValueKind::Str => matches!(value, Value::Str(_)),
    };
    if !type_ok {
        return Err(CompileError::new(
            ErrorKind::InvalidOption,
            span,
            format!(
                "option '{}' requires {} value, got {}",
                name,
                match descriptor.kind {
                    ValueKind::Int => "an integer",
                    ValueKind::Str => "a string",
                },
                value.type_name()
            ),
        ));
    }

    if let Some(validator) = descriptor.validator {
        if !validator(value) {
            return Err(CompileError::new(
                ErrorKind::InvalidOption,
                span,
                format!("invalid value for option '{}' ({})", name, descriptor.description),
            ));
        }
    }

    Ok(())
}
