//! Style lints.
//!
//! All lints are warnings: proto names snake_case, type names PascalCase,
//! constants and enum members UPPER_SNAKE_CASE, field names snake_case, and
//! every enum should define a zero value for the unknown state.

use bitproto_ast::ir::Schema;
use bitproto_ast::{CompileError, ErrorKind};

/// Runs every lint rule over a resolved schema.
pub fn lint_schema(schema: &Schema, diags: &mut Vec<CompileError>) {
    for proto in &schema.protos {
        if !proto.name.is_empty() && !is_snake_case(&proto.name) {
            diags.push(
                CompileError::warning(
                    ErrorKind::Lint,
                    proto.span,
                    format!("proto name '{}' should be snake_case", proto.name),
                )
                .with_note(format!("consider '{}'", to_snake_case(&proto.name))),
            );
        }
    }

    for message in &schema.messages {
        if !is_pascal_case(&message.name) {
            diags.push(
                CompileError::warning(
                    ErrorKind::Lint,
                    message.span,
                    format!("message name '{}' should be PascalCase", message.name),
                )
                .with_note(format!("consider '{}'", to_pascal_case(&message.name))),
            );
        }
        for field in &message.fields {
            if !is_snake_case(&field.name) {
                diags.push(
                    CompileError::warning(
                        ErrorKind::Lint,
                        field.span,
                        format!("field name '{}' should be snake_case", field.name),
                    )
                    .with_note(format!("consider '{}'", to_snake_case(&field.name))),
                );
            }
        }
    }

    for enum_def in &schema.enums {
        if !is_pascal_case(&enum_def.name) {
            diags.push(
                CompileError::warning(
                    ErrorKind::Lint,
                    enum_def.span,
                    format!("enum name '{}' should be PascalCase", enum_def.name),
                )
                .with_note(format!("consider '{}'", to_pascal_case(&enum_def.name))),
            );
        }
        for member in &enum_def.members {
            if !is_upper_snake_case(&member.name) {
                diags.push(
                    CompileError::warning(
                        ErrorKind::Lint,
                        member.span,
                        format!(
                            "enum member '{}' should be UPPER_SNAKE_CASE",
                            member.name
                        ),
                    )
                    .with_note(format!("consider '{}'", member.name.to_uppercase())),
                );
            }
        }
        if !enum_def.members.iter().any(|m| m.value == 0) {
            diags.push(CompileError::warning(
                ErrorKind::Lint,
                enum_def.span,
                format!(
                    "enum '{}' has no member with value 0; 0 decodes as the unknown state",
                    enum_def.name
                ),
            ));
        }
    }

    for alias in &schema.aliases {
        if !is_pascal_case(&alias.name) {
            diags.push(
                CompileError::warning(
                    ErrorKind::Lint,
                    alias.span,
                    format!("type alias '{}' should be PascalCase", alias.name),
                )
                .with_note(format!("consider '{}'", to_pascal_case(&alias.name))),
            );
        }
    }

    for constant in &schema.constants {
        if !is_upper_snake_case(&constant.name) {
            diags.push(
                CompileError::warning(
                    ErrorKind::Lint,
                    constant.span,
                    format!(
                        "constant '{}' should be UPPER_SNAKE_CASE",
                        constant.name
                    ),
                )
                .with_note(format!("consider '{}'", constant.name.to_uppercase())),
            );
        }
    }
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn is_upper_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_pascal_case(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && !name.contains('_')
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
