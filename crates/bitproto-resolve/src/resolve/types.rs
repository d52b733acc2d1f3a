//! Type expression resolution and type-level constraints.

use super::eval::eval_const_expr;
use super::symbols::{ScopeRef, Scopes};
use bitproto_ast::ast::{EnumDecl, TypeExpr, TypeExprKind};
use bitproto_ast::foundation::Span;
use bitproto_ast::ir::{ArrayType, DefId, ProtoId, Schema, Type};
use bitproto_ast::{CompileError, ErrorKind};
use indexmap::IndexMap;

/// Resolves a written type to an IR [`Type`].
pub fn resolve_type_expr(
    schema: &Schema,
    scopes: &Scopes,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
    expr: &TypeExpr,
) -> Result<Type, CompileError> {
    match &expr.kind {
        TypeExprKind::Bool => Ok(Type::Bool),
        TypeExprKind::Byte => Ok(Type::Byte),
        TypeExprKind::Uint(nbits) => {
            check_width(*nbits, "uint", expr.span)?;
            Ok(Type::Uint {
                nbits: *nbits as u8,
            })
        }
        TypeExprKind::Int(nbits) => {
            check_width(*nbits, "int", expr.span)?;
            Ok(Type::Int {
                nbits: *nbits as u8,
            })
        }
        TypeExprKind::Reference(path) => {
            let def = scopes.lookup(stack, imports, path).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::UndefinedName,
                    expr.span,
                    format!("referenced type '{}' not defined", path),
                )
            })?;
            match def {
                DefId::Message(id) => Ok(Type::Message(id)),
                DefId::Enum(id) => Ok(Type::Enum(id)),
                DefId::Alias(id) => Ok(Type::Alias(id)),
                DefId::Const(_) => Err(CompileError::new(
                    ErrorKind::UndefinedName,
                    expr.span,
                    format!("'{}' is a constant, not a type", path),
                )),
            }
        }
        TypeExprKind::Array {
            elem,
            cap,
            extensible,
        } => {
            let elem_type = resolve_type_expr(schema, scopes, stack, imports, elem)?;
            let cap_value = eval_const_expr(cap, schema, scopes, stack, imports)?;
            let cap_int = cap_value.as_int().ok_or_else(|| {
                CompileError::new(
                    ErrorKind::InvalidArray,
                    cap.span,
                    format!(
                        "array capacity must be an integer, got {}",
                        cap_value.type_name()
                    ),
                )
            })?;
            if !(1..=65535).contains(&cap_int) {
                return Err(CompileError::new(
                    ErrorKind::InvalidArray,
                    cap.span,
                    format!("array capacity {} outside 1..=65535", cap_int),
                ));
            }
            Ok(Type::Array(Box::new(ArrayType {
                elem: elem_type,
                cap: cap_int as u16,
                extensible: *extensible,
            })))
        }
    }
}

fn check_width(nbits: u32, family: &str, span: Span) -> Result<(), CompileError> {
    if (1..=64).contains(&nbits) {
        Ok(())
    } else {
        Err(CompileError::new(
            ErrorKind::InvalidWidth,
            span,
            format!("{}{} width outside 1..=64", family, nbits),
        ))
    }
}

/// An alias may only name an unnamed type kind: a base type or an array.
/// Anything that already has a name (message, enum, another alias) is
/// rejected.
pub fn check_alias_target(schema: &Schema, target: &Type, span: Span) -> Result<(), CompileError> {
    let named = match target {
        Type::Message(id) => Some(schema.message(*id).name.clone()),
        Type::Enum(id) => Some(schema.enum_def(*id).name.clone()),
        Type::Alias(id) => Some(schema.alias(*id).name.clone()),
        _ => None,
    };
    match named {
        Some(name) => Err(CompileError::new(
            ErrorKind::InvalidAlias,
            span,
            format!("aliased type '{}' already has a name", name),
        )),
        None => Ok(()),
    }
}

/// Validates an enum declaration's width, marker and members. Returns the
/// members that passed validation.
pub fn check_enum_decl(
    decl: &EnumDecl,
    diags: &mut Vec<CompileError>,
) -> Vec<bitproto_ast::ir::EnumMember> {
    if let Some(marker) = decl.extensible_marker {
        diags.push(CompileError::new(
            ErrorKind::InvalidExtensible,
            marker,
            format!(
                "enum '{}' cannot be extensible; widening an enum would truncate values on the older side",
                decl.name
            ),
        ));
    }

    if !(1..=64).contains(&decl.backing_nbits) {
        diags.push(CompileError::new(
            ErrorKind::InvalidWidth,
            decl.span,
            format!("uint{} width outside 1..=64", decl.backing_nbits),
        ));
        return Vec::new();
    }

    let nbits = decl.backing_nbits;
    let mut members = Vec::new();
    let mut seen_names: IndexMap<&str, Span> = IndexMap::new();
    let mut seen_values: IndexMap<u64, Span> = IndexMap::new();

    for member in &decl.members {
        if let Some(first) = seen_names.get(member.name.as_str()) {
            diags.push(
                CompileError::new(
                    ErrorKind::DuplicateName,
                    member.span,
                    format!("enum member '{}' already defined", member.name),
                )
                .with_label(*first, "first defined here"),
            );
            continue;
        }
        if let Some(first) = seen_values.get(&member.value) {
            diags.push(
                CompileError::new(
                    ErrorKind::InvalidEnum,
                    member.span,
                    format!("enum value {} already used", member.value),
                )
                .with_label(*first, "first used here"),
            );
            continue;
        }
        let bit_length = 64 - member.value.leading_zeros();
        if bit_length > u32::from(nbits) {
            diags.push(CompileError::new(
                ErrorKind::InvalidEnum,
                member.span,
                format!(
                    "enum value {} does not fit the uint{} backing type",
                    member.value, nbits
                ),
            ));
            continue;
        }
        seen_names.insert(member.name.as_str(), member.span);
        seen_values.insert(member.value, member.span);
        members.push(bitproto_ast::ir::EnumMember {
            name: member.name.clone(),
            value: member.value,
            span: member.span,
        });
    }

    members
}
