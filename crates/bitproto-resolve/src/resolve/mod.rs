//! Resolution pipeline.
//!
//! Protos are processed in dependency order (imports before importers), and
//! each proto's declarations in source order. References bind to what is
//! already declared, so a message is only visible after its closing brace,
//! which makes self-containment impossible by construction. Bit sizes are
//! computed as each message closes and memoized on its IR node.

pub mod eval;
pub mod lint;
pub mod options;
pub mod symbols;
pub mod types;

use bitproto_ast::ast::{Declaration, FileAst, MessageItem};
use bitproto_ast::foundation::Span;
use bitproto_ast::ir::{
    Alias, ConstId, Constant, DefId, Enum, EnumId, Field, Message, MessageId, Proto, ProtoId,
    Schema, Value,
};
use bitproto_ast::{CompileError, ErrorKind};
use eval::eval_const_expr;
use indexmap::IndexMap;
use std::path::PathBuf;
use symbols::{Binding, Member, ScopeRef, Scopes};
use tracing::debug;
use types::{check_alias_target, check_enum_decl, resolve_type_expr};

/// A parsed file plus its resolved import targets.
#[derive(Debug)]
pub struct ParsedProto {
    pub file: FileAst,
    pub filepath: PathBuf,
    /// For the n-th import declaration in `file`, the index of the target
    /// in the slice handed to [`resolve`]. Targets always precede their
    /// importers in that slice.
    pub import_targets: Vec<usize>,
}

/// A successfully resolved compilation.
#[derive(Debug)]
pub struct Resolved {
    pub schema: Schema,
    /// Lint and other warning-severity diagnostics.
    pub warnings: Vec<CompileError>,
}

struct Resolver {
    schema: Schema,
    scopes: Scopes,
    diags: Vec<CompileError>,
}

/// Resolves parsed files into a [`Schema`].
///
/// `root` indexes the compilation's entry file within `files`. On failure
/// the returned diagnostics contain every error and warning found.
pub fn resolve(files: &[ParsedProto], root: usize) -> Result<Resolved, Vec<CompileError>> {
    let mut resolver = Resolver {
        schema: Schema {
            protos: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            aliases: Vec::new(),
            constants: Vec::new(),
            root: ProtoId(0),
        },
        scopes: Scopes::default(),
        diags: Vec::new(),
    };

    let mut proto_ids: Vec<Option<ProtoId>> = vec![None; files.len()];
    for (idx, parsed) in files.iter().enumerate() {
        let id = resolve_proto(&mut resolver, parsed, &proto_ids);
        proto_ids[idx] = Some(id);
        debug!(
            proto = %resolver.schema.proto(id).name,
            messages = resolver.schema.messages.len(),
            "resolved proto"
        );
    }

    if let Some(Some(root_id)) = proto_ids.get(root) {
        resolver.schema.root = *root_id;
    }

    lint::lint_schema(&resolver.schema, &mut resolver.diags);

    if resolver.diags.iter().any(CompileError::is_error) {
        Err(resolver.diags)
    } else {
        Ok(Resolved {
            schema: resolver.schema,
            warnings: resolver.diags,
        })
    }
}

fn resolve_proto(
    r: &mut Resolver,
    parsed: &ParsedProto,
    proto_ids: &[Option<ProtoId>],
) -> ProtoId {
    let proto_id = ProtoId(r.schema.protos.len() as u32);
    let (name, span) = match &parsed.file.proto_name {
        Some(decl) => (decl.name.clone(), decl.span),
        None => (String::new(), Span::zero(parsed.file.file_id)),
    };
    r.schema.protos.push(Proto {
        name,
        filepath: parsed.filepath.clone(),
        options: IndexMap::new(),
        imports: IndexMap::new(),
        defs: Vec::new(),
        span,
    });
    r.scopes.proto_members.push(IndexMap::new());

    let scope = ScopeRef::Proto(proto_id);
    let stack = [scope];
    let mut imports: IndexMap<String, ProtoId> = IndexMap::new();
    let mut proto_options: IndexMap<String, Value> = IndexMap::new();
    let mut defs: Vec<DefId> = Vec::new();
    let mut import_idx = 0usize;

    for decl in &parsed.file.decls {
        match decl {
            Declaration::Import(import) => {
                let target = parsed
                    .import_targets
                    .get(import_idx)
                    .and_then(|idx| proto_ids.get(*idx).copied().flatten());
                import_idx += 1;
                let Some(target_id) = target else {
                    r.diags.push(CompileError::new(
                        ErrorKind::Internal,
                        import.span,
                        "import target was not loaded before its importer",
                    ));
                    continue;
                };

                let bind_name = import
                    .alias
                    .clone()
                    .unwrap_or_else(|| r.schema.proto(target_id).name.clone());

                if imports.values().any(|existing| *existing == target_id) {
                    r.diags.push(CompileError::new(
                        ErrorKind::DuplicateImport,
                        import.span,
                        format!("'{}' is already imported by this proto", import.path),
                    ));
                    continue;
                }
                if imports.contains_key(&bind_name) {
                    r.diags.push(CompileError::new(
                        ErrorKind::DuplicateImport,
                        import.span,
                        format!("import name '{}' already in use", bind_name),
                    ));
                    continue;
                }
                if r.scopes.proto_members[proto_id.index()].contains_key(&bind_name) {
                    r.diags.push(CompileError::warning(
                        ErrorKind::Lint,
                        import.span,
                        format!(
                            "import '{}' is hidden by a local definition of the same name",
                            bind_name
                        ),
                    ));
                }
                imports.insert(bind_name, target_id);
            }
            Declaration::Option(opt) => {
                resolve_option(r, &stack, &imports, opt, options::PROTO_OPTIONS, &mut proto_options)
            }
            Declaration::Const(c) => resolve_const(r, scope, &stack, &imports, proto_id, c, &mut defs),
            Declaration::Alias(a) => resolve_alias(r, scope, &stack, &imports, proto_id, a, &mut defs),
            Declaration::Enum(e) => resolve_enum(r, scope, &imports, proto_id, e, &mut defs),
            Declaration::Message(m) => {
                resolve_message(r, scope, &stack, &imports, proto_id, m, &mut defs)
            }
        }
    }

    let proto = &mut r.schema.protos[proto_id.index()];
    proto.imports = imports;
    proto.options = proto_options;
    proto.defs = defs;
    proto_id
}

/// Evaluates and validates one option assignment.
fn resolve_option(
    r: &mut Resolver,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
    decl: &bitproto_ast::ast::OptionDecl,
    descriptors: &[options::OptionDescriptor],
    out: &mut IndexMap<String, Value>,
) {
    let value = match eval_const_expr(&decl.value, &r.schema, &r.scopes, stack, imports) {
        Ok(value) => value,
        Err(err) => {
            r.diags.push(err);
            return;
        }
    };
    match options::validate_option(descriptors, &decl.name, &value, decl.span) {
        Ok(()) => {
            out.insert(decl.name.clone(), value);
        }
        Err(err) => r.diags.push(err),
    }
}

fn resolve_const(
    r: &mut Resolver,
    scope: ScopeRef,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
    proto_id: ProtoId,
    decl: &bitproto_ast::ast::ConstDecl,
    defs: &mut Vec<DefId>,
) {
    let value = match eval_const_expr(&decl.value, &r.schema, &r.scopes, stack, imports) {
        Ok(value) => value,
        Err(err) => {
            r.diags.push(err);
            return;
        }
    };
    let id = ConstId(r.schema.constants.len() as u32);
    r.schema.constants.push(Constant {
        name: decl.name.clone(),
        proto: proto_id,
        value,
        span: decl.span,
    });
    bind_def(r, scope, imports, &decl.name, DefId::Const(id), decl.span, defs);
}

fn resolve_alias(
    r: &mut Resolver,
    scope: ScopeRef,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
    proto_id: ProtoId,
    decl: &bitproto_ast::ast::AliasDecl,
    defs: &mut Vec<DefId>,
) {
    if decl.legacy_syntax {
        r.diags.push(CompileError::warning(
            ErrorKind::Lint,
            decl.span,
            format!(
                "keyword 'typedef' is deprecated, write 'type {} = ...'",
                decl.name
            ),
        ));
    }

    let target = match resolve_type_expr(&r.schema, &r.scopes, stack, imports, &decl.target) {
        Ok(target) => target,
        Err(err) => {
            r.diags.push(err);
            return;
        }
    };
    if let Err(err) = check_alias_target(&r.schema, &target, decl.span) {
        r.diags.push(err);
        return;
    }

    let id = bitproto_ast::ir::AliasId(r.schema.aliases.len() as u32);
    r.schema.aliases.push(Alias {
        name: decl.name.clone(),
        proto: proto_id,
        target,
        span: decl.span,
    });
    bind_def(r, scope, imports, &decl.name, DefId::Alias(id), decl.span, defs);
}

fn resolve_enum(
    r: &mut Resolver,
    scope: ScopeRef,
    imports: &IndexMap<String, ProtoId>,
    proto_id: ProtoId,
    decl: &bitproto_ast::ast::EnumDecl,
    defs: &mut Vec<DefId>,
) {
    let members = check_enum_decl(decl, &mut r.diags);
    if !(1..=64).contains(&decl.backing_nbits) {
        return;
    }

    let id = EnumId(r.schema.enums.len() as u32);
    r.schema.enums.push(Enum {
        name: decl.name.clone(),
        proto: proto_id,
        nbits: decl.backing_nbits as u8,
        members,
        span: decl.span,
    });
    bind_def(r, scope, imports, &decl.name, DefId::Enum(id), decl.span, defs);
}

fn resolve_message(
    r: &mut Resolver,
    parent_scope: ScopeRef,
    stack: &[ScopeRef],
    imports: &IndexMap<String, ProtoId>,
    proto_id: ProtoId,
    decl: &bitproto_ast::ast::MessageDecl,
    parent_defs: &mut Vec<DefId>,
) {
    let message_id = MessageId(r.schema.messages.len() as u32);
    r.schema.messages.push(Message {
        name: decl.name.clone(),
        proto: proto_id,
        extensible: decl.extensible,
        fields: Vec::new(),
        nested: Vec::new(),
        nbits: 0,
        max_bytes: None,
        span: decl.span,
    });
    r.scopes.message_members.push(IndexMap::new());

    let scope = ScopeRef::Message(message_id);
    let mut inner_stack = stack.to_vec();
    inner_stack.push(scope);

    let mut fields: Vec<Field> = Vec::new();
    let mut numbers: IndexMap<u8, Span> = IndexMap::new();
    let mut nested: Vec<DefId> = Vec::new();
    let mut message_options: IndexMap<String, Value> = IndexMap::new();

    for item in &decl.items {
        match item {
            MessageItem::Field(field) => {
                let ty = match resolve_type_expr(&r.schema, &r.scopes, &inner_stack, imports, &field.ty)
                {
                    Ok(ty) => ty,
                    Err(err) => {
                        r.diags.push(err);
                        continue;
                    }
                };
                if !(1..=255).contains(&field.number) {
                    r.diags.push(CompileError::new(
                        ErrorKind::InvalidFieldNumber,
                        field.span,
                        format!("field number {} outside 1..=255", field.number),
                    ));
                    continue;
                }
                let number = field.number as u8;
                if let Some(first) = numbers.get(&number) {
                    r.diags.push(
                        CompileError::new(
                            ErrorKind::InvalidFieldNumber,
                            field.span,
                            format!("field number {} already used", number),
                        )
                        .with_label(*first, "first used here"),
                    );
                    continue;
                }
                if !bind_field(r, scope, &field.name, field.span) {
                    continue;
                }
                numbers.insert(number, field.span);
                fields.push(Field {
                    name: field.name.clone(),
                    number,
                    ty,
                    span: field.span,
                });
            }
            MessageItem::Option(opt) => resolve_option(
                r,
                &inner_stack,
                imports,
                opt,
                options::MESSAGE_OPTIONS,
                &mut message_options,
            ),
            MessageItem::Const(c) => {
                resolve_const(r, scope, &inner_stack, imports, proto_id, c, &mut nested)
            }
            MessageItem::Alias(a) => {
                resolve_alias(r, scope, &inner_stack, imports, proto_id, a, &mut nested)
            }
            MessageItem::Enum(e) => resolve_enum(r, scope, imports, proto_id, e, &mut nested),
            MessageItem::Message(m) => {
                resolve_message(r, scope, &inner_stack, imports, proto_id, m, &mut nested)
            }
        }
    }

    // Wire order is ascending field number.
    fields.sort_by_key(|field| field.number);

    let payload: u64 = fields
        .iter()
        .map(|field| u64::from(r.schema.nbits_of(&field.ty)))
        .sum();
    let total = payload + if decl.extensible { 16 } else { 0 };
    if total > 65535 {
        r.diags.push(CompileError::new(
            ErrorKind::SizeOverflow,
            decl.span,
            format!(
                "message '{}' is {} bits, the maximum is 65535",
                decl.name, total
            ),
        ));
    }
    // Clamped when oversized; the error above already fails the build and
    // the clamp keeps downstream size arithmetic bounded.
    let nbits = total.min(65535) as u32;

    let max_bytes = message_options
        .get("max_bytes")
        .and_then(Value::as_int)
        .filter(|limit| *limit > 0)
        .map(|limit| limit as u32);
    if let Some(limit) = max_bytes {
        let nbytes = nbits.div_ceil(8);
        if nbytes > limit {
            r.diags.push(CompileError::new(
                ErrorKind::SizeOverflow,
                decl.span,
                format!(
                    "message '{}' is {} bytes, which exceeds max_bytes = {}",
                    decl.name, nbytes, limit
                ),
            ));
        }
    }

    debug!(message = %decl.name, nbits, "sized message");

    let message = &mut r.schema.messages[message_id.index()];
    message.fields = fields;
    message.nested = nested;
    message.nbits = nbits;
    message.max_bytes = max_bytes;

    // Bound after the body closes: a message is not in scope inside itself.
    bind_def(
        r,
        parent_scope,
        imports,
        &decl.name,
        DefId::Message(message_id),
        decl.span,
        parent_defs,
    );
}

/// Binds a definition name in a scope, reporting duplicates.
fn bind_def(
    r: &mut Resolver,
    scope: ScopeRef,
    imports: &IndexMap<String, ProtoId>,
    name: &str,
    def: DefId,
    span: Span,
    defs: &mut Vec<DefId>,
) {
    let table = r.scopes.table_mut(scope);
    if let Some(existing) = table.get(name) {
        let first = existing.span;
        r.diags.push(
            CompileError::new(
                ErrorKind::DuplicateName,
                span,
                format!("'{}' already defined in this scope", name),
            )
            .with_label(first, "first defined here"),
        );
        return;
    }
    table.insert(
        name.to_string(),
        Binding {
            member: Member::Def(def),
            span,
        },
    );
    defs.push(def);

    if matches!(scope, ScopeRef::Proto(_)) && imports.contains_key(name) {
        r.diags.push(CompileError::warning(
            ErrorKind::Lint,
            span,
            format!(
                "definition '{}' hides the imported proto of the same name",
                name
            ),
        ));
    }
}

/// Binds a field name in its message scope, reporting duplicates.
fn bind_field(r: &mut Resolver, scope: ScopeRef, name: &str, span: Span) -> bool {
    let table = r.scopes.table_mut(scope);
    if let Some(existing) = table.get(name) {
        let first = existing.span;
        r.diags.push(
            CompileError::new(
                ErrorKind::DuplicateName,
                span,
                format!("'{}' already defined in this message", name),
            )
            .with_label(first, "first defined here"),
        );
        return false;
    }
    table.insert(
        name.to_string(),
        Binding {
            member: Member::Field,
            span,
        },
    );
    true
}
