//! Scope tables and name lookup.

use bitproto_ast::foundation::{Path, Span};
use bitproto_ast::ir::{DefId, MessageId, ProtoId};
use indexmap::IndexMap;

/// What a name in a scope refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// A definition that can be referenced by name (type or constant).
    Def(DefId),
    /// A message field. Occupies its name in the scope (so a field and a
    /// nested type cannot share a name) but is never a reference target.
    Field,
}

/// A named scope entry with the span of its declaration.
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    pub member: Member,
    pub span: Span,
}

/// One scope's members, in declaration order.
pub type MemberTable = IndexMap<String, Binding>;

/// A frame on the resolution scope stack.
#[derive(Debug, Clone, Copy)]
pub enum ScopeRef {
    Proto(ProtoId),
    Message(MessageId),
}

/// Per-compilation member tables, indexed by id.
#[derive(Debug, Default)]
pub struct Scopes {
    pub proto_members: Vec<MemberTable>,
    pub message_members: Vec<MemberTable>,
}

impl Scopes {
    pub fn table(&self, scope: ScopeRef) -> &MemberTable {
        match scope {
            ScopeRef::Proto(id) => &self.proto_members[id.index()],
            ScopeRef::Message(id) => &self.message_members[id.index()],
        }
    }

    pub fn table_mut(&mut self, scope: ScopeRef) -> &mut MemberTable {
        match scope {
            ScopeRef::Proto(id) => &mut self.proto_members[id.index()],
            ScopeRef::Message(id) => &mut self.message_members[id.index()],
        }
    }

    /// Resolves a dotted path against a scope stack.
    ///
    /// The head segment is searched innermost-scope outward; remaining
    /// segments walk member tables (messages are scopes). When no local
    /// scope knows the head, the current proto's import table is consulted
    /// and the remaining path resolves inside the imported proto.
    pub fn lookup(
        &self,
        stack: &[ScopeRef],
        imports: &IndexMap<String, ProtoId>,
        path: &Path,
    ) -> Option<DefId> {
        let head = path.head()?;

        for scope in stack.iter().rev() {
            if let Some(binding) = self.table(*scope).get(head) {
                return match binding.member {
                    Member::Def(def) => self.walk(def, path.tail()),
                    Member::Field => None,
                };
            }
        }

        // Imported-proto dotted names: `alias.Type` or `alias.Nested.Type`.
        let target = *imports.get(head)?;
        let (next, rest) = path.tail().split_first()?;
        let binding = self.proto_members[target.index()].get(next.as_str())?;
        match binding.member {
            Member::Def(def) => self.walk(def, rest),
            Member::Field => None,
        }
    }

    /// Follows remaining path segments through nested message scopes.
    fn walk(&self, def: DefId, rest: &[String]) -> Option<DefId> {
        let Some((next, rest)) = rest.split_first() else {
            return Some(def);
        };
        match def {
            DefId::Message(id) => match self.message_members[id.index()].get(next.as_str()) {
                Some(binding) => match binding.member {
                    Member::Def(inner) => self.walk(inner, rest),
                    Member::Field => None,
                },
                None => None,
            },
            _ => None,
        }
    }
}
