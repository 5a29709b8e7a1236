//! Lvalue Display
//!
//! Compact renderings of paths for dev logs, and an indented node dump
//! that builder errors carry when `dump_rejected_nodes` is on.

use crate::compiler_frontend::lvalue::collaborators::DeclResolver;
use crate::compiler_frontend::lvalue::lvalue_datatypes::{
    AccessorKind, AccessorRef, DeclId, IrValue, TypeId, ValueId,
};
use crate::compiler_frontend::lvalue::lvalue_expression::{Expr, ExprKind};
use crate::compiler_frontend::lvalue::lvalue_path::LvaluePath;
use crate::compiler_frontend::lvalue::path_component::{
    LogicalComponent, PathComponent, PhysicalComponent,
};
use crate::compiler_frontend::string_interning::StringTable;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "type#{}", self.0)
    }
}

impl Display for DeclId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "decl#{}", self.0)
    }
}

impl Display for ValueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "%{}", self.0)
    }
}

impl Display for IrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.id)
    }
}

impl Display for AccessorRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let prefix = match self.kind {
            AccessorKind::Getter => "get",
            AccessorKind::Setter => "set",
        };

        write!(f, "{}#{}", prefix, self.decl.0)
    }
}

impl Display for PathComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PathComponent::Physical(PhysicalComponent::Address(component)) => {
                write!(f, "Address({})", component.stored_address())
            }
            PathComponent::Physical(PhysicalComponent::ReferenceRoot(component)) => {
                write!(f, "ReferenceRoot({})", component.reference().value)
            }
            PathComponent::Physical(PhysicalComponent::RefElement(component)) => {
                write!(f, "RefElement({})", component.field())
            }
            PathComponent::Physical(PhysicalComponent::Element(component)) => {
                write!(f, "Element({})", component.index())
            }
            PathComponent::Logical(LogicalComponent::Accessor(component)) => {
                write!(f, "Accessor({}, {}", component.getter(), component.setter())?;

                if !component.substitutions().is_empty() {
                    write!(f, ", <")?;
                    for (i, substitution) in component.substitutions().iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{} := {}", substitution.archetype, substitution.replacement)?;
                    }
                    write!(f, ">")?;
                }

                if component.subscript().is_some() {
                    write!(f, ", subscript")?;
                }

                write!(f, ")")
            }
        }
    }
}

impl Display for LvaluePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[")?;
        for (i, component) in self.components().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{component}")?;
        }
        write!(f, "]")
    }
}

/// A path with declaration names in place of IDs.
///
/// `[Address(%0), RefElement(count), Accessor(total)]`
pub struct NamedPath<'a, R: ?Sized> {
    pub path: &'a LvaluePath,
    pub decls: &'a R,
    pub strings: &'a StringTable,
}

impl<R: DeclResolver + ?Sized> NamedPath<'_, R> {
    fn decl_name(&self, decl: DeclId) -> String {
        match self.decls.declaration(decl) {
            Some(declaration) => self.strings.resolve(declaration.name).to_owned(),
            None => decl.to_string(),
        }
    }
}

impl<R: DeclResolver + ?Sized> Display for NamedPath<'_, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[")?;
        for (i, component) in self.path.components().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            match component {
                PathComponent::Physical(PhysicalComponent::RefElement(component)) => {
                    write!(f, "RefElement({})", self.decl_name(component.field()))?
                }
                PathComponent::Logical(LogicalComponent::Accessor(component)) => {
                    write!(f, "Accessor({}", self.decl_name(component.getter().decl))?;
                    if component.subscript().is_some() {
                        write!(f, "[..]")?;
                    }
                    write!(f, ")")?
                }
                other => write!(f, "{other}")?,
            }
        }
        write!(f, "]")
    }
}

/// One node per line, children indented under their parent.
pub struct ExprDump<'a>(pub &'a Expr);

impl ExprDump<'_> {
    fn write_node(f: &mut Formatter<'_>, expr: &Expr, depth: usize) -> FmtResult {
        write!(f, "{:indent$}{}", "", expr.kind_name(), indent = depth * 2)?;

        match &expr.kind {
            ExprKind::DeclRef { decl } => write!(f, " {decl}")?,
            ExprKind::MemberRef { member, .. } | ExprKind::GenericMemberRef { member, .. } => {
                write!(f, " .{member}")?
            }
            ExprKind::Subscript { decl, .. } | ExprKind::GenericSubscript { decl, .. } => {
                write!(f, " {decl}")?
            }
            ExprKind::TupleElement { field_number, .. } => write!(f, " .{field_number}")?,
            ExprKind::IntegerLiteral(value) => write!(f, " {value}")?,
            _ => {}
        }

        write!(f, " : {}", expr.ty.id)?;
        if expr.ty.is_lvalue {
            write!(f, " (lvalue)")?;
        }

        if !expr.location.is_unknown() {
            write!(f, " @ {}", expr.location)?;
        }

        for child in expr.children() {
            writeln!(f)?;
            Self::write_node(f, child, depth + 1)?;
        }

        Ok(())
    }
}

impl Display for ExprDump<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Self::write_node(f, self.0, 0)
    }
}
