//! Type checked expressions, as they arrive at lvalue lowering.
//!
//! The node set is closed. Anything that isn't one of the assignable shapes below
//! reaches the builder as one of the trailing kinds and gets rejected there.

use crate::compiler_frontend::lvalue::lvalue_datatypes::{DeclId, SourceType, Substitution};
use crate::compiler_frontend::source_location::TextLocation;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: SourceType,
    pub location: TextLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A variable or property named directly
    DeclRef { decl: DeclId },

    /// `base.member`
    MemberRef { base: Box<Expr>, member: DeclId },

    /// `base.member` where the member belongs to a generic type
    GenericMemberRef {
        base: Box<Expr>,
        member: DeclId,
        substitutions: Vec<Substitution>,
    },

    /// `base[index]`
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
        decl: DeclId,
    },

    GenericSubscript {
        base: Box<Expr>,
        index: Box<Expr>,
        decl: DeclId,
        substitutions: Vec<Substitution>,
    },

    /// `base.0`
    TupleElement { base: Box<Expr>, field_number: u32 },

    // Wrappers that don't change which storage is named
    Materialize { sub_expr: Box<Expr> },
    Paren { sub_expr: Box<Expr> },
    AddressOf { sub_expr: Box<Expr> },
    Requalify { sub_expr: Box<Expr> },

    /// `lhs.rhs` where `lhs` is only evaluated for its side effects,
    /// e.g. a static member reached through an instance.
    DotSyntaxBaseIgnored { lhs: Box<Expr>, rhs: Box<Expr> },

    // Not assignable
    IntegerLiteral(i64),
    Call { callee: Box<Expr>, args: Vec<Expr> },
    Tuple { elements: Vec<Expr> },
}

impl Expr {
    pub fn new(kind: ExprKind, ty: SourceType, location: TextLocation) -> Self {
        Expr { kind, ty, location }
    }

    pub fn decl_ref(decl: DeclId, ty: SourceType) -> Self {
        Expr::new(ExprKind::DeclRef { decl }, ty, TextLocation::default())
    }

    pub fn member_ref(base: Expr, member: DeclId, ty: SourceType) -> Self {
        Expr::new(
            ExprKind::MemberRef {
                base: Box::new(base),
                member,
            },
            ty,
            TextLocation::default(),
        )
    }

    pub fn generic_member_ref(
        base: Expr,
        member: DeclId,
        substitutions: Vec<Substitution>,
        ty: SourceType,
    ) -> Self {
        Expr::new(
            ExprKind::GenericMemberRef {
                base: Box::new(base),
                member,
                substitutions,
            },
            ty,
            TextLocation::default(),
        )
    }

    pub fn subscript(base: Expr, index: Expr, decl: DeclId, ty: SourceType) -> Self {
        Expr::new(
            ExprKind::Subscript {
                base: Box::new(base),
                index: Box::new(index),
                decl,
            },
            ty,
            TextLocation::default(),
        )
    }

    pub fn generic_subscript(
        base: Expr,
        index: Expr,
        decl: DeclId,
        substitutions: Vec<Substitution>,
        ty: SourceType,
    ) -> Self {
        Expr::new(
            ExprKind::GenericSubscript {
                base: Box::new(base),
                index: Box::new(index),
                decl,
                substitutions,
            },
            ty,
            TextLocation::default(),
        )
    }

    pub fn tuple_element(base: Expr, field_number: u32, ty: SourceType) -> Self {
        Expr::new(
            ExprKind::TupleElement {
                base: Box::new(base),
                field_number,
            },
            ty,
            TextLocation::default(),
        )
    }

    pub fn dot_syntax_base_ignored(lhs: Expr, rhs: Expr) -> Self {
        let ty = rhs.ty;
        Expr::new(
            ExprKind::DotSyntaxBaseIgnored {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            ty,
            TextLocation::default(),
        )
    }

    /// Wraps `sub_expr` in a node that keeps its type
    pub fn wrap(self, wrapper: fn(Box<Expr>) -> ExprKind) -> Self {
        let ty = self.ty;
        let location = self.location;
        Expr::new(wrapper(Box::new(self)), ty, location)
    }

    pub fn at(mut self, location: TextLocation) -> Self {
        self.location = location;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::DeclRef { .. } => "DeclRef",
            ExprKind::MemberRef { .. } => "MemberRef",
            ExprKind::GenericMemberRef { .. } => "GenericMemberRef",
            ExprKind::Subscript { .. } => "Subscript",
            ExprKind::GenericSubscript { .. } => "GenericSubscript",
            ExprKind::TupleElement { .. } => "TupleElement",
            ExprKind::Materialize { .. } => "Materialize",
            ExprKind::Paren { .. } => "Paren",
            ExprKind::AddressOf { .. } => "AddressOf",
            ExprKind::Requalify { .. } => "Requalify",
            ExprKind::DotSyntaxBaseIgnored { .. } => "DotSyntaxBaseIgnored",
            ExprKind::IntegerLiteral(_) => "IntegerLiteral",
            ExprKind::Call { .. } => "Call",
            ExprKind::Tuple { .. } => "Tuple",
        }
    }

    /// Direct children, in evaluation order
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::DeclRef { .. } | ExprKind::IntegerLiteral(_) => vec![],
            ExprKind::MemberRef { base, .. }
            | ExprKind::GenericMemberRef { base, .. }
            | ExprKind::TupleElement { base, .. } => vec![base.as_ref()],
            ExprKind::Subscript { base, index, .. }
            | ExprKind::GenericSubscript { base, index, .. } => {
                vec![base.as_ref(), index.as_ref()]
            }
            ExprKind::Materialize { sub_expr }
            | ExprKind::Paren { sub_expr }
            | ExprKind::AddressOf { sub_expr }
            | ExprKind::Requalify { sub_expr } => vec![sub_expr.as_ref()],
            ExprKind::DotSyntaxBaseIgnored { lhs, rhs } => vec![lhs.as_ref(), rhs.as_ref()],
            ExprKind::Call { callee, args } => {
                let mut children = vec![callee.as_ref()];
                children.extend(args.iter());
                children
            }
            ExprKind::Tuple { elements } => elements.iter().collect(),
        }
    }
}
