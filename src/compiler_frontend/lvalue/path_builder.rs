//! Lvalue Path Builder
//!
//! Turns an assignable expression into an `LvaluePath`.
//!
//! This stage:
//! - Picks a root component for storage named directly
//! - Appends one component per member, subscript or tuple element step
//! - Evaluates reference typed sub-expressions so they can start a path
//!
//! This stage does NOT:
//! - Emit the final load or store
//! - Check that the expression is assignable (earlier phases do that)

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::collaborators::{EvalContext, LvalueCollaborators};
use crate::compiler_frontend::lvalue::lvalue_datatypes::{
    DeclId, DeclKind, Declaration, Substitution,
};
use crate::compiler_frontend::lvalue::lvalue_display::ExprDump;
use crate::compiler_frontend::lvalue::lvalue_expression::{Expr, ExprKind};
use crate::compiler_frontend::lvalue::lvalue_path::LvaluePath;
use crate::compiler_frontend::lvalue::path_component::{
    AccessorComponent, AddressComponent, ElementComponent, RefElementComponent,
    ReferenceRootComponent,
};
use crate::settings::LoweringConfig;
use crate::{lvalue_log, return_lvalue_lowering_error};

// -----------
// Entry Point
// -----------
pub fn build_lvalue_path<C>(
    ctx: &mut EvalContext<'_, C>,
    config: &LoweringConfig,
    expr: &Expr,
) -> Result<LvaluePath, CompilerError>
where
    C: LvalueCollaborators + ?Sized,
{
    let mut builder = PathBuilder {
        ctx,
        config,
        depth: 0,
    };

    let path = builder.visit_rec(expr)?;
    lvalue_log!(format!("[LVALUE] Built {} from {}", path, expr.kind_name()));

    Ok(path)
}

struct PathBuilder<'b, 'a, C: ?Sized> {
    ctx: &'b mut EvalContext<'a, C>,
    config: &'b LoweringConfig,
    depth: usize,
}

impl<C> PathBuilder<'_, '_, C>
where
    C: LvalueCollaborators + ?Sized,
{
    /// Entry point for every sub-expression.
    ///
    /// Any expression of reference type can start a path, so that is checked
    /// before looking at what kind of node this is.
    fn visit_rec(&mut self, expr: &Expr) -> Result<LvaluePath, CompilerError> {
        if self.depth >= self.config.max_path_depth {
            return_lvalue_lowering_error!(
                format!(
                    "Lvalue nesting exceeds the configured limit of {}",
                    self.config.max_path_depth
                ),
                expr.location,
                { NodeKind => expr.kind_name(), PrimarySuggestion => "Raise max_path_depth in the [lowering] config" }
            );
        }

        self.depth += 1;
        let result = self.visit_rec_inner(expr);
        self.depth -= 1;

        result.map_err(|error| error.with_location(expr.location))
    }

    fn visit_rec_inner(&mut self, expr: &Expr) -> Result<LvaluePath, CompilerError> {
        if self.has_reference_semantics(expr)? {
            let rvalue = self.ctx.backend.emit_rvalue(expr, self.ctx.cleanups)?;
            let reference = rvalue.as_single_value()?;

            let path = LvaluePath::with_root(ReferenceRootComponent::new(reference)?)?;
            lvalue_log!(format!("[LVALUE] Reference root {}", path));
            return Ok(path);
        }

        self.visit(expr)
    }

    fn visit(&mut self, expr: &Expr) -> Result<LvaluePath, CompilerError> {
        match &expr.kind {
            ExprKind::DeclRef { decl } => self.visit_decl_ref(expr, *decl),

            ExprKind::MemberRef { base, member } => {
                self.visit_member_ref(expr, base, *member, &[])
            }
            ExprKind::GenericMemberRef {
                base,
                member,
                substitutions,
            } => self.visit_member_ref(expr, base, *member, substitutions),

            ExprKind::Subscript { base, index, decl } => {
                self.visit_subscript(expr, base, index, *decl, &[])
            }
            ExprKind::GenericSubscript {
                base,
                index,
                decl,
                substitutions,
            } => self.visit_subscript(expr, base, index, *decl, substitutions),

            ExprKind::TupleElement { base, field_number } => {
                self.visit_tuple_element(expr, base, *field_number)
            }

            ExprKind::Materialize { sub_expr }
            | ExprKind::Paren { sub_expr }
            | ExprKind::AddressOf { sub_expr } => self.visit_rec(sub_expr),

            ExprKind::Requalify { sub_expr } => {
                if !expr.ty.is_lvalue {
                    return self.reject(expr, "Requalify of a non-lvalue in an lvalue expression");
                }

                self.visit_rec(sub_expr)
            }

            ExprKind::DotSyntaxBaseIgnored { lhs, rhs } => {
                // Left side first, for its effects only. The right side starts a new path.
                self.ctx.backend.emit_ignored(lhs, self.ctx.cleanups)?;
                self.visit_rec(rhs)
            }

            ExprKind::IntegerLiteral(_) | ExprKind::Call { .. } | ExprKind::Tuple { .. } => {
                self.reject(expr, "Unimplemented lvalue expression")
            }
        }
    }

    fn visit_decl_ref(&mut self, expr: &Expr, decl: DeclId) -> Result<LvaluePath, CompilerError> {
        let declaration = self.declaration(expr, decl)?;

        // Computed variables go through their accessors
        if let Some((getter, setter)) = declaration.accessors() {
            let component = AccessorComponent::new(getter, setter, Vec::new(), None, expr.ty.id)?;
            return LvaluePath::with_root(component);
        }

        if !declaration.is_stored() {
            return self.reject(expr, "Declaration has no storage to assign to");
        }

        let address = self.ctx.backend.emit_reference_to_decl(expr, decl)?;
        LvaluePath::with_root(AddressComponent::new(address.value)?)
    }

    fn visit_member_ref(
        &mut self,
        expr: &Expr,
        base: &Expr,
        member: DeclId,
        substitutions: &[Substitution],
    ) -> Result<LvaluePath, CompilerError> {
        let mut path = self.visit_rec(base)?;
        let declaration = self.declaration(expr, member)?;

        if declaration.is_stored() {
            let base_type = self.ctx.backend.lowered_type(base.ty.id)?;
            let field_type = self.ctx.backend.lowered_type(expr.ty.id)?;

            if base_type.has_reference_semantics {
                path.push(RefElementComponent::new(member, field_type))?;
            } else {
                let Some(index) = self.ctx.backend.index_of_member(base_type.ty, member) else {
                    return self.reject(expr, "Stored field is missing from its aggregate's layout");
                };

                path.push(ElementComponent::new(index, field_type))?;
            }

            lvalue_log!(format!("[LVALUE] Stored member {}", path));
            return Ok(path);
        }

        let Some((getter, setter)) = declaration.accessors() else {
            return self.reject(expr, "Member is neither stored nor computed");
        };

        path.push(AccessorComponent::new(
            getter,
            setter,
            substitutions.to_vec(),
            None,
            expr.ty.id,
        )?)?;

        lvalue_log!(format!("[LVALUE] Computed member {}", path));
        Ok(path)
    }

    fn visit_subscript(
        &mut self,
        expr: &Expr,
        base: &Expr,
        index: &Expr,
        decl: DeclId,
        substitutions: &[Substitution],
    ) -> Result<LvaluePath, CompilerError> {
        let mut path = self.visit_rec(base)?;
        let declaration = self.declaration(expr, decl)?;

        if declaration.kind != DeclKind::Subscript {
            return self.reject(expr, "Subscript expression doesn't refer to a subscript");
        }

        let Some((getter, setter)) = declaration.accessors() else {
            return self.reject(expr, "Subscript has no accessors");
        };

        path.push(AccessorComponent::new(
            getter,
            setter,
            substitutions.to_vec(),
            Some(index.clone()),
            expr.ty.id,
        )?)?;

        lvalue_log!(format!("[LVALUE] Subscript {}", path));
        Ok(path)
    }

    fn visit_tuple_element(
        &mut self,
        expr: &Expr,
        base: &Expr,
        field_number: u32,
    ) -> Result<LvaluePath, CompilerError> {
        let mut path = self.visit_rec(base)?;
        let element_type = self.ctx.backend.lowered_type(expr.ty.id)?;

        // TODO: address-only tuple elements need an indirect element projection
        if !element_type.is_loadable {
            return self.reject(expr, "Address-only tuples are not supported");
        }

        path.push(ElementComponent::new(field_number, element_type))?;

        lvalue_log!(format!("[LVALUE] Tuple element {}", path));
        Ok(path)
    }

    // -------
    // Helpers
    // -------

    // Lvalue typed expressions name a location, so they never start a reference root
    fn has_reference_semantics(&self, expr: &Expr) -> Result<bool, CompilerError> {
        if expr.ty.is_lvalue {
            return Ok(false);
        }

        Ok(self.ctx.backend.lowered_type(expr.ty.id)?.has_reference_semantics)
    }

    fn declaration(&self, expr: &Expr, decl: DeclId) -> Result<Declaration, CompilerError> {
        match self.ctx.backend.declaration(decl) {
            Some(declaration) => Ok(declaration.clone()),
            None => self.reject(expr, "Expression refers to an unresolved declaration"),
        }
    }

    fn reject<T>(&self, expr: &Expr, reason: &str) -> Result<T, CompilerError> {
        let mut msg = format!("{reason} ({} node)", expr.kind_name());

        if self.config.dump_rejected_nodes {
            msg.push('\n');
            msg.push_str(&ExprDump(expr).to_string());
        }

        return_lvalue_lowering_error!(msg, expr.location, { NodeKind => expr.kind_name() })
    }
}
