//! Accessor argument preparation
//!
//! Getter and setter calls take a receiver (the previous path step) and optionally
//! the evaluated subscript index. This runs again for every load and store,
//! since the index expression or the receiver may have changed in between.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::cleanup_scope::Cleanup;
use crate::compiler_frontend::lvalue::collaborators::{
    EvalContext, InstructionEmitter, ValueEmitter,
};
use crate::compiler_frontend::lvalue::lvalue_datatypes::{IrValue, ManagedValue, RValue};
use crate::compiler_frontend::lvalue::lvalue_expression::Expr;
use crate::{lvalue_log, return_compiler_error};

/// Arguments for one accessor call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessorArgs {
    pub receiver: Option<RValue>,
    pub subscripts: Option<RValue>,
}

/// Builds the receiver and subscript arguments for an accessor call.
///
/// - No base: no receiver
/// - Reference base: retained once, with one release registered in the cleanup scope.
///   Evaluating the call can reassign whatever held the original reference,
///   so the callee has to get its own.
/// - Address base: passed as a borrowed view of the storage. No retain, no copy.
pub fn prepare_accessor_args<C>(
    ctx: &mut EvalContext<'_, C>,
    base: Option<&IrValue>,
    subscript: Option<&Expr>,
) -> Result<AccessorArgs, CompilerError>
where
    C: ValueEmitter + InstructionEmitter + ?Sized,
{
    let receiver = match base {
        None => None,
        Some(base) => Some(RValue::single(prepare_receiver(ctx, base)?)),
    };

    let subscripts = match subscript {
        Some(index) => Some(ctx.backend.emit_rvalue(index, ctx.cleanups)?),
        None => None,
    };

    Ok(AccessorArgs {
        receiver,
        subscripts,
    })
}

fn prepare_receiver<C>(
    ctx: &mut EvalContext<'_, C>,
    base: &IrValue,
) -> Result<ManagedValue, CompilerError>
where
    C: InstructionEmitter + ?Sized,
{
    // Exactly one of these has to hold
    if base.is_address() == base.has_reference_semantics() {
        return_compiler_error!(
            "Base of an accessor component must be absent, an address, or a reference" ;
            {
                ComponentKind => "Accessor",
                ExpectedBase => "address or reference",
                FoundBase => base.ty.base_kind_name(),
            }
        );
    }

    if base.has_reference_semantics() {
        ctx.backend.retain(base)?;
        let cleanup = ctx.cleanups.push(Cleanup::Release(*base));

        lvalue_log!(format!(
            "[LVALUE][Accessor] Retained receiver {:?} ({:?})",
            base.id, cleanup
        ));

        return Ok(ManagedValue::owned(*base, cleanup));
    }

    Ok(ManagedValue::lvalue(*base))
}
