//! Driving a built path
//!
//! Walks the components root first, feeding each result to the next as its base.
//! Logical steps in the middle of a path are loaded into temporaries.
//! A store through such a path writes each temporary back through its setter
//! afterwards, innermost first.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::cleanup_scope::Cleanup;
use crate::compiler_frontend::lvalue::collaborators::{
    EvalContext, InstructionEmitter, ValueEmitter,
};
use crate::compiler_frontend::lvalue::lvalue_datatypes::{IrValue, Materialized, RValue};
use crate::compiler_frontend::lvalue::lvalue_path::LvaluePath;
use crate::compiler_frontend::lvalue::path_component::{LogicalComponent, PathComponent};
use crate::{lvalue_log, return_compiler_error};

/// A logical step loaded into a temporary while a store happens further down the path
struct Writeback<'p> {
    component: &'p LogicalComponent,
    base: Option<IrValue>,
    temporary: Materialized,
}

/// Result of the last component.
///
/// An address for storage, or the reference itself when the path is a lone reference root.
/// Logical paths produce the address of a temporary holding the loaded value.
pub fn load_lvalue<C>(
    ctx: &mut EvalContext<'_, C>,
    path: &LvaluePath,
) -> Result<IrValue, CompilerError>
where
    C: ValueEmitter + InstructionEmitter + ?Sized,
{
    let (last, prefix) = split_path(path)?;
    let (base, _) = access_prefix(ctx, prefix, false)?;

    match last {
        PathComponent::Physical(physical) => physical.address(ctx, base.as_ref()),
        PathComponent::Logical(logical) => Ok(logical.load(ctx, base.as_ref())?.address),
    }
}

/// Writes `value` through the path, then writes back every logical step before the last.
pub fn store_lvalue<C>(
    ctx: &mut EvalContext<'_, C>,
    path: &LvaluePath,
    value: RValue,
) -> Result<(), CompilerError>
where
    C: ValueEmitter + InstructionEmitter + ?Sized,
{
    let (last, prefix) = split_path(path)?;
    let (base, writebacks) = access_prefix(ctx, prefix, true)?;

    match last {
        PathComponent::Physical(physical) => {
            let address = physical.address(ctx, base.as_ref())?;

            if !address.is_address() {
                return_compiler_error!(
                    "Can't store through a {} without a field or accessor step",
                    last.kind_name() ;
                    { ComponentKind => last.kind_name(), ExpectedBase => "address", FoundBase => address.ty.base_kind_name() }
                );
            }

            // The storage takes over ownership of the value
            for element in &value.values {
                if let Some(cleanup) = element.cleanup() {
                    ctx.cleanups.forward(cleanup)?;
                }
            }

            ctx.backend.store_into(value, &address)?;
        }
        PathComponent::Logical(logical) => logical.store(ctx, base.as_ref(), value)?,
    }

    for writeback in writebacks.into_iter().rev() {
        let temporary = writeback.temporary;
        lvalue_log!(format!("[LVALUE][Writeback] From temporary {}", temporary.address));

        // The contents move into the setter, only the storage is left to free
        let value = ctx.backend.load_from(&temporary.address)?;
        ctx.cleanups.forward(temporary.cleanup)?;
        ctx.cleanups.push(Cleanup::DeallocTemporary(temporary.address));

        writeback
            .component
            .store(ctx, writeback.base.as_ref(), value)?;
    }

    Ok(())
}

fn split_path(path: &LvaluePath) -> Result<(&PathComponent, &[PathComponent]), CompilerError> {
    match path.components().split_last() {
        Some(split) => Ok(split),
        None => return_compiler_error!("Lvalue path has no components"),
    }
}

fn access_prefix<'p, C>(
    ctx: &mut EvalContext<'_, C>,
    prefix: &'p [PathComponent],
    record_writebacks: bool,
) -> Result<(Option<IrValue>, Vec<Writeback<'p>>), CompilerError>
where
    C: ValueEmitter + InstructionEmitter + ?Sized,
{
    let mut base: Option<IrValue> = None;
    let mut writebacks = Vec::new();

    for component in prefix {
        let result = match component {
            PathComponent::Physical(physical) => physical.address(ctx, base.as_ref())?,
            PathComponent::Logical(logical) => {
                let temporary = logical.load(ctx, base.as_ref())?;

                if record_writebacks {
                    writebacks.push(Writeback {
                        component: logical,
                        base,
                        temporary,
                    });
                }

                temporary.address
            }
        };

        base = Some(result);
    }

    Ok((base, writebacks))
}
