//! Interfaces lvalue lowering needs from the rest of the compiler.
//!
//! Expression emission, type lowering, declaration lookup and instruction building
//! all live outside this module. Lowering drives them through these traits.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::cleanup_scope::CleanupScope;
use crate::compiler_frontend::lvalue::lvalue_datatypes::{
    AccessorRef, DeclId, Declaration, IrType, IrValue, LoweredType, ManagedValue, RValue,
    Substitution, TypeId,
};
use crate::compiler_frontend::lvalue::lvalue_expression::Expr;

/// Evaluates expressions to values.
pub trait ValueEmitter {
    /// Evaluates `expr` as an rvalue.
    /// Owned results must have their cleanups registered in `cleanups`.
    fn emit_rvalue(
        &mut self,
        expr: &Expr,
        cleanups: &mut CleanupScope,
    ) -> Result<RValue, CompilerError>;

    /// Evaluates `expr` for its side effects only.
    fn emit_ignored(
        &mut self,
        expr: &Expr,
        cleanups: &mut CleanupScope,
    ) -> Result<(), CompilerError> {
        self.emit_rvalue(expr, cleanups).map(|_| ())
    }

    /// The storage of a declaration named directly by `expr`.
    fn emit_reference_to_decl(
        &mut self,
        expr: &Expr,
        decl: DeclId,
    ) -> Result<ManagedValue, CompilerError>;
}

pub trait DeclResolver {
    fn declaration(&self, decl: DeclId) -> Option<&Declaration>;
}

pub trait TypeLowering {
    fn lowered_type(&self, ty: TypeId) -> Result<LoweredType, CompilerError>;

    /// Position of a stored field inside a value aggregate's layout
    fn index_of_member(&self, aggregate: TypeId, field: DeclId) -> Option<u32>;
}

/// Everything an accessor call needs apart from the value being stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorCall<'a> {
    pub accessor: AccessorRef,
    pub substitutions: &'a [Substitution],
    pub receiver: Option<RValue>,
    pub subscripts: Option<RValue>,
    pub result_type: TypeId,
}

/// Builds the instructions lvalue components are made of.
pub trait InstructionEmitter {
    /// Address of a stored field inside a reference counted object
    fn ref_element_addr(
        &mut self,
        base: &IrValue,
        field: DeclId,
        field_type: IrType,
    ) -> Result<IrValue, CompilerError>;

    /// Address of the element at `index` inside a value aggregate
    fn element_addr(
        &mut self,
        base: &IrValue,
        index: u32,
        element_type: IrType,
    ) -> Result<IrValue, CompilerError>;

    fn retain(&mut self, value: &IrValue) -> Result<(), CompilerError>;

    fn release(&mut self, value: &IrValue) -> Result<(), CompilerError>;

    fn alloc_temporary(&mut self, ty: TypeId) -> Result<IrValue, CompilerError>;

    /// Initializes the storage at `address` with `value`, taking ownership of it
    fn store_into(&mut self, value: RValue, address: &IrValue) -> Result<(), CompilerError>;

    /// Takes the current value out of the storage at `address`
    fn load_from(&mut self, address: &IrValue) -> Result<RValue, CompilerError>;

    /// Destroys whatever the temporary still holds, then frees it
    fn destroy_temporary(&mut self, address: &IrValue) -> Result<(), CompilerError>;

    /// Frees the temporary's storage without touching its contents
    fn dealloc_temporary(&mut self, address: &IrValue) -> Result<(), CompilerError>;

    fn emit_get_property(&mut self, call: AccessorCall<'_>) -> Result<RValue, CompilerError>;

    fn emit_set_property(
        &mut self,
        call: AccessorCall<'_>,
        value: RValue,
    ) -> Result<(), CompilerError>;
}

/// All the collaborators together, as the path builder needs them.
pub trait LvalueCollaborators: ValueEmitter + DeclResolver + TypeLowering + InstructionEmitter {}

impl<T> LvalueCollaborators for T where
    T: ValueEmitter + DeclResolver + TypeLowering + InstructionEmitter + ?Sized
{
}

/// The state of one expression evaluation.
pub struct EvalContext<'a, C: ?Sized> {
    pub backend: &'a mut C,
    pub cleanups: &'a mut CleanupScope,
}

impl<'a, C: ?Sized> EvalContext<'a, C> {
    pub fn new(backend: &'a mut C, cleanups: &'a mut CleanupScope) -> Self {
        EvalContext { backend, cleanups }
    }
}
