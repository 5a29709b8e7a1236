//! ============================================================
//!                     Path Components
//! ============================================================
//! One step of an lvalue path.
//!
//! Physical components compute an address from the previous step's result.
//! Logical components have no address at all and go through a getter/setter pair.
//!
//! Base rules (checked on every call, a mismatch is a builder bug):
//!  - Root-only components never get a base
//!  - Field components always get one, and its representation must match
//!  - Accessor components take an address, a reference, or nothing when they are the root

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::accessor_args::prepare_accessor_args;
use crate::compiler_frontend::lvalue::cleanup_scope::Cleanup;
use crate::compiler_frontend::lvalue::collaborators::{
    AccessorCall, EvalContext, InstructionEmitter, ValueEmitter,
};
use crate::compiler_frontend::lvalue::lvalue_datatypes::{
    AccessorKind, AccessorRef, DeclId, IrValue, LoweredType, ManagedValue, Materialized, RValue,
    Substitution, TypeId,
};
use crate::compiler_frontend::lvalue::lvalue_expression::Expr;
use crate::{lvalue_log, return_compiler_error};

#[derive(Debug, Clone, PartialEq)]
pub enum PathComponent {
    Physical(PhysicalComponent),
    Logical(LogicalComponent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalComponent {
    Address(AddressComponent),
    ReferenceRoot(ReferenceRootComponent),
    RefElement(RefElementComponent),
    Element(ElementComponent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalComponent {
    Accessor(AccessorComponent),
}

impl PathComponent {
    pub fn object_type(&self) -> TypeId {
        match self {
            PathComponent::Physical(physical) => physical.object_type(),
            PathComponent::Logical(logical) => logical.object_type(),
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, PathComponent::Physical(_))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, PathComponent::Logical(_))
    }

    pub fn is_root_only(&self) -> bool {
        matches!(
            self,
            PathComponent::Physical(
                PhysicalComponent::Address(_) | PhysicalComponent::ReferenceRoot(_)
            )
        )
    }

    pub fn as_physical(&self) -> Option<&PhysicalComponent> {
        match self {
            PathComponent::Physical(physical) => Some(physical),
            PathComponent::Logical(_) => None,
        }
    }

    pub fn as_logical(&self) -> Option<&LogicalComponent> {
        match self {
            PathComponent::Logical(logical) => Some(logical),
            PathComponent::Physical(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PathComponent::Physical(PhysicalComponent::Address(_)) => "Address",
            PathComponent::Physical(PhysicalComponent::ReferenceRoot(_)) => "ReferenceRoot",
            PathComponent::Physical(PhysicalComponent::RefElement(_)) => "RefElement",
            PathComponent::Physical(PhysicalComponent::Element(_)) => "Element",
            PathComponent::Logical(LogicalComponent::Accessor(_)) => "Accessor",
        }
    }
}

impl From<AddressComponent> for PathComponent {
    fn from(component: AddressComponent) -> Self {
        PathComponent::Physical(PhysicalComponent::Address(component))
    }
}

impl From<ReferenceRootComponent> for PathComponent {
    fn from(component: ReferenceRootComponent) -> Self {
        PathComponent::Physical(PhysicalComponent::ReferenceRoot(component))
    }
}

impl From<RefElementComponent> for PathComponent {
    fn from(component: RefElementComponent) -> Self {
        PathComponent::Physical(PhysicalComponent::RefElement(component))
    }
}

impl From<ElementComponent> for PathComponent {
    fn from(component: ElementComponent) -> Self {
        PathComponent::Physical(PhysicalComponent::Element(component))
    }
}

impl From<AccessorComponent> for PathComponent {
    fn from(component: AccessorComponent) -> Self {
        PathComponent::Logical(LogicalComponent::Accessor(component))
    }
}

// ============================================================
// Physical
// ============================================================
impl PhysicalComponent {
    /// Computes this step's address from the previous step's result.
    /// Only addressing instructions are emitted, nothing is retained or copied.
    pub fn address<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
    ) -> Result<IrValue, CompilerError>
    where
        C: InstructionEmitter + ?Sized,
    {
        match self {
            PhysicalComponent::Address(component) => component.address(base),
            PhysicalComponent::ReferenceRoot(component) => component.address(base),
            PhysicalComponent::RefElement(component) => component.address(ctx, base),
            PhysicalComponent::Element(component) => component.address(ctx, base),
        }
    }

    pub fn object_type(&self) -> TypeId {
        match self {
            PhysicalComponent::Address(component) => component.address.ty.object,
            PhysicalComponent::ReferenceRoot(component) => component.value.value.ty.object,
            PhysicalComponent::RefElement(component) => component.field_type.ty,
            PhysicalComponent::Element(component) => component.element_type.ty,
        }
    }
}

/// Storage whose address was already computed, e.g. a stored local.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressComponent {
    address: IrValue,
}

impl AddressComponent {
    pub fn new(address: IrValue) -> Result<Self, CompilerError> {
        if !address.is_address() {
            return_compiler_error!(
                "Address component value must be an address" ;
                { ComponentKind => "Address", ExpectedBase => "address", FoundBase => address.ty.base_kind_name() }
            );
        }

        Ok(AddressComponent { address })
    }

    pub fn stored_address(&self) -> &IrValue {
        &self.address
    }

    fn address(&self, base: Option<&IrValue>) -> Result<IrValue, CompilerError> {
        expect_no_base("Address", base)?;
        Ok(self.address)
    }
}

/// A reference counted value that starts the path.
/// The next component does the dereferencing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRootComponent {
    value: ManagedValue,
}

impl ReferenceRootComponent {
    pub fn new(value: ManagedValue) -> Result<Self, CompilerError> {
        if value.value.is_address() || !value.value.has_reference_semantics() {
            return_compiler_error!(
                "Reference root component must hold a value of reference type" ;
                { ComponentKind => "ReferenceRoot", ExpectedBase => "reference", FoundBase => value.value.ty.base_kind_name() }
            );
        }

        Ok(ReferenceRootComponent { value })
    }

    pub fn reference(&self) -> &ManagedValue {
        &self.value
    }

    fn address(&self, base: Option<&IrValue>) -> Result<IrValue, CompilerError> {
        expect_no_base("ReferenceRoot", base)?;
        Ok(self.value.value)
    }
}

/// A stored field inside a reference counted object.
#[derive(Debug, Clone, PartialEq)]
pub struct RefElementComponent {
    field: DeclId,
    field_type: LoweredType,
}

impl RefElementComponent {
    pub fn new(field: DeclId, field_type: LoweredType) -> Self {
        RefElementComponent { field, field_type }
    }

    pub fn field(&self) -> DeclId {
        self.field
    }

    fn address<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
    ) -> Result<IrValue, CompilerError>
    where
        C: InstructionEmitter + ?Sized,
    {
        let base = expect_base("RefElement", base)?;

        if base.is_address() {
            return_compiler_error!(
                "Base for ref element component can't be an address" ;
                { ComponentKind => "RefElement", ExpectedBase => "reference", FoundBase => base.ty.base_kind_name() }
            );
        }

        if !base.has_reference_semantics() {
            return_compiler_error!(
                "Base for ref element component must be a reference type" ;
                { ComponentKind => "RefElement", ExpectedBase => "reference", FoundBase => base.ty.base_kind_name() }
            );
        }

        ctx.backend
            .ref_element_addr(base, self.field, self.field_type.address_type())
    }
}

/// An element of a value aggregate (struct field or tuple element) by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementComponent {
    index: u32,
    element_type: LoweredType,
}

impl ElementComponent {
    pub fn new(index: u32, element_type: LoweredType) -> Self {
        ElementComponent {
            index,
            element_type,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    fn address<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
    ) -> Result<IrValue, CompilerError>
    where
        C: InstructionEmitter + ?Sized,
    {
        let base = expect_base("Element", base)?;

        if !base.is_address() {
            return_compiler_error!(
                "Base for element component must be an address" ;
                { ComponentKind => "Element", ExpectedBase => "address", FoundBase => base.ty.base_kind_name() }
            );
        }

        if base.has_reference_semantics() {
            return_compiler_error!(
                "Can't get an element from the address of a reference type" ;
                { ComponentKind => "Element", ExpectedBase => "address", FoundBase => base.ty.base_kind_name() }
            );
        }

        ctx.backend
            .element_addr(base, self.index, self.element_type.address_type())
    }
}

// ============================================================
// Logical
// ============================================================
impl LogicalComponent {
    /// Reads the current value into a fresh temporary owned by the caller.
    pub fn load<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
    ) -> Result<Materialized, CompilerError>
    where
        C: ValueEmitter + InstructionEmitter + ?Sized,
    {
        match self {
            LogicalComponent::Accessor(component) => component.load(ctx, base),
        }
    }

    pub fn store<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
        value: RValue,
    ) -> Result<(), CompilerError>
    where
        C: ValueEmitter + InstructionEmitter + ?Sized,
    {
        match self {
            LogicalComponent::Accessor(component) => component.store(ctx, base, value),
        }
    }

    pub fn object_type(&self) -> TypeId {
        match self {
            LogicalComponent::Accessor(component) => component.subst_type,
        }
    }
}

/// A computed variable, property or subscript.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessorComponent {
    getter: AccessorRef,
    setter: AccessorRef,
    substitutions: Vec<Substitution>,
    subscript: Option<Expr>,
    subst_type: TypeId,
}

impl AccessorComponent {
    pub fn new(
        getter: AccessorRef,
        setter: AccessorRef,
        substitutions: Vec<Substitution>,
        subscript: Option<Expr>,
        subst_type: TypeId,
    ) -> Result<Self, CompilerError> {
        if getter.kind != AccessorKind::Getter || setter.kind != AccessorKind::Setter {
            return_compiler_error!(
                "Settable lvalue must have both a getter and a setter" ;
                { ComponentKind => "Accessor" }
            );
        }

        if getter.decl != setter.decl {
            return_compiler_error!(
                "Getter {:?} and setter {:?} belong to different declarations",
                getter.decl, setter.decl ;
                { ComponentKind => "Accessor" }
            );
        }

        Ok(AccessorComponent {
            getter,
            setter,
            substitutions,
            subscript,
            subst_type,
        })
    }

    pub fn getter(&self) -> AccessorRef {
        self.getter
    }

    pub fn setter(&self) -> AccessorRef {
        self.setter
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    pub fn subscript(&self) -> Option<&Expr> {
        self.subscript.as_ref()
    }

    fn load<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
    ) -> Result<Materialized, CompilerError>
    where
        C: ValueEmitter + InstructionEmitter + ?Sized,
    {
        let args = prepare_accessor_args(ctx, base, self.subscript.as_ref())?;

        let result = ctx.backend.emit_get_property(AccessorCall {
            accessor: self.getter,
            substitutions: &self.substitutions,
            receiver: args.receiver,
            subscripts: args.subscripts,
            result_type: self.subst_type,
        })?;

        materialize(ctx, result, self.subst_type)
    }

    fn store<C>(
        &self,
        ctx: &mut EvalContext<'_, C>,
        base: Option<&IrValue>,
        value: RValue,
    ) -> Result<(), CompilerError>
    where
        C: ValueEmitter + InstructionEmitter + ?Sized,
    {
        let args = prepare_accessor_args(ctx, base, self.subscript.as_ref())?;

        ctx.backend.emit_set_property(
            AccessorCall {
                accessor: self.setter,
                substitutions: &self.substitutions,
                receiver: args.receiver,
                subscripts: args.subscripts,
                result_type: self.subst_type,
            },
            value,
        )
    }
}

/// Moves a getter result into a new temporary.
/// The getter's storage is never handed out, so callers can't alias it.
fn materialize<C>(
    ctx: &mut EvalContext<'_, C>,
    value: RValue,
    ty: TypeId,
) -> Result<Materialized, CompilerError>
where
    C: InstructionEmitter + ?Sized,
{
    let address = ctx.backend.alloc_temporary(ty)?;

    // The temporary takes over ownership of the result
    for element in &value.values {
        if let Some(cleanup) = element.cleanup() {
            ctx.cleanups.forward(cleanup)?;
        }
    }

    ctx.backend.store_into(value, &address)?;
    let cleanup = ctx.cleanups.push(Cleanup::DestroyTemporary(address));

    lvalue_log!(format!(
        "[LVALUE][Materialize] Temporary {:?} for {:?}",
        address.id, ty
    ));

    Ok(Materialized { address, cleanup })
}

fn expect_no_base(component: &'static str, base: Option<&IrValue>) -> Result<(), CompilerError> {
    if let Some(base) = base {
        return_compiler_error!(
            "{} component must be the root of an lvalue path",
            component ;
            { ComponentKind => component, ExpectedBase => "none", FoundBase => base.ty.base_kind_name() }
        );
    }

    Ok(())
}

fn expect_base<'b>(
    component: &'static str,
    base: Option<&'b IrValue>,
) -> Result<&'b IrValue, CompilerError> {
    let Some(base) = base else {
        return_compiler_error!(
            "{} component can't be the root of an lvalue path",
            component ;
            { ComponentKind => component, FoundBase => "none" }
        );
    };

    Ok(base)
}
