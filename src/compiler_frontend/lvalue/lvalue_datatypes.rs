//! Values, types and declarations seen by lvalue lowering.
//!
//! Everything here is produced by the collaborators (value emission, type lowering,
//! declaration resolution). Lowering only inspects these, it never invents IDs itself.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::cleanup_scope::CleanupId;
use crate::compiler_frontend::string_interning::StringId;
use crate::return_compiler_error;

// ============================================================
// Stable IDs
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

// ============================================================
// Source types
// ============================================================

/// The static type of an expression before lowering.
///
/// `is_lvalue` marks expressions whose type denotes an assignable location
/// rather than a value, the way `inout` / byref types do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceType {
    pub id: TypeId,
    pub is_lvalue: bool,
}

impl SourceType {
    pub fn rvalue(id: TypeId) -> Self {
        SourceType {
            id,
            is_lvalue: false,
        }
    }

    pub fn lvalue(id: TypeId) -> Self {
        SourceType { id, is_lvalue: true }
    }
}

// ============================================================
// Lowered types
// ============================================================

/// A representation type handed back by type lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoweredType {
    pub ty: TypeId,

    /// Class-like types. Values of these are reference counted handles to an object.
    pub has_reference_semantics: bool,

    /// False for address-only types that can't be held in a register
    pub is_loadable: bool,
}

impl LoweredType {
    pub fn object_type(&self) -> IrType {
        IrType {
            object: self.ty,
            category: ValueCategory::Object,
            has_reference_semantics: self.has_reference_semantics,
        }
    }

    pub fn address_type(&self) -> IrType {
        IrType {
            object: self.ty,
            category: ValueCategory::Address,
            has_reference_semantics: self.has_reference_semantics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Object,
    Address,
}

/// The type of an emitted IR value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrType {
    pub object: TypeId,
    pub category: ValueCategory,
    pub has_reference_semantics: bool,
}

impl IrType {
    pub fn is_address(&self) -> bool {
        self.category == ValueCategory::Address
    }

    /// Names the representation kind for diagnostics
    pub fn base_kind_name(&self) -> &'static str {
        match (self.is_address(), self.has_reference_semantics) {
            (true, false) => "address",
            (false, true) => "reference",
            (true, true) => "address of reference",
            (false, false) => "loadable value",
        }
    }
}

// ============================================================
// Values
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrValue {
    pub id: ValueId,
    pub ty: IrType,
}

impl IrValue {
    pub fn is_address(&self) -> bool {
        self.ty.is_address()
    }

    pub fn has_reference_semantics(&self) -> bool {
        self.ty.has_reference_semantics
    }
}

/// Who is responsible for a value once it has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOwnership {
    /// Released by a cleanup registered in the current scope
    Owned(CleanupId),

    /// Borrowed view of existing storage. Never released.
    LValue,

    /// Trivial values, or ones someone else tracks
    Unmanaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagedValue {
    pub value: IrValue,
    pub ownership: ValueOwnership,
}

impl ManagedValue {
    pub fn owned(value: IrValue, cleanup: CleanupId) -> Self {
        ManagedValue {
            value,
            ownership: ValueOwnership::Owned(cleanup),
        }
    }

    pub fn lvalue(value: IrValue) -> Self {
        ManagedValue {
            value,
            ownership: ValueOwnership::LValue,
        }
    }

    pub fn unmanaged(value: IrValue) -> Self {
        ManagedValue {
            value,
            ownership: ValueOwnership::Unmanaged,
        }
    }

    pub fn cleanup(&self) -> Option<CleanupId> {
        match self.ownership {
            ValueOwnership::Owned(cleanup) => Some(cleanup),
            _ => None,
        }
    }
}

/// An evaluated expression, flattened into its element values.
/// Tuples become several values, everything else a single one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RValue {
    pub values: Vec<ManagedValue>,
}

impl RValue {
    pub fn new(values: Vec<ManagedValue>) -> Self {
        RValue { values }
    }

    pub fn single(value: ManagedValue) -> Self {
        RValue {
            values: vec![value],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_single_value(&self) -> Result<ManagedValue, CompilerError> {
        match self.values.as_slice() {
            [value] => Ok(*value),
            values => {
                return_compiler_error!(
                    "Expected a single value but the expression produced {}",
                    values.len() ; { CompilationStage => "Lvalue Lowering" }
                )
            }
        }
    }

    pub fn value_ids(&self) -> Vec<ValueId> {
        self.values.iter().map(|value| value.value.id).collect()
    }
}

/// A fresh temporary owned by the caller.
/// The cleanup destroys and deallocates it when the evaluation scope ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Materialized {
    pub address: IrValue,
    pub cleanup: CleanupId,
}

// ============================================================
// Declarations
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// Names one accessor function of a computed declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorRef {
    pub decl: DeclId,
    pub kind: AccessorKind,
}

impl AccessorRef {
    pub fn getter(decl: DeclId) -> Self {
        AccessorRef {
            decl,
            kind: AccessorKind::Getter,
        }
    }

    pub fn setter(decl: DeclId) -> Self {
        AccessorRef {
            decl,
            kind: AccessorKind::Setter,
        }
    }
}

/// Binds a generic parameter to a concrete type for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Substitution {
    pub archetype: TypeId,
    pub replacement: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Local or global variable with physical storage
    StoredVar,

    /// Struct or class field with physical storage
    StoredField,

    /// Variable or field backed by a getter and setter
    ComputedProperty,

    Subscript,

    /// Anything that isn't storage (functions, types)
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclId,
    pub name: StringId,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn is_accessor_backed(&self) -> bool {
        matches!(self.kind, DeclKind::ComputedProperty | DeclKind::Subscript)
    }

    pub fn is_stored(&self) -> bool {
        matches!(self.kind, DeclKind::StoredVar | DeclKind::StoredField)
    }

    /// Getter and setter for accessor backed declarations
    pub fn accessors(&self) -> Option<(AccessorRef, AccessorRef)> {
        if self.is_accessor_backed() {
            Some((AccessorRef::getter(self.id), AccessorRef::setter(self.id)))
        } else {
            None
        }
    }
}
