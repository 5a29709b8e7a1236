use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::cleanup_scope::{Cleanup, CleanupScope, with_cleanup_scope};
use crate::compiler_frontend::lvalue::collaborators::{
    AccessorCall, DeclResolver, EvalContext, InstructionEmitter, TypeLowering, ValueEmitter,
};
use crate::compiler_frontend::lvalue::lvalue_datatypes::{
    AccessorRef, DeclId, DeclKind, Declaration, IrType, IrValue, LoweredType, ManagedValue,
    RValue, SourceType, Substitution, TypeId, ValueCategory, ValueId,
};
use crate::compiler_frontend::lvalue::lvalue_expression::{Expr, ExprKind};
use crate::compiler_frontend::lvalue::lvalue_path::LvaluePath;
use crate::compiler_frontend::lvalue::path_builder::build_lvalue_path;
use crate::compiler_frontend::string_interning::StringTable;
use crate::return_compiler_error;
use crate::settings::LoweringConfig;
use rustc_hash::FxHashMap;

/// Everything the recording backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Instruction {
    Evaluate {
        kind: &'static str,
        result: ValueId,
    },
    DeclAddress {
        decl: DeclId,
        result: ValueId,
    },
    RefElementAddr {
        base: ValueId,
        field: DeclId,
        result: ValueId,
    },
    ElementAddr {
        base: ValueId,
        index: u32,
        result: ValueId,
    },
    Retain(ValueId),
    Release(ValueId),
    AllocTemporary {
        ty: TypeId,
        result: ValueId,
    },
    StoreInto {
        values: Vec<ValueId>,
        address: ValueId,
    },
    LoadFrom {
        address: ValueId,
        values: Vec<ValueId>,
    },
    DestroyTemporary(ValueId),
    DeallocTemporary(ValueId),
    GetProperty {
        accessor: AccessorRef,
        substitutions: Vec<Substitution>,
        receiver: Option<Vec<ValueId>>,
        subscripts: Option<Vec<ValueId>>,
        result: ValueId,
    },
    SetProperty {
        accessor: AccessorRef,
        substitutions: Vec<Substitution>,
        receiver: Option<Vec<ValueId>>,
        subscripts: Option<Vec<ValueId>>,
        values: Vec<ValueId>,
    },
}

/// A fake compiler backend with small lookup tables.
///
/// Computed properties behave like plain storage: a getter returns whatever the
/// setter last received for that declaration, so accessor pairs have no side effects.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) strings: StringTable,
    pub(crate) instructions: Vec<Instruction>,

    declarations: FxHashMap<DeclId, Declaration>,
    types: FxHashMap<TypeId, LoweredType>,
    layouts: FxHashMap<(TypeId, DeclId), u32>,
    decl_addresses: FxHashMap<DeclId, IrValue>,

    property_values: FxHashMap<DeclId, Vec<ManagedValue>>,
    temporary_contents: FxHashMap<ValueId, Vec<ManagedValue>>,

    // Evaluations that register a release, like a call returning a fresh reference
    owned_evaluations: bool,

    next_value: u32,
    next_decl: u32,
    next_type: u32,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        RecordingBackend::default()
    }

    pub(crate) fn declare(&mut self, name: &str, kind: DeclKind) -> DeclId {
        let id = DeclId(self.next_decl);
        self.next_decl += 1;

        let name = self.strings.intern(name);
        self.declarations.insert(id, Declaration { id, name, kind });
        id
    }

    pub(crate) fn value_type(&mut self) -> TypeId {
        self.add_type(false, true)
    }

    pub(crate) fn reference_type(&mut self) -> TypeId {
        self.add_type(true, true)
    }

    pub(crate) fn address_only_type(&mut self) -> TypeId {
        self.add_type(false, false)
    }

    fn add_type(&mut self, has_reference_semantics: bool, is_loadable: bool) -> TypeId {
        let ty = TypeId(self.next_type);
        self.next_type += 1;

        self.types.insert(
            ty,
            LoweredType {
                ty,
                has_reference_semantics,
                is_loadable,
            },
        );
        ty
    }

    pub(crate) fn set_layout(&mut self, aggregate: TypeId, field: DeclId, index: u32) {
        self.layouts.insert((aggregate, field), index);
    }

    pub(crate) fn set_owned_evaluations(&mut self, owned: bool) {
        self.owned_evaluations = owned;
    }

    pub(crate) fn property_value(&self, decl: DeclId) -> Option<Vec<ValueId>> {
        self.property_values
            .get(&decl)
            .map(|values| values.iter().map(|value| value.value.id).collect())
    }

    pub(crate) fn retains(&self) -> Vec<ValueId> {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Retain(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn releases(&self) -> Vec<ValueId> {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Release(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn evaluated_kinds(&self) -> Vec<&'static str> {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Evaluate { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn decl_address(&self, decl: DeclId) -> Option<IrValue> {
        self.decl_addresses.get(&decl).copied()
    }

    pub(crate) fn object_value(&mut self, ty: TypeId) -> IrValue {
        let lowered = self.lowered_or_value(ty);
        self.fresh_value(lowered.object_type())
    }

    pub(crate) fn address_value(&mut self, ty: TypeId) -> IrValue {
        let lowered = self.lowered_or_value(ty);
        self.fresh_value(lowered.address_type())
    }

    pub(crate) fn lowered_type_for_tests(&self, ty: TypeId) -> LoweredType {
        self.lowered_or_value(ty)
    }

    fn lowered_or_value(&self, ty: TypeId) -> LoweredType {
        self.types.get(&ty).copied().unwrap_or(LoweredType {
            ty,
            has_reference_semantics: false,
            is_loadable: true,
        })
    }

    fn fresh_value(&mut self, ty: IrType) -> IrValue {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        IrValue { id, ty }
    }
}

fn value_ids(rvalue: &Option<RValue>) -> Option<Vec<ValueId>> {
    rvalue.as_ref().map(RValue::value_ids)
}

impl ValueEmitter for RecordingBackend {
    fn emit_rvalue(
        &mut self,
        expr: &Expr,
        cleanups: &mut CleanupScope,
    ) -> Result<RValue, CompilerError> {
        let value = self.object_value(expr.ty.id);
        self.instructions.push(Instruction::Evaluate {
            kind: expr.kind_name(),
            result: value.id,
        });

        if self.owned_evaluations && value.has_reference_semantics() {
            let cleanup = cleanups.push(Cleanup::Release(value));
            return Ok(RValue::single(ManagedValue::owned(value, cleanup)));
        }

        Ok(RValue::single(ManagedValue::unmanaged(value)))
    }

    fn emit_reference_to_decl(
        &mut self,
        expr: &Expr,
        decl: DeclId,
    ) -> Result<ManagedValue, CompilerError> {
        if let Some(address) = self.decl_addresses.get(&decl) {
            return Ok(ManagedValue::lvalue(*address));
        }

        let address = self.address_value(expr.ty.id);
        self.decl_addresses.insert(decl, address);
        self.instructions.push(Instruction::DeclAddress {
            decl,
            result: address.id,
        });

        Ok(ManagedValue::lvalue(address))
    }
}

impl DeclResolver for RecordingBackend {
    fn declaration(&self, decl: DeclId) -> Option<&Declaration> {
        self.declarations.get(&decl)
    }
}

impl TypeLowering for RecordingBackend {
    fn lowered_type(&self, ty: TypeId) -> Result<LoweredType, CompilerError> {
        match self.types.get(&ty) {
            Some(lowered) => Ok(*lowered),
            None => return_compiler_error!("No lowering for {:?}", ty),
        }
    }

    fn index_of_member(&self, aggregate: TypeId, field: DeclId) -> Option<u32> {
        self.layouts.get(&(aggregate, field)).copied()
    }
}

impl InstructionEmitter for RecordingBackend {
    fn ref_element_addr(
        &mut self,
        base: &IrValue,
        field: DeclId,
        field_type: IrType,
    ) -> Result<IrValue, CompilerError> {
        let result = self.fresh_value(field_type);
        self.instructions.push(Instruction::RefElementAddr {
            base: base.id,
            field,
            result: result.id,
        });
        Ok(result)
    }

    fn element_addr(
        &mut self,
        base: &IrValue,
        index: u32,
        element_type: IrType,
    ) -> Result<IrValue, CompilerError> {
        let result = self.fresh_value(element_type);
        self.instructions.push(Instruction::ElementAddr {
            base: base.id,
            index,
            result: result.id,
        });
        Ok(result)
    }

    fn retain(&mut self, value: &IrValue) -> Result<(), CompilerError> {
        self.instructions.push(Instruction::Retain(value.id));
        Ok(())
    }

    fn release(&mut self, value: &IrValue) -> Result<(), CompilerError> {
        self.instructions.push(Instruction::Release(value.id));
        Ok(())
    }

    fn alloc_temporary(&mut self, ty: TypeId) -> Result<IrValue, CompilerError> {
        let result = self.address_value(ty);
        self.instructions.push(Instruction::AllocTemporary {
            ty,
            result: result.id,
        });
        Ok(result)
    }

    fn store_into(&mut self, value: RValue, address: &IrValue) -> Result<(), CompilerError> {
        self.instructions.push(Instruction::StoreInto {
            values: value.value_ids(),
            address: address.id,
        });
        self.temporary_contents.insert(address.id, value.values);
        Ok(())
    }

    fn load_from(&mut self, address: &IrValue) -> Result<RValue, CompilerError> {
        let values = self
            .temporary_contents
            .remove(&address.id)
            .unwrap_or_default();

        self.instructions.push(Instruction::LoadFrom {
            address: address.id,
            values: values.iter().map(|value| value.value.id).collect(),
        });

        Ok(RValue::new(values))
    }

    fn destroy_temporary(&mut self, address: &IrValue) -> Result<(), CompilerError> {
        self.temporary_contents.remove(&address.id);
        self.instructions
            .push(Instruction::DestroyTemporary(address.id));
        Ok(())
    }

    fn dealloc_temporary(&mut self, address: &IrValue) -> Result<(), CompilerError> {
        self.instructions
            .push(Instruction::DeallocTemporary(address.id));
        Ok(())
    }

    fn emit_get_property(&mut self, call: AccessorCall<'_>) -> Result<RValue, CompilerError> {
        let values = match self.property_values.get(&call.accessor.decl) {
            Some(values) => values.clone(),
            None => vec![ManagedValue::unmanaged(self.object_value(call.result_type))],
        };

        self.instructions.push(Instruction::GetProperty {
            accessor: call.accessor,
            substitutions: call.substitutions.to_vec(),
            receiver: value_ids(&call.receiver),
            subscripts: value_ids(&call.subscripts),
            result: values[0].value.id,
        });

        Ok(RValue::new(values))
    }

    fn emit_set_property(
        &mut self,
        call: AccessorCall<'_>,
        value: RValue,
    ) -> Result<(), CompilerError> {
        self.instructions.push(Instruction::SetProperty {
            accessor: call.accessor,
            substitutions: call.substitutions.to_vec(),
            receiver: value_ids(&call.receiver),
            subscripts: value_ids(&call.subscripts),
            values: value.value_ids(),
        });

        self.property_values.insert(call.accessor.decl, value.values);
        Ok(())
    }
}

// ------------------
// Expression helpers
// ------------------
pub(crate) fn lvalue_ref(decl: DeclId, ty: TypeId) -> Expr {
    Expr::decl_ref(decl, SourceType::lvalue(ty))
}

pub(crate) fn rvalue_ref(decl: DeclId, ty: TypeId) -> Expr {
    Expr::decl_ref(decl, SourceType::rvalue(ty))
}

pub(crate) fn member(base: Expr, member: DeclId, ty: TypeId) -> Expr {
    Expr::member_ref(base, member, SourceType::lvalue(ty))
}

pub(crate) fn int_literal(value: i64, ty: TypeId) -> Expr {
    Expr::new(
        ExprKind::IntegerLiteral(value),
        SourceType::rvalue(ty),
        Default::default(),
    )
}

pub(crate) fn with_value_category(value: IrValue, category: ValueCategory) -> IrValue {
    IrValue {
        id: value.id,
        ty: IrType {
            category,
            ..value.ty
        },
    }
}

/// Builds a path inside its own cleanup scope
pub(crate) fn build_path(
    backend: &mut RecordingBackend,
    expr: &Expr,
) -> Result<LvaluePath, CompilerError> {
    build_path_with_config(backend, expr, &LoweringConfig::default())
}

pub(crate) fn build_path_with_config(
    backend: &mut RecordingBackend,
    expr: &Expr,
    config: &LoweringConfig,
) -> Result<LvaluePath, CompilerError> {
    with_cleanup_scope(backend, |ctx| build_lvalue_path(ctx, config, expr))
}

/// Runs `body` against a fresh scope and hands the scope back without emitting it,
/// so tests can look at what is still pending.
pub(crate) fn with_open_scope<T>(
    backend: &mut RecordingBackend,
    body: impl FnOnce(&mut EvalContext<'_, RecordingBackend>) -> Result<T, CompilerError>,
) -> (Result<T, CompilerError>, CleanupScope) {
    let mut cleanups = CleanupScope::new();
    let result = {
        let mut ctx = EvalContext::new(backend, &mut cleanups);
        body(&mut ctx)
    };
    (result, cleanups)
}
