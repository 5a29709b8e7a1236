//! Cleanup scope
//!
//! Every resource lvalue lowering creates (a retained accessor receiver, a materialized
//! temporary) is registered here when it is acquired. The scope emits the matching
//! release exactly once when the enclosing evaluation ends, whether it ended with
//! `Ok` or with a propagated error.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::collaborators::{EvalContext, InstructionEmitter};
use crate::compiler_frontend::lvalue::lvalue_datatypes::IrValue;
use crate::{lvalue_log, return_compiler_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CleanupId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cleanup {
    /// Drop one reference count
    Release(IrValue),

    /// Destroy the contents of a temporary and free its storage
    DestroyTemporary(IrValue),

    /// Free a temporary whose contents were already taken out
    DeallocTemporary(IrValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CleanupState {
    Active,

    // Ownership moved somewhere else, nothing to emit
    Forwarded,
}

#[derive(Debug, Default)]
pub struct CleanupScope {
    entries: Vec<(CleanupId, Cleanup, CleanupState)>,
    next_cleanup_id: u32,
}

impl CleanupScope {
    pub fn new() -> Self {
        CleanupScope::default()
    }

    pub fn push(&mut self, cleanup: Cleanup) -> CleanupId {
        let id = CleanupId(self.next_cleanup_id);
        self.next_cleanup_id += 1;
        self.entries.push((id, cleanup, CleanupState::Active));
        id
    }

    /// Disables a cleanup because its value was handed off with ownership.
    pub fn forward(&mut self, id: CleanupId) -> Result<Cleanup, CompilerError> {
        let Some(entry) = self.entries.iter_mut().find(|(entry_id, ..)| *entry_id == id) else {
            return_compiler_error!("Cleanup {:?} is not registered in this scope", id);
        };

        if entry.2 == CleanupState::Forwarded {
            return_compiler_error!("Cleanup {:?} was already forwarded", id);
        }

        entry.2 = CleanupState::Forwarded;
        Ok(entry.1)
    }

    pub fn is_active(&self, id: CleanupId) -> bool {
        self.entries
            .iter()
            .any(|(entry_id, _, state)| *entry_id == id && *state == CleanupState::Active)
    }

    /// Active cleanups in the order they were registered
    pub fn pending(&self) -> impl Iterator<Item = &Cleanup> {
        self.entries
            .iter()
            .filter(|(_, _, state)| *state == CleanupState::Active)
            .map(|(_, cleanup, _)| cleanup)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Emits every active cleanup, newest first, and empties the scope.
    ///
    /// All cleanups are emitted even if one of them fails.
    /// The first failure is returned.
    pub fn emit_cleanups<C>(&mut self, backend: &mut C) -> Result<(), CompilerError>
    where
        C: InstructionEmitter + ?Sized,
    {
        let mut first_error = None;

        for (_, cleanup, state) in self.entries.drain(..).rev() {
            if state == CleanupState::Forwarded {
                continue;
            }

            lvalue_log!(format!("[LVALUE][Cleanup] Emitting {:?}", cleanup));

            let result = match cleanup {
                Cleanup::Release(value) => backend.release(&value),
                Cleanup::DestroyTemporary(address) => backend.destroy_temporary(&address),
                Cleanup::DeallocTemporary(address) => backend.dealloc_temporary(&address),
            };

            if let Err(error) = result {
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Runs `body` with a fresh cleanup scope and emits the scope's cleanups afterwards.
///
/// Cleanups run on both exit paths. An error from `body` takes priority over
/// an error from the cleanups.
pub fn with_cleanup_scope<C, T>(
    backend: &mut C,
    body: impl FnOnce(&mut EvalContext<'_, C>) -> Result<T, CompilerError>,
) -> Result<T, CompilerError>
where
    C: InstructionEmitter + ?Sized,
{
    let mut cleanups = CleanupScope::new();

    let result = {
        let mut ctx = EvalContext::new(&mut *backend, &mut cleanups);
        body(&mut ctx)
    };

    let cleanup_result = cleanups.emit_cleanups(backend);

    match (result, cleanup_result) {
        (Err(error), _) => Err(error),
        (Ok(_), Err(error)) => Err(error),
        (Ok(value), Ok(())) => Ok(value),
    }
}
