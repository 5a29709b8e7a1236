use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lvalue::lvalue_datatypes::TypeId;
use crate::compiler_frontend::lvalue::path_component::{PathComponent, PhysicalComponent};
use crate::return_compiler_error;
use crate::settings::EXPECTED_PATH_COMPONENTS;

/// An ordered chain of components, root first.
///
/// Each component after the root takes the previous component's result as its base.
/// Paths are built for a single read or write and then consumed, so this isn't `Clone`.
#[derive(Debug, PartialEq)]
pub struct LvaluePath {
    components: Vec<PathComponent>,
}

impl LvaluePath {
    pub fn with_root(root: impl Into<PathComponent>) -> Result<Self, CompilerError> {
        let root = root.into();

        if matches!(
            root,
            PathComponent::Physical(
                PhysicalComponent::RefElement(_) | PhysicalComponent::Element(_)
            )
        ) {
            return_compiler_error!(
                "{} component needs a base and can't start an lvalue path",
                root.kind_name() ;
                { ComponentKind => root.kind_name() }
            );
        }

        let mut components = Vec::with_capacity(EXPECTED_PATH_COMPONENTS);
        components.push(root);
        Ok(LvaluePath { components })
    }

    pub fn push(&mut self, component: impl Into<PathComponent>) -> Result<(), CompilerError> {
        let component = component.into();

        if component.is_root_only() {
            return_compiler_error!(
                "{} component must be the root of an lvalue path, but the path already has {} components",
                component.kind_name(),
                self.components.len() ;
                { ComponentKind => component.kind_name() }
            );
        }

        self.components.push(component);
        Ok(())
    }

    pub fn root(&self) -> &PathComponent {
        &self.components[0]
    }

    pub fn last(&self) -> &PathComponent {
        &self.components[self.components.len() - 1]
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn into_components(self) -> Vec<PathComponent> {
        self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    // Paths always have a root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The semantic type of the whole lvalue
    pub fn object_type(&self) -> TypeId {
        self.last().object_type()
    }

    /// True when every step has a real address, so the whole lvalue can be
    /// accessed through one final address.
    pub fn is_physical(&self) -> bool {
        self.components.iter().all(PathComponent::is_physical)
    }
}
