use crate::compiler_frontend::lvalue::lvalue_datatypes::{DeclKind, TypeId};
use crate::compiler_frontend::lvalue::path_component::{PathComponent, PhysicalComponent};
use crate::compiler_frontend::lvalue::tests::lvalue_test_support::{
    RecordingBackend, build_path, lvalue_ref, member,
};
use proptest::prelude::*;

/// One `.field` step: whether the field's own type is a reference, and its layout slot
type Step = (bool, u32);

fn steps() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec((any::<bool>(), 0u32..8), 0..12)
}

proptest! {
    #[test]
    fn stored_member_chains_project_one_field_per_step(steps in steps()) {
        let mut backend = RecordingBackend::new();
        let root_type = backend.value_type();
        let root = backend.declare("root", DeclKind::StoredVar);

        let mut expr = lvalue_ref(root, root_type);
        let mut base_type: TypeId = root_type;
        let mut base_is_reference = false;

        for (i, (field_is_reference, index)) in steps.iter().copied().enumerate() {
            let field_type = if field_is_reference {
                backend.reference_type()
            } else {
                backend.value_type()
            };
            let field = backend.declare(&format!("field{i}"), DeclKind::StoredField);

            if !base_is_reference {
                backend.set_layout(base_type, field, index);
            }

            expr = member(expr, field, field_type);
            base_type = field_type;
            base_is_reference = field_is_reference;
        }

        let path = build_path(&mut backend, &expr).expect("stored chains always lower");

        prop_assert_eq!(path.len(), steps.len() + 1);
        prop_assert_eq!(path.root().kind_name(), "Address");
        prop_assert!(path.is_physical());
        prop_assert_eq!(path.object_type(), base_type);

        // A step projects out of its base, so the base's representation picks the component
        let mut previous_is_reference = false;
        for ((field_is_reference, index), component) in steps.iter().zip(&path.components()[1..]) {
            match component {
                PathComponent::Physical(PhysicalComponent::RefElement(_)) => {
                    prop_assert!(previous_is_reference);
                }
                PathComponent::Physical(PhysicalComponent::Element(element)) => {
                    prop_assert!(!previous_is_reference);
                    prop_assert_eq!(element.index(), *index);
                }
                other => prop_assert!(false, "unexpected component {}", other),
            }
            previous_is_reference = *field_is_reference;
        }

        // Nothing was evaluated, every base was lvalue typed
        prop_assert!(backend.evaluated_kinds().is_empty());
    }
}
