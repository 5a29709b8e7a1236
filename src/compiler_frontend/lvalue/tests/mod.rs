mod lvalue_test_support;

mod path_builder_property_tests;
