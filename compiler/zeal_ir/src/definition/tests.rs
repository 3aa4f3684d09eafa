use pretty_assertions::assert_eq;

use super::*;

#[test]
fn class_entry_flattens_namespace() {
    let class = ClassDefinition::new("Test\\Sub", "Flow");
    assert_eq!(class.c_namespace(), "test_sub");
    assert_eq!(class.class_entry(), "test_sub_flow_ce");
    assert_eq!(class.complete_name(), "Test\\Sub\\Flow");
}

#[test]
fn class_entry_without_namespace() {
    let class = ClassDefinition::new("", "Flow");
    assert_eq!(class.class_entry(), "flow_ce");
    assert_eq!(class.complete_name(), "Flow");
}

#[test]
fn method_internal_name() {
    let class = ClassDefinition::new("Test", "Flow");
    let method = ClassMethod::new(&class, "testIf1");
    assert_eq!(method.internal_name(), "zep_test_Flow_testIf1");
    assert!(!method.is_initializer());
}

#[test]
fn initializer_keeps_plain_name() {
    let class = ClassDefinition::new("Test", "Flow");
    let method = ClassMethod::new(&class, "zephir_init_properties_Test_Flow").with_initializer(true);
    assert_eq!(method.internal_name(), "zephir_init_properties_Test_Flow");
    assert!(RoutineRef::Method(&method).is_property_initializer());
}

#[test]
fn function_internal_name() {
    let function = FunctionDefinition::new("Test", "greet");
    assert_eq!(function.internal_name(), "zephir_test_greet");
}
