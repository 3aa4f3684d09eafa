//! Legacy runtime family. Its behaviour is the baseline, so every
//! operation forwards unchanged.

use zeal_ir::{ClassDefinition, CompiledExpression, RoutineRef, SemanticType, SourceLocation, Value, Variable};

use super::{
    Backend, Baseline, CallDestination, CopySource, ForEachPlan, Indirection, InitCode, MemberKey,
    PropertyAccess, TypeDefinition,
};
use crate::stmt::StatementBlock;
use crate::{AccessFlags, CodegenResult, CompilationContext, RuntimeFamily};

#[derive(Copy, Clone, Debug)]
pub struct ZendEngine2 {
    base: &'static Baseline,
}

impl ZendEngine2 {
    pub const fn new(base: &'static Baseline) -> Self {
        ZendEngine2 { base }
    }
}

impl Backend for ZendEngine2 {
    fn family(&self) -> RuntimeFamily {
        RuntimeFamily::ZendEngine2
    }

    // -- Representation --

    fn type_definition(&self, ty: SemanticType) -> TypeDefinition {
        self.base.type_definition(ty)
    }

    fn variable_code(&self, variable: &Variable) -> String {
        self.base.variable_code(variable)
    }

    fn variable_code_pointer(&self, variable: &Variable) -> String {
        self.base.variable_code_pointer(variable)
    }

    fn init_code(
        &self,
        ty: SemanticType,
        indirection: Indirection,
        variable: &Variable,
    ) -> CodegenResult<InitCode> {
        self.base.init_code(ty, indirection, variable)
    }

    // -- Checks --

    fn bool_code(&self, variable: &Variable) -> String {
        self.base.bool_code(variable)
    }

    fn if_variable_value_undefined(&self, variable: &Variable) -> String {
        self.base.if_variable_value_undefined(variable)
    }

    fn if_variable_is_not_bool(&self, variable: &Variable) -> String {
        self.base.if_variable_is_not_bool(variable)
    }

    // -- Resolution --

    fn resolve_value(
        &self,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        self.base.resolve_value(value, ctx)
    }

    fn fetch_class_entry(&self, name: &str) -> String {
        self.base.fetch_class_entry(name)
    }

    // -- Assignment --

    fn assign_null(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) {
        self.base.assign_null(variable, ctx);
    }

    fn assign_bool(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>) {
        self.base.assign_bool(variable, code, ctx);
    }

    fn assign_long(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>) {
        self.base.assign_long(variable, code, ctx);
    }

    fn assign_double(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>) {
        self.base.assign_double(variable, code, ctx);
    }

    fn assign_string(&self, variable: &Variable, value: &str, ctx: &mut CompilationContext<'_>) {
        self.base.assign_string(variable, value, ctx);
    }

    fn assign_zval(
        &self,
        variable: &Variable,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.assign_zval(variable, value, ctx)
    }

    fn copy_on_write(
        &self,
        target: &Variable,
        source: CopySource<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.copy_on_write(target, source, ctx)
    }

    fn create_closure(
        &self,
        variable: &Variable,
        class: &ClassDefinition,
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.create_closure(variable, class, ctx);
    }

    fn return_string(&self, value: &str, ctx: &mut CompilationContext<'_>) {
        self.base.return_string(value, ctx);
    }

    // -- Collections --

    fn add_array_entry(
        &self,
        array: &Variable,
        key: Option<&CompiledExpression>,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        self.base.add_array_entry(array, key, value, location, ctx)
    }

    fn array_isset(
        &self,
        array: &Variable,
        key: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        self.base.array_isset(array, key, ctx)
    }

    fn array_unset(
        &self,
        array: &Variable,
        index: &CompiledExpression,
        flags: AccessFlags,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.array_unset(array, index, flags, ctx)
    }

    fn for_statement(
        &self,
        plan: &ForEachPlan<'_>,
        block: &mut StatementBlock<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.for_statement(plan, block, ctx)
    }

    // -- Members --

    fn fetch_property(
        &self,
        symbol: &Variable,
        object: &Variable,
        property: MemberKey<'_>,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.fetch_property(symbol, object, property, access, ctx);
    }

    fn fetch_static_property(
        &self,
        symbol: &Variable,
        class: &ClassDefinition,
        property: &str,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.fetch_static_property(symbol, class, property, access, ctx);
    }

    fn update_property(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.update_property(object, property, value, ctx)
    }

    fn update_static_property(
        &self,
        class_entry: &str,
        property: &str,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.update_static_property(class_entry, property, value, ctx)
    }

    fn property_isset(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CompiledExpression {
        self.base.property_isset(object, property, ctx)
    }

    fn call_method(
        &self,
        destination: CallDestination<'_>,
        object: &Variable,
        method: MemberKey<'_>,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.call_method(destination, object, method, cache, params, ctx);
    }

    fn call_function(
        &self,
        destination: CallDestination<'_>,
        name: &str,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.call_function(destination, name, cache, params, ctx);
    }

    fn fetch_class(
        &self,
        class_entry: &Variable,
        class_name: &str,
        guarded: bool,
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.fetch_class(class_entry, class_name, guarded, ctx);
    }

    fn fetch_global(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) -> String {
        self.base.fetch_global(variable, ctx)
    }

    fn set_symbol_if_separated(
        &self,
        separated: &Variable,
        variable: &Variable,
        ctx: &mut CompilationContext<'_>,
    ) {
        self.base.set_symbol_if_separated(separated, variable, ctx);
    }

    // -- Declarations --

    fn declare_constant(
        &self,
        ty: SemanticType,
        name: &str,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.declare_constant(ty, name, value, ctx)
    }

    fn internal_signature(&self, routine: RoutineRef<'_>) -> String {
        self.base.internal_signature(routine)
    }

    fn bind_parameters(
        &self,
        routine: RoutineRef<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.bind_parameters(routine, ctx)
    }

    // -- Lifecycle hooks --

    fn on_pre_init_var(
        &self,
        routine: RoutineRef<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> Option<String> {
        self.base.on_pre_init_var(routine, ctx)
    }

    fn on_pre_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>) {
        self.base.on_pre_compile(routine, ctx);
    }

    fn on_post_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>) {
        self.base.on_post_compile(routine, ctx);
    }
}
