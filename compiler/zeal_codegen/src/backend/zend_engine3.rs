//! Tagged-union runtime family.
//!
//! Dynamic values live inline (`zval x;`) and are handed to the runtime as
//! `&x`. Slots start out as `IS_UNDEF` instead of `NULL` pointers, thread
//! safety arguments are gone and collections are walked with the
//! `ZEND_HASH_FOREACH_*` macros. Everything else forwards to the baseline.

use zeal_ir::{
    ClassDefinition, CompiledExpression, GlobalValue, RoutineRef, SemanticType, SourceLocation,
    StorageClass, Value, Variable,
};

use super::baseline::{compile_iteration_body, FamilyStyle};
use super::{
    Backend, Baseline, CallDestination, CopySource, ForEachPlan, Indirection, InitCode, MemberKey,
    PropertyAccess, TypeDefinition,
};
use crate::stmt::StatementBlock;
use crate::utils::{escape_c_string, sl};
use crate::variable::{init_variant, observe_variant};
use crate::{AccessFlags, CodegenResult, CompilationContext, RuntimeFamily};

const STYLE: FamilyStyle = FamilyStyle {
    key: sl,
    string_dup: "",
    array_by_address: false,
};

const INLINE_ZVAL: TypeDefinition = TypeDefinition::value("zval");

#[derive(Copy, Clone, Debug)]
pub struct ZendEngine3 {
    base: &'static Baseline,
}

impl ZendEngine3 {
    pub const fn new(base: &'static Baseline) -> Self {
        ZendEngine3 { base }
    }

    fn code(&self, variable: &Variable) -> String {
        self.variable_code(variable)
    }
}

impl Backend for ZendEngine3 {
    fn family(&self) -> RuntimeFamily {
        RuntimeFamily::ZendEngine3
    }

    // -- Representation --

    fn type_definition(&self, ty: SemanticType) -> TypeDefinition {
        match ty {
            SemanticType::DynamicPtr => TypeDefinition::pointer("zval"),
            SemanticType::HashKeyIndex => TypeDefinition::value("zend_ulong"),
            SemanticType::HashKeyString => TypeDefinition::pointer("zend_string"),
            _ => {
                let definition = self.base.type_definition(ty);
                if definition.storage == "zval" {
                    INLINE_ZVAL
                } else {
                    definition
                }
            }
        }
    }

    /// Inline `zval`s are addressed; every other slot already is a handle.
    fn variable_code(&self, variable: &Variable) -> String {
        let name = variable.name();
        if variable.is_reserved()
            || variable.is_double_pointer()
            || self.type_definition(variable.ty()) != INLINE_ZVAL
        {
            name.to_owned()
        } else {
            format!("&{name}")
        }
    }

    fn variable_code_pointer(&self, variable: &Variable) -> String {
        self.variable_code(variable)
    }

    fn init_code(
        &self,
        ty: SemanticType,
        indirection: Indirection,
        variable: &Variable,
    ) -> CodegenResult<InitCode> {
        if ty.is_dynamic_container() && !variable.is_double_pointer() {
            let name = variable.name();
            return Ok(InitCode {
                declarator: name.to_owned(),
                init: Some(format!("ZVAL_UNDEF(&{name});")),
            });
        }
        self.base.init_code(ty, indirection, variable)
    }

    // -- Checks --

    fn bool_code(&self, variable: &Variable) -> String {
        format!("(Z_TYPE_P({}) == IS_TRUE)", self.code(variable))
    }

    fn if_variable_value_undefined(&self, variable: &Variable) -> String {
        format!("if (Z_TYPE_P({}) == IS_UNDEF) {{", self.code(variable))
    }

    fn if_variable_is_not_bool(&self, variable: &Variable) -> String {
        let code = self.code(variable);
        format!("if (unlikely(Z_TYPE_P({code}) != IS_TRUE && Z_TYPE_P({code}) != IS_FALSE)) {{")
    }

    // -- Resolution --

    /// The canonical value cells are not addressable here, so constants
    /// naming them are materialized like the literals.
    fn resolve_value(
        &self,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        if let Value::Global(constant) = value {
            let literal = match constant.canonical() {
                Some(GlobalValue::Null) => Value::Null,
                Some(GlobalValue::True) => Value::True,
                Some(GlobalValue::False) => Value::False,
                None => return Err(self.base.unknown_constant(constant.name(), ctx)),
            };
            return self.base.resolve_value(&literal, ctx);
        }
        self.base.resolve_value(value, ctx)
    }

    fn fetch_class_entry(&self, name: &str) -> String {
        format!("zephir_get_internal_ce({})", sl(name))
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
        ctx.output(&format!(
            "ZVAL_STRING({}, \"{}\");",
            self.code(variable),
            escape_c_string(value)
        ));
    }

    fn assign_zval(
        &self,
        variable: &Variable,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let resolved = self.resolve_value(value, ctx)?;
        ctx.output(&format!(
            "ZVAL_COPY_VALUE({}, {resolved});",
            self.code(variable)
        ));
        Ok(())
    }

    fn copy_on_write(
        &self,
        target: &Variable,
        source: CopySource<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        if let CopySource::CurrentException = source {
            let target = self.code(target);
            ctx.output(&format!("ZVAL_OBJ({target}, EG(exception));"));
            ctx.output(&format!("Z_ADDREF_P({target});"));
            return Ok(());
        }
        self.base.copy_on_write(target, source, ctx)
    }

    fn create_closure(
        &self,
        variable: &Variable,
        class: &ClassDefinition,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        ctx.output(&format!(
            "zephir_create_closure_ex({}, NULL, {}, {});",
            self.code(variable),
            class.class_entry(),
            sl("__invoke")
        ));
    }

    fn return_string(&self, value: &str, ctx: &mut CompilationContext<'_>) {
        ctx.output(&format!("RETURN_MM_STRING(\"{}\");", escape_c_string(value)));
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
        self.base
            .add_array_entry_styled(&STYLE, array, key, value, location, ctx)
    }

    fn array_isset(
        &self,
        array: &Variable,
        key: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        self.base.array_isset_styled(&STYLE, array, key, ctx)
    }

    fn array_unset(
        &self,
        array: &Variable,
        index: &CompiledExpression,
        flags: AccessFlags,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.array_unset_styled(&STYLE, array, index, flags, ctx)
    }

    /// One `ZEND_HASH_[REVERSE_]FOREACH_*` construct. The macro yields both
    /// key kinds; exactly one is populated per entry.
    fn for_statement(
        &self,
        plan: &ForEachPlan<'_>,
        block: &mut StatementBlock<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let entry = ctx
            .symbol_table
            .add_temp(SemanticType::DynamicPtr, StorageClass::Abi);
        let collection = self.code(plan.collection);
        tracing::trace!(
            collection = plan.collection.name(),
            reverse = plan.reverse,
            key = plan.key.is_some(),
            value = plan.value.is_some(),
            "foreach iteration"
        );

        ctx.headers.add("kernel/hash");
        let line = format!(
            "zephir_is_iterable({collection}, {}, {});",
            u8::from(plan.duplicate_collection),
            ctx.location_args(plan.location)
        );
        ctx.output(&line);

        let keys = plan.key.map(|_| {
            let index = ctx
                .symbol_table
                .add_temp(SemanticType::HashKeyIndex, StorageClass::Abi);
            let string = ctx
                .symbol_table
                .add_temp(SemanticType::HashKeyString, StorageClass::Abi);
            (index, string)
        });
        if let Some(value) = plan.value {
            observe_variant(value, ctx);
        }

        let reverse = if plan.reverse { "REVERSE_" } else { "" };
        let header = match (&keys, plan.value) {
            (Some((index, string)), Some(_)) => format!(
                "ZEND_HASH_{reverse}FOREACH_KEY_VAL(Z_ARRVAL_P({collection}), {}, {}, {})",
                index.name(),
                string.name(),
                entry.name()
            ),
            (Some((index, string)), None) => format!(
                "ZEND_HASH_{reverse}FOREACH_KEY(Z_ARRVAL_P({collection}), {}, {})",
                index.name(),
                string.name()
            ),
            (None, _) => format!(
                "ZEND_HASH_{reverse}FOREACH_VAL(Z_ARRVAL_P({collection}), {})",
                entry.name()
            ),
        };
        ctx.output(&header);
        ctx.output("{");

        if let (Some(key), Some((index, string))) = (plan.key, &keys) {
            let key_code = self.code(key);
            ctx.printer.increase_level();
            ctx.output(&format!("if ({} != NULL) {{", string.name()));
            ctx.printer.increase_level();
            if plan.duplicate_key {
                ctx.symbol_table.set_must_grow_stack(true);
                ctx.output(&format!("ZVAL_NEW_STR({key_code}, {});", string.name()));
            } else {
                ctx.output(&format!("ZVAL_STR({key_code}, {});", string.name()));
            }
            ctx.printer.decrease_level();
            ctx.output("} else {");
            ctx.printer.increase_level();
            ctx.output(&format!("ZVAL_LONG({key_code}, {});", index.name()));
            ctx.printer.decrease_level();
            ctx.output("}");
            ctx.printer.decrease_level();
        }

        if let Some(value) = plan.value {
            ctx.symbol_table.set_must_grow_stack(true);
            ctx.printer.increase_level();
            init_variant(value, ctx);
            ctx.output(&format!(
                "ZVAL_COPY({}, {});",
                self.code(value),
                self.code(&entry)
            ));
            ctx.printer.decrease_level();
        }

        compile_iteration_body(plan, block, ctx)?;
        ctx.output("} ZEND_HASH_FOREACH_END();");
        Ok(())
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
        ctx.headers.add("kernel/object");
        let symbol = self.code(symbol);
        let object = self.code(object);
        let flags = access.flags().render();
        let line = match property {
            MemberKey::Name(name) => format!(
                "zephir_read_property({symbol}, {object}, {}, {flags});",
                sl(name)
            ),
            MemberKey::Dynamic(name) => format!(
                "zephir_read_property_zval({symbol}, {object}, {}, {flags});",
                self.code(name)
            ),
        };
        ctx.output(&line);
    }

    fn fetch_static_property(
        &self,
        symbol: &Variable,
        class: &ClassDefinition,
        property: &str,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        ctx.output(&format!(
            "zephir_read_static_property_ce({}, {}, {}, {});",
            self.code(symbol),
            class.class_entry(),
            sl(property),
            access.flags().render()
        ));
    }

    fn update_property(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let value = self.resolve_value(value, ctx)?;
        ctx.headers.add("kernel/object");
        let object = self.code(object);
        let line = match property {
            MemberKey::Name(name) => {
                format!("zephir_update_property_zval({object}, {}, {value});", sl(name))
            }
            MemberKey::Dynamic(name) => format!(
                "zephir_update_property_zval_zval({object}, {}, {value});",
                self.code(name)
            ),
        };
        ctx.output(&line);
        Ok(())
    }

    fn update_static_property(
        &self,
        class_entry: &str,
        property: &str,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let value = self.resolve_value(value, ctx)?;
        ctx.headers.add("kernel/object");
        ctx.output(&format!(
            "zephir_update_static_property_ce({class_entry}, {}, {value});",
            sl(property)
        ));
        Ok(())
    }

    fn property_isset(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CompiledExpression {
        ctx.headers.add("kernel/object");
        let object = self.code(object);
        let check = match property {
            MemberKey::Name(name) => format!("zephir_isset_property({object}, {})", sl(name)),
            MemberKey::Dynamic(name) => {
                format!("zephir_isset_property_zval({object}, {})", self.code(name))
            }
        };
        CompiledExpression::bool(check, None)
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
        self.base
            .call_method(destination, object, method, cache, params, ctx);
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
        let lookup = format!(
            "{} = zephir_fetch_class_str_ex({}, ZEND_FETCH_CLASS_AUTO);",
            class_entry.name(),
            sl(class_name)
        );
        self.base.emit_guarded(class_entry, &lookup, guarded, ctx);
    }

    fn fetch_global(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) -> String {
        let name = variable.name();
        let line = format!("zephir_get_global(&{name}, {});", sl(name));
        ctx.output(&line);
        line
    }

    fn set_symbol_if_separated(
        &self,
        separated: &Variable,
        variable: &Variable,
        ctx: &mut CompilationContext<'_>,
    ) {
        let name = variable.name();
        ctx.output(&format!("if ({}) {{", separated.name()));
        ctx.printer.increase_level();
        ctx.output(&format!(
            "ZEPHIR_SET_SYMBOL(&EG(symbol_table), \"{name}\", &{name});"
        ));
        ctx.printer.decrease_level();
        ctx.output("}");
    }

    // -- Declarations --

    fn declare_constant(
        &self,
        ty: SemanticType,
        name: &str,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let (class_entry, kind, value) = self.base.constant_parts(ty, value, ctx)?;
        let line = match value {
            Some(value) => format!(
                "zephir_declare_class_constant_{kind}({class_entry}, {}, {value});",
                sl(name)
            ),
            None => format!(
                "zephir_declare_class_constant_null({class_entry}, {});",
                sl(name)
            ),
        };
        ctx.output(&line);
        Ok(())
    }

    fn internal_signature(&self, routine: RoutineRef<'_>) -> String {
        self.base.internal_signature_returning(routine, "zend_object *")
    }

    fn bind_parameters(
        &self,
        routine: RoutineRef<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.base.bind_parameters_with(
            routine,
            |count, slots| format!("zephir_fetch_params_without_memory_grow({count}, 0, {slots});"),
            ctx,
        )
    }

    // -- Lifecycle hooks --

    /// Non-internal methods fetch their receiver from the call frame.
    fn on_pre_init_var(
        &self,
        routine: RoutineRef<'_>,
        _ctx: &mut CompilationContext<'_>,
    ) -> Option<String> {
        match routine {
            RoutineRef::Function(_) => None,
            RoutineRef::Method(_) if routine.is_internal() => None,
            RoutineRef::Method(_) => Some("zval *this_ptr = getThis();".to_owned()),
        }
    }

    /// Property initializers run inside the object-creation handler and
    /// build the object they initialize.
    fn on_pre_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>) {
        if !routine.is_property_initializer() {
            return;
        }
        ctx.output("{");
        ctx.printer.increase_level();
        ctx.output("zval local_this_ptr, *this_ptr = &local_this_ptr;");
        ctx.output("ZEPHIR_CREATE_OBJECT(this_ptr, class_type);");
    }

    fn on_post_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>) {
        if !routine.is_property_initializer() {
            return;
        }
        ctx.output("return Z_OBJ_P(this_ptr);");
        ctx.printer.decrease_level();
        ctx.output("}");
    }
}

#[cfg(test)]
mod tests;
