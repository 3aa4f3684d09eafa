//! Baseline operation set, rendered for the legacy `zval *` value model.
//!
//! Both runtime families hold a `&'static Baseline`. Anything that depends
//! on the active family (access codes, assignments) is called through
//! `ctx.backend()` so the newer family's overrides reach shared code.

use smallvec::SmallVec;
use zeal_ir::{
    ClassDefinition, CompiledExpression, GlobalValue, RoutineRef, SemanticType, SourceLocation,
    StorageClass, Value, Variable,
};

use super::{
    is_coerced_parameter, CallDestination, CopySource, ForEachPlan, Indirection, InitCode,
    MemberKey, PropertyAccess, TypeDefinition,
};
use crate::stmt::StatementBlock;
use crate::utils::{escape_c_string, sl, ss};
use crate::variable::init_variant;
use crate::{AccessFlags, CodegenError, CodegenResult, CompilationContext};

/// Character literals longer than this many bytes (quotes included) are rejected.
const MAX_CHAR_LITERAL: usize = 4;

/// Spelling differences between the families that do not warrant a full
/// override of the collection helpers.
#[derive(Copy, Clone, Debug)]
pub(crate) struct FamilyStyle {
    /// Key/length argument pair for a literal hash key.
    pub key: fn(&str) -> String,
    /// Trailing argument of string-copying helpers.
    pub string_dup: &'static str,
    /// Arrays are handed to append/update/unset helpers by slot address.
    pub array_by_address: bool,
}

pub(crate) const LEGACY_STYLE: FamilyStyle = FamilyStyle {
    key: ss,
    string_dup: ", 1",
    array_by_address: true,
};

/// How a literal hash key addresses an entry.
enum EntryKey {
    Append,
    Index(String),
    Assoc(String),
    Dynamic(Variable),
}

fn code(ctx: &CompilationContext<'_>, variable: &Variable) -> String {
    ctx.backend().variable_code(variable)
}

fn pointer(ctx: &CompilationContext<'_>, variable: &Variable) -> String {
    ctx.backend().variable_code_pointer(variable)
}

fn array_code(style: &FamilyStyle, ctx: &CompilationContext<'_>, array: &Variable) -> String {
    if style.array_by_address {
        pointer(ctx, array)
    } else {
        code(ctx, array)
    }
}

/// `add_*` suffix for values of type `ty`.
fn entry_type(ty: SemanticType) -> Option<&'static str> {
    match ty {
        SemanticType::Int | SemanticType::UInt | SemanticType::Long | SemanticType::ULong => {
            Some("long")
        }
        SemanticType::Double => Some("double"),
        SemanticType::Bool => Some("bool"),
        SemanticType::String => Some("stringl"),
        SemanticType::Variable | SemanticType::Array => Some("zval"),
        _ => None,
    }
}

pub(crate) fn join_params(params: &[String]) -> String {
    params.iter().map(|param| format!(", {param}")).collect()
}

/// Shared body of every collection iteration.
pub(crate) fn compile_iteration_body(
    plan: &ForEachPlan<'_>,
    block: &mut StatementBlock<'_>,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    block.set_loop(true);
    if let Some(key) = plan.key {
        block.mutations_mut().increase_mutations(key.name());
    }
    if let Some(value) = plan.value {
        block.mutations_mut().increase_mutations(value.name());
    }
    block.compile(ctx)
}

/// Shared operation set of both families.
#[derive(Copy, Clone, Debug, Default)]
pub struct Baseline;

impl Baseline {
    // -- Representation --

    pub fn type_definition(&self, ty: SemanticType) -> TypeDefinition {
        match ty {
            SemanticType::Int => TypeDefinition::value("zend_long"),
            SemanticType::UInt => TypeDefinition::value("zend_ulong"),
            SemanticType::Long => TypeDefinition::value("long"),
            SemanticType::ULong => TypeDefinition::value("unsigned long"),
            SemanticType::Double => TypeDefinition::value("double"),
            SemanticType::Bool => TypeDefinition::value("zend_bool"),
            SemanticType::Char => TypeDefinition::value("char"),
            SemanticType::UChar => TypeDefinition::value("unsigned char"),
            SemanticType::String
            | SemanticType::Array
            | SemanticType::Object
            | SemanticType::Callable
            | SemanticType::Resource
            | SemanticType::Variable
            | SemanticType::Null
            | SemanticType::DynamicPtr => TypeDefinition::pointer("zval"),
            SemanticType::HashKeyIndex => TypeDefinition::value("ulong"),
            SemanticType::HashKeyString => TypeDefinition::pointer("char"),
            SemanticType::HashTable => TypeDefinition::pointer("HashTable"),
            SemanticType::HashPosition => TypeDefinition::value("HashPosition"),
            SemanticType::ClassEntry => TypeDefinition::pointer("zend_class_entry"),
            SemanticType::FcallCache => TypeDefinition::pointer("zephir_fcall_cache_entry"),
        }
    }

    /// Every slot already is a pointer, so the bare name is the handle.
    pub fn variable_code(&self, variable: &Variable) -> String {
        variable.name().to_owned()
    }

    pub fn variable_code_pointer(&self, variable: &Variable) -> String {
        format!("&{}", variable.name())
    }

    pub fn init_code(
        &self,
        ty: SemanticType,
        indirection: Indirection,
        variable: &Variable,
    ) -> CodegenResult<InitCode> {
        let name = variable.name();
        let marker = indirection.marker();

        if ty.is_dynamic_container() && !variable.is_double_pointer() {
            return Ok(InitCode::declare(format!("{marker}{name} = NULL")));
        }

        if variable.is_local_only() {
            return Ok(InitCode::declare(name));
        }

        if variable.is_double_pointer() {
            return Ok(if variable.must_init_null() {
                InitCode::declare(format!("{marker}{marker}{name} = NULL"))
            } else {
                InitCode::declare(format!("{marker}{marker}{name}"))
            });
        }

        if let Some(default) = variable.default_init() {
            if matches!(ty, SemanticType::Char | SemanticType::UChar)
                && default.len() > MAX_CHAR_LITERAL
            {
                tracing::debug!(variable = name, default, "oversized char literal");
                return Err(CodegenError::invalid_char_literal(
                    default,
                    variable.original(),
                ));
            }
            return Ok(InitCode::declare(format!("{marker}{name} = {default}")));
        }

        if variable.must_init_null() && !marker.is_empty() {
            return Ok(InitCode::declare(format!("{marker}{name} = NULL")));
        }

        Ok(InitCode::declare(format!("{marker}{name}")))
    }

    // -- Checks --

    pub fn bool_code(&self, variable: &Variable) -> String {
        format!("Z_BVAL_P({})", self.variable_code(variable))
    }

    pub fn if_variable_value_undefined(&self, variable: &Variable) -> String {
        format!("if (!{}) {{", self.variable_code(variable))
    }

    pub fn if_variable_is_not_bool(&self, variable: &Variable) -> String {
        format!(
            "if (unlikely(Z_TYPE_P({}) != IS_BOOL)) {{",
            self.variable_code(variable)
        )
    }

    // -- Resolution --

    pub fn resolve_value(
        &self,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        match value {
            Value::Global(constant) => match constant.canonical() {
                Some(_) => Ok(constant.name().to_owned()),
                None => Err(self.unknown_constant(constant.name(), ctx)),
            },
            Value::Null => Ok(self.materialize(GlobalValue::Null, ctx)),
            Value::True => Ok(self.materialize(GlobalValue::True, ctx)),
            Value::False => Ok(self.materialize(GlobalValue::False, ctx)),
            Value::Compiled(expr) => match expr.ty() {
                SemanticType::Array | SemanticType::Variable => {
                    let variable = ctx
                        .symbol_table
                        .get_variable_for_write(expr.code(), expr.location())?;
                    Ok(code(ctx, &variable))
                }
                _ => Ok(expr.code().to_owned()),
            },
            Value::Variable(variable) => Ok(code(ctx, variable)),
        }
    }

    pub(crate) fn unknown_constant(
        &self,
        name: &str,
        ctx: &CompilationContext<'_>,
    ) -> CodegenError {
        tracing::debug!(constant = name, "unknown global constant");
        CodegenError::UnknownConstant {
            family: ctx.backend().name(),
            name: name.to_owned(),
            location: None,
        }
    }

    /// Fresh dynamic temporary holding one of the canonical values.
    fn materialize(&self, value: GlobalValue, ctx: &mut CompilationContext<'_>) -> String {
        let temp = ctx
            .symbol_table
            .get_temp_variable_for_write(SemanticType::Variable);
        init_variant(&temp, ctx);
        let backend = ctx.backend();
        match value {
            GlobalValue::Null => backend.assign_null(&temp, ctx),
            GlobalValue::True => backend.assign_bool(&temp, "1", ctx),
            GlobalValue::False => backend.assign_bool(&temp, "0", ctx),
        }
        backend.variable_code(&temp)
    }

    pub fn fetch_class_entry(&self, name: &str) -> String {
        format!("zephir_get_internal_ce({} TSRMLS_CC)", ss(name))
    }

    // -- Assignment --

    pub fn assign_null(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) {
        let line = format!("ZVAL_NULL({});", code(ctx, variable));
        ctx.output(&line);
    }

    pub fn assign_bool(&self, variable: &Variable, value: &str, ctx: &mut CompilationContext<'_>) {
        let line = format!("ZVAL_BOOL({}, {value});", code(ctx, variable));
        ctx.output(&line);
    }

    pub fn assign_long(&self, variable: &Variable, value: &str, ctx: &mut CompilationContext<'_>) {
        let line = format!("ZVAL_LONG({}, {value});", code(ctx, variable));
        ctx.output(&line);
    }

    pub fn assign_double(
        &self,
        variable: &Variable,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) {
        let line = format!("ZVAL_DOUBLE({}, {value});", code(ctx, variable));
        ctx.output(&line);
    }

    pub fn assign_string(
        &self,
        variable: &Variable,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) {
        let line = format!(
            "ZVAL_STRING({}, \"{}\", 1);",
            code(ctx, variable),
            escape_c_string(value)
        );
        ctx.output(&line);
    }

    pub fn assign_zval(
        &self,
        variable: &Variable,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let resolved = ctx.backend().resolve_value(value, ctx)?;
        let line = format!("ZVAL_ZVAL({}, {resolved}, 1, 0);", code(ctx, variable));
        ctx.output(&line);
        Ok(())
    }

    pub fn copy_on_write(
        &self,
        target: &Variable,
        source: CopySource<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let source = match source {
            CopySource::CurrentException => "EG(exception)".to_owned(),
            CopySource::Value(value) => ctx.backend().resolve_value(value, ctx)?,
        };
        let line = format!("ZEPHIR_CPY_WRT({}, {source});", code(ctx, target));
        ctx.output(&line);
        Ok(())
    }

    pub fn create_closure(
        &self,
        variable: &Variable,
        class: &ClassDefinition,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        let line = format!(
            "zephir_create_closure_ex({}, NULL, {}, {} TSRMLS_CC);",
            code(ctx, variable),
            class.class_entry(),
            ss("__invoke")
        );
        ctx.output(&line);
    }

    pub fn return_string(&self, value: &str, ctx: &mut CompilationContext<'_>) {
        ctx.output(&format!("RETURN_MM_STRING(\"{}\", 1);", escape_c_string(value)));
    }

    // -- Collections --

    pub fn add_array_entry(
        &self,
        array: &Variable,
        key: Option<&CompiledExpression>,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        self.add_array_entry_styled(&LEGACY_STYLE, array, key, value, location, ctx)
    }

    pub(crate) fn add_array_entry_styled(
        &self,
        style: &FamilyStyle,
        array: &Variable,
        key: Option<&CompiledExpression>,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String> {
        let key = match key {
            None => EntryKey::Append,
            Some(key) if key.ty() == SemanticType::Variable => {
                let variable = ctx
                    .symbol_table
                    .get_variable_for_read(key.code(), key.location())?;
                if variable.ty().is_integer() {
                    EntryKey::Index(code(ctx, &variable))
                } else {
                    EntryKey::Dynamic(variable)
                }
            }
            Some(key) if key.ty().is_integer() => EntryKey::Index(key.code().to_owned()),
            Some(key) if key.ty() == SemanticType::String => EntryKey::Assoc(key.code().to_owned()),
            Some(key) => {
                return Err(CodegenError::unknown_mapping(
                    format!("array key of type {}", key.ty().name()),
                    key.location().or(Some(location)),
                ))
            }
        };

        let line = match key {
            EntryKey::Append => {
                let element = self.value_variable(value, location, ctx)?;
                ctx.headers.add("kernel/array");
                format!(
                    "zephir_array_append({}, {}, PH_SEPARATE, {});",
                    array_code(style, ctx, array),
                    code(ctx, &element),
                    ctx.location_args(location)
                )
            }
            EntryKey::Dynamic(index) => {
                let element = self.value_variable(value, location, ctx)?;
                ctx.headers.add("kernel/array");
                format!(
                    "zephir_array_update_zval({}, {}, {}, PH_COPY | PH_SEPARATE);",
                    array_code(style, ctx, array),
                    code(ctx, &index),
                    pointer(ctx, &element)
                )
            }
            EntryKey::Index(index) => {
                let target = code(ctx, array);
                match self.typed_entry(style, value, location, ctx)? {
                    None => format!("add_index_null({target}, {index});"),
                    Some((kind, value)) => format!("add_index_{kind}({target}, {index}, {value});"),
                }
            }
            EntryKey::Assoc(name) => {
                let target = code(ctx, array);
                let name = (style.key)(&name);
                match self.typed_entry(style, value, location, ctx)? {
                    None => format!("add_assoc_null_ex({target}, {name});"),
                    Some((kind, value)) => {
                        format!("add_assoc_{kind}_ex({target}, {name}, {value});")
                    }
                }
            }
        };
        ctx.output(&line);
        Ok(line)
    }

    /// `add_*` suffix and value argument of a keyed entry; `None` for null.
    fn typed_entry(
        &self,
        style: &FamilyStyle,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Option<(&'static str, String)>> {
        let entry = match value {
            Value::Null => return Ok(None),
            Value::True => ("bool", "1".to_owned()),
            Value::False => ("bool", "0".to_owned()),
            Value::Global(_) => ("zval", ctx.backend().resolve_value(value, ctx)?),
            Value::Variable(variable) => ("zval", code(ctx, variable)),
            Value::Compiled(expr) => match entry_type(expr.ty()) {
                Some("zval") => {
                    let variable = ctx
                        .symbol_table
                        .get_variable_for_read(expr.code(), expr.location())?;
                    ("zval", code(ctx, &variable))
                }
                Some("stringl") => (
                    "stringl",
                    format!("{}{}", sl(expr.code()), style.string_dup),
                ),
                Some(kind) => (kind, expr.code().to_owned()),
                None => {
                    return Err(CodegenError::unknown_mapping(
                        expr.ty().name(),
                        Some(location),
                    ))
                }
            },
        };
        Ok(Some(entry))
    }

    /// A dynamic variable holding `value`, materialized when needed.
    fn value_variable(
        &self,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<Variable> {
        let backend = ctx.backend();
        let kind = match value {
            Value::Variable(variable) => return Ok(variable.clone()),
            Value::Compiled(expr) => match entry_type(expr.ty()) {
                Some("zval") => {
                    return ctx
                        .symbol_table
                        .get_variable_for_write(expr.code(), expr.location());
                }
                Some(kind) => kind,
                None => {
                    return Err(CodegenError::unknown_mapping(
                        expr.ty().name(),
                        Some(location),
                    ))
                }
            },
            Value::Global(constant) if constant.canonical().is_none() => {
                return Err(self.unknown_constant(constant.name(), ctx));
            }
            Value::Global(_) | Value::Null | Value::True | Value::False => "canonical",
        };

        let temp = ctx
            .symbol_table
            .get_temp_variable_for_write(SemanticType::Variable);
        init_variant(&temp, ctx);
        match (kind, value) {
            ("long", Value::Compiled(expr)) => backend.assign_long(&temp, expr.code(), ctx),
            ("double", Value::Compiled(expr)) => backend.assign_double(&temp, expr.code(), ctx),
            ("bool", Value::Compiled(expr)) => backend.assign_bool(&temp, expr.code(), ctx),
            ("stringl", Value::Compiled(expr)) => backend.assign_string(&temp, expr.code(), ctx),
            (_, Value::True) => backend.assign_bool(&temp, "1", ctx),
            (_, Value::False) => backend.assign_bool(&temp, "0", ctx),
            (_, Value::Global(constant)) => match constant.canonical() {
                Some(GlobalValue::True) => backend.assign_bool(&temp, "1", ctx),
                Some(GlobalValue::False) => backend.assign_bool(&temp, "0", ctx),
                _ => backend.assign_null(&temp, ctx),
            },
            _ => backend.assign_null(&temp, ctx),
        }
        Ok(temp)
    }

    pub fn array_isset(
        &self,
        array: &Variable,
        key: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        self.array_isset_styled(&LEGACY_STYLE, array, key, ctx)
    }

    pub(crate) fn array_isset_styled(
        &self,
        style: &FamilyStyle,
        array: &Variable,
        key: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression> {
        let target = code(ctx, array);
        let (index, location) = match key {
            Value::Compiled(expr) => match expr.ty() {
                SemanticType::String => {
                    let check = format!(
                        "zephir_array_isset_string({target}, {})",
                        (style.key)(expr.code())
                    );
                    return Ok(CompiledExpression::bool(check, expr.location().cloned()));
                }
                SemanticType::Variable | SemanticType::Array => {
                    let variable = ctx
                        .symbol_table
                        .get_variable_for_read(expr.code(), expr.location())?;
                    (variable, expr.location().cloned())
                }
                ty if ty.is_integer() => {
                    let check = format!("zephir_array_isset_long({target}, {})", expr.code());
                    return Ok(CompiledExpression::bool(check, expr.location().cloned()));
                }
                ty => {
                    return Err(CodegenError::unknown_mapping(
                        format!("array index of type {}", ty.name()),
                        expr.location(),
                    ))
                }
            },
            Value::Variable(variable) => (variable.clone(), variable.original().cloned()),
            other => {
                return Err(CodegenError::unknown_mapping(
                    format!("array index of type {}", other.ty().name()),
                    None,
                ))
            }
        };

        let index_code = code(ctx, &index);
        let check = match index.ty() {
            ty if ty.is_integer() => format!("zephir_array_isset_long({target}, {index_code})"),
            SemanticType::Variable | SemanticType::String | SemanticType::DynamicPtr => {
                format!("zephir_array_isset({target}, {index_code})")
            }
            ty => {
                return Err(CodegenError::unknown_mapping(
                    format!("array index of type {}", ty.name()),
                    location.as_ref(),
                ))
            }
        };
        Ok(CompiledExpression::bool(check, location))
    }

    pub fn array_unset(
        &self,
        array: &Variable,
        index: &CompiledExpression,
        flags: AccessFlags,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.array_unset_styled(&LEGACY_STYLE, array, index, flags, ctx)
    }

    pub(crate) fn array_unset_styled(
        &self,
        style: &FamilyStyle,
        array: &Variable,
        index: &CompiledExpression,
        flags: AccessFlags,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        ctx.headers.add("kernel/array");
        let target = array_code(style, ctx, array);
        let flags = flags.render();
        let line = match index.ty() {
            SemanticType::Int | SemanticType::UInt | SemanticType::Long => {
                format!("zephir_array_unset_long({target}, {}, {flags});", index.code())
            }
            SemanticType::String => format!(
                "zephir_array_unset_string({target}, {}, {flags});",
                (style.key)(index.code())
            ),
            SemanticType::Variable => {
                let variable = ctx
                    .symbol_table
                    .get_variable_for_read(index.code(), index.location())?;
                let index_code = code(ctx, &variable);
                match variable.ty() {
                    SemanticType::Int | SemanticType::UInt | SemanticType::Long => {
                        format!("zephir_array_unset_long({target}, {index_code}, {flags});")
                    }
                    SemanticType::String | SemanticType::Variable | SemanticType::DynamicPtr => {
                        format!("zephir_array_unset({target}, {index_code}, {flags});")
                    }
                    ty => {
                        return Err(CodegenError::unknown_mapping(
                            format!("variable of type {} used as array index", ty.name()),
                            index.location(),
                        ))
                    }
                }
            }
            ty => {
                return Err(CodegenError::unknown_mapping(
                    format!("expression of type {} used as array index", ty.name()),
                    index.location(),
                ))
            }
        };
        ctx.output(&line);
        Ok(())
    }

    /// Legacy iteration protocol: a `HashTable` cursor walked with
    /// `zend_hash_get_current_data_ex` until it runs out of entries.
    pub fn for_statement(
        &self,
        plan: &ForEachPlan<'_>,
        block: &mut StatementBlock<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let hash = ctx.symbol_table.add_temp(SemanticType::HashTable, StorageClass::Abi);
        let position = ctx
            .symbol_table
            .add_temp(SemanticType::HashPosition, StorageClass::Abi);
        let entry = ctx
            .symbol_table
            .add_temp(SemanticType::Variable, StorageClass::DoublePointer);
        let (hash, position, entry) = (hash.name(), position.name(), entry.name());
        tracing::trace!(collection = plan.collection.name(), reverse = plan.reverse, "hash iteration");

        ctx.headers.add("kernel/hash");
        ctx.symbol_table.set_must_grow_stack(true);
        let line = format!(
            "zephir_is_iterable({}, &{hash}, &{position}, {}, {}, {});",
            code(ctx, plan.collection),
            u8::from(plan.duplicate_collection),
            u8::from(plan.reverse),
            ctx.location_args(plan.location)
        );
        ctx.output(&line);
        ctx.output("for (");
        ctx.output(&format!(
            "  ; zend_hash_get_current_data_ex({hash}, (void**) &{entry}, &{position}) == SUCCESS"
        ));
        let step = if plan.reverse {
            "move_backwards"
        } else {
            "move_forward"
        };
        ctx.output(&format!("  ; zend_hash_{step}_ex({hash}, &{position})"));
        ctx.output(") {");

        ctx.printer.increase_level();
        if let Some(key) = plan.key {
            let macro_name = if plan.duplicate_key {
                "ZEPHIR_GET_HMKEY"
            } else {
                "ZEPHIR_GET_HKEY"
            };
            let line = format!("{macro_name}({}, {hash}, {position});", code(ctx, key));
            ctx.output(&line);
        }
        if let Some(value) = plan.value {
            let line = format!("ZEPHIR_GET_HVALUE({}, {entry});", code(ctx, value));
            ctx.output(&line);
        }
        ctx.printer.decrease_level();

        compile_iteration_body(plan, block, ctx)?;
        ctx.output("}");
        Ok(())
    }

    // -- Members --

    pub fn fetch_property(
        &self,
        symbol: &Variable,
        object: &Variable,
        property: MemberKey<'_>,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        let symbol = pointer(ctx, symbol);
        let object_code = code(ctx, object);
        let flags = access.flags().render();
        let line = match property {
            MemberKey::Name(name) if object.name() == Variable::THIS => format!(
                "zephir_read_property_this({symbol}, {object_code}, {}, {flags});",
                sl(name)
            ),
            MemberKey::Name(name) => format!(
                "zephir_read_property({symbol}, {object_code}, {}, {flags});",
                sl(name)
            ),
            MemberKey::Dynamic(name) => format!(
                "zephir_read_property_zval({symbol}, {object_code}, {}, {flags});",
                code(ctx, name)
            ),
        };
        ctx.output(&line);
    }

    pub fn fetch_static_property(
        &self,
        symbol: &Variable,
        class: &ClassDefinition,
        property: &str,
        _access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        let line = format!(
            "{} = zephir_fetch_static_property_ce({}, {} TSRMLS_CC);",
            code(ctx, symbol),
            class.class_entry(),
            sl(property)
        );
        ctx.output(&line);
    }

    pub fn update_property(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let value = ctx.backend().resolve_value(value, ctx)?;
        ctx.headers.add("kernel/object");
        let object_code = code(ctx, object);
        let line = match property {
            MemberKey::Name(name) if object.name() == Variable::THIS => format!(
                "zephir_update_property_this({object_code}, {}, {value} TSRMLS_CC);",
                sl(name)
            ),
            MemberKey::Name(name) => format!(
                "zephir_update_property_zval({object_code}, {}, {value} TSRMLS_CC);",
                sl(name)
            ),
            MemberKey::Dynamic(name) => format!(
                "zephir_update_property_zval_zval({object_code}, {}, {value} TSRMLS_CC);",
                code(ctx, name)
            ),
        };
        ctx.output(&line);
        Ok(())
    }

    pub fn update_static_property(
        &self,
        class_entry: &str,
        property: &str,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let value = ctx.backend().resolve_value(value, ctx)?;
        ctx.headers.add("kernel/object");
        ctx.output(&format!(
            "zephir_update_static_property_ce({class_entry}, {}, &{value} TSRMLS_CC);",
            sl(property)
        ));
        Ok(())
    }

    pub fn property_isset(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CompiledExpression {
        ctx.headers.add("kernel/object");
        let object_code = code(ctx, object);
        let check = match property {
            MemberKey::Name(name) => {
                format!("zephir_isset_property({object_code}, {} TSRMLS_CC)", ss(name))
            }
            MemberKey::Dynamic(name) => format!(
                "zephir_isset_property_zval({object_code}, {} TSRMLS_CC)",
                code(ctx, name)
            ),
        };
        CompiledExpression::bool(check, None)
    }

    pub fn call_method(
        &self,
        destination: CallDestination<'_>,
        object: &Variable,
        method: MemberKey<'_>,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/fcall");
        ctx.symbol_table.set_must_grow_stack(true);
        let (macro_name, method) = match method {
            MemberKey::Name(name) => ("CALL_METHOD", format!("\"{}\"", escape_c_string(name))),
            MemberKey::Dynamic(name) => ("CALL_METHOD_ZVAL", code(ctx, name)),
        };
        let object = code(ctx, object);
        let params = join_params(params);
        let line = match destination {
            CallDestination::Discard => {
                format!("ZEPHIR_{macro_name}(NULL, {object}, {method}, {cache}{params});")
            }
            CallDestination::ReturnValue => {
                format!("ZEPHIR_RETURN_{macro_name}({object}, {method}, {cache}{params});")
            }
            CallDestination::Variable(symbol) => format!(
                "ZEPHIR_{macro_name}({}, {object}, {method}, {cache}{params});",
                pointer(ctx, symbol)
            ),
        };
        ctx.output(&line);
    }

    pub fn call_function(
        &self,
        destination: CallDestination<'_>,
        name: &str,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/fcall");
        ctx.symbol_table.set_must_grow_stack(true);
        let name = escape_c_string(name);
        let params = join_params(params);
        let line = match destination {
            CallDestination::Discard => {
                format!("ZEPHIR_CALL_FUNCTION(NULL, \"{name}\", {cache}{params});")
            }
            CallDestination::ReturnValue => {
                format!("ZEPHIR_RETURN_CALL_FUNCTION(\"{name}\", {cache}{params});")
            }
            CallDestination::Variable(symbol) => format!(
                "ZEPHIR_CALL_FUNCTION({}, \"{name}\", {cache}{params});",
                pointer(ctx, symbol)
            ),
        };
        ctx.output(&line);
    }

    pub fn fetch_class(
        &self,
        class_entry: &Variable,
        class_name: &str,
        guarded: bool,
        ctx: &mut CompilationContext<'_>,
    ) {
        let lookup = format!(
            "{} = zend_fetch_class({}, ZEND_FETCH_CLASS_AUTO TSRMLS_CC);",
            class_entry.name(),
            sl(class_name)
        );
        self.emit_guarded(class_entry, &lookup, guarded, ctx);
    }

    pub(crate) fn emit_guarded(
        &self,
        class_entry: &Variable,
        line: &str,
        guarded: bool,
        ctx: &mut CompilationContext<'_>,
    ) {
        ctx.headers.add("kernel/object");
        if guarded {
            ctx.output(&format!("if (!{}) {{", class_entry.name()));
            ctx.printer.increase_level();
        }
        ctx.output(line);
        if guarded {
            ctx.printer.decrease_level();
            ctx.output("}");
        }
    }

    pub fn fetch_global(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) -> String {
        let name = variable.name();
        let line = format!("zephir_get_global(&{name}, {} TSRMLS_CC);", ss(name));
        ctx.output(&line);
        line
    }

    pub fn set_symbol_if_separated(
        &self,
        separated: &Variable,
        variable: &Variable,
        ctx: &mut CompilationContext<'_>,
    ) {
        let name = variable.name();
        ctx.output(&format!("if ({}) {{", separated.name()));
        ctx.printer.increase_level();
        ctx.output(&format!(
            "ZEPHIR_SET_SYMBOL(EG(active_symbol_table), \"{name}\", {name});"
        ));
        ctx.printer.decrease_level();
        ctx.output("}");
    }

    // -- Declarations --

    pub fn declare_constant(
        &self,
        ty: SemanticType,
        name: &str,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let (class_entry, kind, value) = self.constant_parts(ty, value, ctx)?;
        let line = match value {
            Some(value) => format!(
                "zend_declare_class_constant_{kind}({class_entry}, {}, {value} TSRMLS_CC);",
                sl(name)
            ),
            None => format!(
                "zend_declare_class_constant_null({class_entry}, {} TSRMLS_CC);",
                sl(name)
            ),
        };
        ctx.output(&line);
        Ok(())
    }

    /// Class entry, helper suffix and C value of a class constant.
    pub(crate) fn constant_parts(
        &self,
        ty: SemanticType,
        value: &str,
        ctx: &CompilationContext<'_>,
    ) -> CodegenResult<(String, &'static str, Option<String>)> {
        let class = ctx.class_definition().ok_or_else(|| {
            CodegenError::invalid_statement("class constant declared outside of a class", None)
        })?;
        let (kind, value) = match ty {
            SemanticType::Bool => ("bool", Some(if value == "false" { "0" } else { "1" }.to_owned())),
            SemanticType::Int | SemanticType::Long => ("long", Some(value.to_owned())),
            SemanticType::Double => ("double", Some(value.to_owned())),
            SemanticType::String | SemanticType::Char => {
                ("string", Some(format!("\"{}\"", escape_c_string(value))))
            }
            SemanticType::Null => ("null", None),
            other => {
                return Err(CodegenError::unknown_mapping(
                    format!("constant of type {}", other.name()),
                    None,
                ))
            }
        };
        Ok((class.class_entry(), kind, value))
    }

    pub fn internal_signature(&self, routine: RoutineRef<'_>) -> String {
        self.internal_signature_returning(routine, "zend_object_value ")
    }

    /// Signature with `object_return` (type and separator) as the return
    /// type of instance initializers.
    pub(crate) fn internal_signature_returning(
        &self,
        routine: RoutineRef<'_>,
        object_return: &str,
    ) -> String {
        if let RoutineRef::Method(method) = routine {
            if method.is_initializer() {
                return if method.is_static() {
                    format!("void {}(TSRMLS_D)", method.name())
                } else {
                    format!(
                        "static {object_return}{}(zend_class_entry *class_type TSRMLS_DC)",
                        method.name()
                    )
                };
            }
        }

        let parameters: SmallVec<[String; 4]> = routine
            .parameters()
            .iter()
            .map(|parameter| {
                if is_coerced_parameter(parameter.ty) {
                    format!("zval *{}_param_ext", parameter.name)
                } else {
                    format!("zval *{}_ext", parameter.name)
                }
            })
            .collect();
        let prefix = "int ht, zval *return_value, zval **return_value_ptr, zval *this_ptr, int return_value_used";
        if parameters.is_empty() {
            format!("static void {}({prefix} TSRMLS_DC)", routine.internal_name())
        } else {
            format!(
                "static void {}({prefix}, {} TSRMLS_DC)",
                routine.internal_name(),
                parameters.join(", ")
            )
        }
    }

    pub fn bind_parameters(
        &self,
        routine: RoutineRef<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        self.bind_parameters_with(
            routine,
            |count, slots| format!("zephir_fetch_params(0, {count}, 0, {slots});"),
            ctx,
        )
    }

    /// Declare one boxed slot per parameter, fetch them from the call frame
    /// unless the routine is internal, then coerce typed parameters.
    pub(crate) fn bind_parameters_with(
        &self,
        routine: RoutineRef<'_>,
        fetch_params: fn(usize, &str) -> String,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let parameters = routine.parameters();
        if parameters.is_empty() {
            return Ok(());
        }
        let internal = routine.is_internal();
        let mut slots: SmallVec<[String; 4]> = SmallVec::new();
        let mut coercions = Vec::new();

        for parameter in parameters {
            let coerced = is_coerced_parameter(parameter.ty);
            let slot_name = if coerced {
                format!("{}_param", parameter.name)
            } else {
                parameter.name.clone()
            };
            let slot = Variable::new(slot_name.as_str(), SemanticType::DynamicPtr);
            let slot = if internal {
                slot.with_default(format!("{slot_name}_ext"))
            } else {
                slot.with_init_null(true)
            };
            ctx.symbol_table.declare(slot.clone());
            slots.push(format!("&{slot_name}"));

            if coerced {
                let local = Variable::new(parameter.name.as_str(), parameter.ty);
                ctx.symbol_table.declare(local.clone());
                coercions.push((local, slot));
            }
        }

        if !internal {
            ctx.output(&fetch_params(parameters.len(), &slots.join(", ")));
        }
        for (local, slot) in &coercions {
            self.coerce_parameter(local, slot, ctx)?;
        }
        Ok(())
    }

    fn coerce_parameter(
        &self,
        local: &Variable,
        slot: &Variable,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()> {
        let param = code(ctx, slot);
        let target = code(ctx, local);
        let line = match local.ty() {
            SemanticType::Int | SemanticType::UInt | SemanticType::Char | SemanticType::UChar => {
                format!("{target} = zephir_get_intval({param});")
            }
            SemanticType::Double => format!("{target} = zephir_get_doubleval({param});"),
            SemanticType::Bool => format!("{target} = zephir_get_boolval({param});"),
            SemanticType::String => format!("zephir_get_strval({target}, {param});"),
            SemanticType::Array => format!("zephir_get_arrval({target}, {param});"),
            other => {
                return Err(CodegenError::unknown_mapping(
                    format!("parameter of type {}", other.name()),
                    None,
                ))
            }
        };
        ctx.headers.add("kernel/operators");
        ctx.output(&line);
        Ok(())
    }

    // -- Lifecycle hooks --

    pub fn on_pre_init_var(
        &self,
        _routine: RoutineRef<'_>,
        _ctx: &mut CompilationContext<'_>,
    ) -> Option<String> {
        None
    }

    pub fn on_pre_compile(&self, _routine: RoutineRef<'_>, _ctx: &mut CompilationContext<'_>) {}

    pub fn on_post_compile(&self, _routine: RoutineRef<'_>, _ctx: &mut CompilationContext<'_>) {}
}
