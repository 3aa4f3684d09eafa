//! Backend Abstraction over Runtime Families
//!
//! The Zend runtime changed its value model between engine generations.
//! [`Backend`] is the capability interface every emitter talks to; the two
//! families implement it:
//!
//! - [`ZendEngine2`]: legacy model, dynamic values are `zval *` heap cells
//! - [`ZendEngine3`]: dynamic values are inline `zval`s accessed as `&x`
//!
//! Both hold a reference to the shared [`Baseline`], which implements the
//! complete operation set. `ZendEngine2` forwards everything to it;
//! `ZendEngine3` overrides what differs and forwards the rest. Baseline code
//! that needs another operation (a variable's access code, an assignment)
//! calls it through `ctx.backend()`, so overrides are honoured even inside
//! shared code.
//!
//! Operations that emit code write to `ctx.printer`; those returning a
//! `String` without a context are pure.

mod baseline;
mod zend_engine2;
mod zend_engine3;

pub use baseline::Baseline;
pub use zend_engine2::ZendEngine2;
pub use zend_engine3::ZendEngine3;

use zeal_ir::{
    ClassDefinition, CompiledExpression, RoutineRef, SemanticType, SourceLocation, Value, Variable,
};

use crate::stmt::StatementBlock;
use crate::{AccessFlags, CodegenResult, CompilationContext, RuntimeFamily};

static BASELINE: Baseline = Baseline;
static ZEND_ENGINE2: ZendEngine2 = ZendEngine2::new(&BASELINE);
static ZEND_ENGINE3: ZendEngine3 = ZendEngine3::new(&BASELINE);

/// The shared backend instance for `family`.
pub fn backend_for(family: RuntimeFamily) -> &'static dyn Backend {
    tracing::debug!(%family, "selecting backend");
    match family {
        RuntimeFamily::ZendEngine2 => &ZEND_ENGINE2,
        RuntimeFamily::ZendEngine3 => &ZEND_ENGINE3,
    }
}

/// Whether a C declaration holds the value itself or points to it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Indirection {
    Value,
    Pointer,
}

impl Indirection {
    /// Declarator prefix, `""` or `"*"`.
    pub fn marker(self) -> &'static str {
        match self {
            Indirection::Value => "",
            Indirection::Pointer => "*",
        }
    }
}

/// Concrete C representation of a semantic type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDefinition {
    pub indirection: Indirection,
    /// C type name, `zval`, `zend_long`, ...
    pub storage: &'static str,
}

impl TypeDefinition {
    pub const fn value(storage: &'static str) -> Self {
        TypeDefinition {
            indirection: Indirection::Value,
            storage,
        }
    }

    pub const fn pointer(storage: &'static str) -> Self {
        TypeDefinition {
            indirection: Indirection::Pointer,
            storage,
        }
    }

    pub fn is_pointer(self) -> bool {
        self.indirection == Indirection::Pointer
    }
}

/// Declaration fragment of one variable plus the statement, if any, that
/// must run before the body to give it a defined value.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct InitCode {
    /// `a`, `*b = NULL`, `i = 0`
    pub declarator: String,
    /// `ZVAL_UNDEF(&a);`
    pub init: Option<String>,
}

impl InitCode {
    pub fn declare(declarator: impl Into<String>) -> Self {
        InitCode {
            declarator: declarator.into(),
            init: None,
        }
    }
}

/// A member name known at compile time or held in a variable.
#[derive(Copy, Clone, Debug)]
pub enum MemberKey<'a> {
    Name(&'a str),
    Dynamic(&'a Variable),
}

/// How a property read treats a missing property and the read value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PropertyAccess {
    /// Borrow the stored value instead of taking a reference.
    pub read_only: bool,
    /// Null-coalescing read: no warning when the property is missing.
    pub quiet: bool,
}

impl PropertyAccess {
    pub fn flags(self) -> AccessFlags {
        let mut flags = if self.quiet {
            AccessFlags::SILENT
        } else {
            AccessFlags::NOISY
        };
        if self.read_only {
            flags |= AccessFlags::READONLY;
        }
        flags
    }
}

/// Where a call leaves its result.
#[derive(Copy, Clone, Debug)]
pub enum CallDestination<'a> {
    /// Result discarded.
    Discard,
    /// Result written straight into the routine's return slot.
    ReturnValue,
    Variable(&'a Variable),
}

impl<'a> From<Option<&'a Variable>> for CallDestination<'a> {
    fn from(symbol: Option<&'a Variable>) -> Self {
        match symbol {
            None => CallDestination::Discard,
            Some(variable) if variable.name() == Variable::RETURN_VALUE => {
                CallDestination::ReturnValue
            }
            Some(variable) => CallDestination::Variable(variable),
        }
    }
}

/// Right-hand side of a copy-on-write assignment.
#[derive(Copy, Clone, Debug)]
pub enum CopySource<'a> {
    Value(&'a Value),
    /// The exception currently being thrown.
    CurrentException,
}

/// Everything `for_statement` needs to iterate a collection.
#[derive(Copy, Clone, Debug)]
pub struct ForEachPlan<'a> {
    pub collection: &'a Variable,
    pub key: Option<&'a Variable>,
    pub value: Option<&'a Variable>,
    /// Keep a private copy of string keys beyond the iteration.
    pub duplicate_key: bool,
    /// Iterate a copy of the collection instead of the original.
    pub duplicate_collection: bool,
    pub reverse: bool,
    pub location: &'a SourceLocation,
}

/// Parameters of these types arrive boxed as `<name>_param` and are coerced
/// into a typed local by the prologue.
pub(crate) fn is_coerced_parameter(ty: SemanticType) -> bool {
    matches!(
        ty,
        SemanticType::Int
            | SemanticType::UInt
            | SemanticType::Double
            | SemanticType::Bool
            | SemanticType::Char
            | SemanticType::UChar
            | SemanticType::String
            | SemanticType::Array
    )
}

/// Code generation capabilities of one runtime family.
///
/// Every implementation keeps the baseline contract: same inputs, same
/// error conditions. Only the emitted text differs.
pub trait Backend: Send + Sync {
    fn family(&self) -> RuntimeFamily;

    fn name(&self) -> &'static str {
        self.family().name()
    }

    // -- Representation --

    fn type_definition(&self, ty: SemanticType) -> TypeDefinition;

    /// Token referencing `variable` wherever a value handle is expected.
    fn variable_code(&self, variable: &Variable) -> String;

    /// Token for the address of `variable`'s slot.
    fn variable_code_pointer(&self, variable: &Variable) -> String;

    /// Declarator and initializer for `variable` in the routine prologue.
    fn init_code(
        &self,
        ty: SemanticType,
        indirection: Indirection,
        variable: &Variable,
    ) -> CodegenResult<InitCode>;

    // -- Checks --

    /// Expression reading a boolean dynamic value as a C truth value.
    fn bool_code(&self, variable: &Variable) -> String;

    fn if_variable_value_undefined(&self, variable: &Variable) -> String;

    fn if_variable_is_not_bool(&self, variable: &Variable) -> String;

    // -- Resolution --

    /// Normalize a constant, literal or variable into one access token,
    /// materializing a temporary for null/true/false.
    fn resolve_value(&self, value: &Value, ctx: &mut CompilationContext<'_>)
        -> CodegenResult<String>;

    /// Expression yielding the class entry of a runtime class.
    fn fetch_class_entry(&self, name: &str) -> String;

    // -- Assignment --

    fn assign_null(&self, variable: &Variable, ctx: &mut CompilationContext<'_>);

    fn assign_bool(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>);

    fn assign_long(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>);

    fn assign_double(&self, variable: &Variable, code: &str, ctx: &mut CompilationContext<'_>);

    /// Store the string literal `value` (unescaped).
    fn assign_string(&self, variable: &Variable, value: &str, ctx: &mut CompilationContext<'_>);

    fn assign_zval(
        &self,
        variable: &Variable,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    fn copy_on_write(
        &self,
        target: &Variable,
        source: CopySource<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    fn create_closure(
        &self,
        variable: &Variable,
        class: &ClassDefinition,
        ctx: &mut CompilationContext<'_>,
    );

    /// Return the string literal `value` from the routine.
    fn return_string(&self, value: &str, ctx: &mut CompilationContext<'_>);

    // -- Collections --

    /// Add `value` to `array`: appended without a key, by index for
    /// integer keys, by name otherwise. Returns the emitted line.
    fn add_array_entry(
        &self,
        array: &Variable,
        key: Option<&CompiledExpression>,
        value: &Value,
        location: &SourceLocation,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<String>;

    fn array_isset(
        &self,
        array: &Variable,
        key: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<CompiledExpression>;

    fn array_unset(
        &self,
        array: &Variable,
        index: &CompiledExpression,
        flags: AccessFlags,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    /// Iterate a collection, compiling `block` once per entry.
    fn for_statement(
        &self,
        plan: &ForEachPlan<'_>,
        block: &mut StatementBlock<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    // -- Members --

    fn fetch_property(
        &self,
        symbol: &Variable,
        object: &Variable,
        property: MemberKey<'_>,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    );

    fn fetch_static_property(
        &self,
        symbol: &Variable,
        class: &ClassDefinition,
        property: &str,
        access: PropertyAccess,
        ctx: &mut CompilationContext<'_>,
    );

    fn update_property(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    fn update_static_property(
        &self,
        class_entry: &str,
        property: &str,
        value: &Value,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    fn property_isset(
        &self,
        object: &Variable,
        property: MemberKey<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CompiledExpression;

    /// `params` are already-resolved argument tokens.
    fn call_method(
        &self,
        destination: CallDestination<'_>,
        object: &Variable,
        method: MemberKey<'_>,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    );

    fn call_function(
        &self,
        destination: CallDestination<'_>,
        name: &str,
        cache: &str,
        params: &[String],
        ctx: &mut CompilationContext<'_>,
    );

    /// Resolve `class_name` into the class-entry slot `class_entry`. A
    /// guarded lookup only runs while the slot is still empty.
    fn fetch_class(
        &self,
        class_entry: &Variable,
        class_name: &str,
        guarded: bool,
        ctx: &mut CompilationContext<'_>,
    );

    /// Bind a superglobal into `variable`. Returns the emitted line.
    fn fetch_global(&self, variable: &Variable, ctx: &mut CompilationContext<'_>) -> String;

    /// Re-register `variable` in the active symbol table when `separated`
    /// is set at runtime.
    fn set_symbol_if_separated(
        &self,
        separated: &Variable,
        variable: &Variable,
        ctx: &mut CompilationContext<'_>,
    );

    // -- Declarations --

    fn declare_constant(
        &self,
        ty: SemanticType,
        name: &str,
        value: &str,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    /// C signature of an internal routine or initializer.
    fn internal_signature(&self, routine: RoutineRef<'_>) -> String;

    /// Declare the parameters and emit the prologue that binds them.
    fn bind_parameters(
        &self,
        routine: RoutineRef<'_>,
        ctx: &mut CompilationContext<'_>,
    ) -> CodegenResult<()>;

    // -- Lifecycle hooks --

    /// Declaration emitted before all variable declarations.
    fn on_pre_init_var(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>)
        -> Option<String>;

    fn on_pre_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>);

    fn on_post_compile(&self, routine: RoutineRef<'_>, ctx: &mut CompilationContext<'_>);
}
