//! Compiled expressions and values handed to the backend.

use crate::{SemanticType, SourceLocation, Variable};

/// Result of compiling an IR expression: a type tag, the target code and
/// where it came from.
///
/// Immutable once built. Emitters switch on [`ty`](Self::ty), so the tag
/// must describe `code` exactly.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CompiledExpression {
    ty: SemanticType,
    code: String,
    location: Option<SourceLocation>,
}

impl CompiledExpression {
    pub fn new(ty: SemanticType, code: impl Into<String>, location: Option<SourceLocation>) -> Self {
        CompiledExpression {
            ty,
            code: code.into(),
            location,
        }
    }

    pub fn bool(code: impl Into<String>, location: Option<SourceLocation>) -> Self {
        CompiledExpression::new(SemanticType::Bool, code, location)
    }

    pub fn ty(&self) -> SemanticType {
        self.ty
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

/// The runtime's shared singleton cells.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GlobalValue {
    Null,
    True,
    False,
}

/// Reference to a runtime-wide singleton by its source name,
/// e.g. `ZEPHIR_GLOBAL(global_null)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GlobalConstant {
    name: String,
}

impl GlobalConstant {
    pub const NULL: &'static str = "ZEPHIR_GLOBAL(global_null)";
    pub const TRUE: &'static str = "ZEPHIR_GLOBAL(global_true)";
    pub const FALSE: &'static str = "ZEPHIR_GLOBAL(global_false)";

    pub fn new(name: impl Into<String>) -> Self {
        GlobalConstant { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The singleton this name refers to, if it is one we know.
    pub fn canonical(&self) -> Option<GlobalValue> {
        match self.name.as_str() {
            Self::NULL => Some(GlobalValue::Null),
            Self::TRUE => Some(GlobalValue::True),
            Self::FALSE => Some(GlobalValue::False),
            _ => None,
        }
    }
}

/// Anything that might be a constant, a literal or a variable.
///
/// Every consumer funnels these through the backend's value resolver so
/// it only ever sees one token shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Global(GlobalConstant),
    Null,
    True,
    False,
    Compiled(CompiledExpression),
    Variable(Variable),
}

impl Value {
    /// Semantic type of the value, as far as it is statically known.
    pub fn ty(&self) -> SemanticType {
        match self {
            Value::Global(_) | Value::Null => SemanticType::Null,
            Value::True | Value::False => SemanticType::Bool,
            Value::Compiled(expr) => expr.ty(),
            Value::Variable(var) => var.ty(),
        }
    }
}

impl From<CompiledExpression> for Value {
    fn from(expr: CompiledExpression) -> Self {
        Value::Compiled(expr)
    }
}

impl From<Variable> for Value {
    fn from(var: Variable) -> Self {
        Value::Variable(var)
    }
}
