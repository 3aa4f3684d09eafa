//! Class, method and function metadata.

use crate::SemanticType;

/// Declared parameter of a method or function.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: SemanticType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Parameter {
            name: name.into(),
            ty,
        }
    }
}

/// A user class being compiled.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassDefinition {
    namespace: String,
    name: String,
}

impl ClassDefinition {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ClassDefinition {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Fully qualified name, `Test\Flow`.
    pub fn complete_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.name)
        }
    }

    /// Namespace flattened into a C identifier prefix, `test`.
    pub fn c_namespace(&self) -> String {
        self.namespace.replace('\\', "_").to_lowercase()
    }

    /// Identifier used by the method-table macros, `Test_Flow`.
    pub fn c_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}_{}", self.namespace.replace('\\', "_"), self.name)
        }
    }

    /// Global holding the runtime class entry, `test_flow_ce`.
    pub fn class_entry(&self) -> String {
        let ns = self.c_namespace();
        let name = self.name.to_lowercase();
        if ns.is_empty() {
            format!("{name}_ce")
        } else {
            format!("{ns}_{name}_ce")
        }
    }
}

/// A method of a user class.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassMethod {
    name: String,
    internal_name: String,
    is_static: bool,
    is_initializer: bool,
    is_internal: bool,
    parameters: Vec<Parameter>,
}

impl ClassMethod {
    /// Method `name` of `class`; the ABI name is derived from both.
    pub fn new(class: &ClassDefinition, name: impl Into<String>) -> Self {
        let name = name.into();
        let ns = class.c_namespace();
        let internal_name = if ns.is_empty() {
            format!("zep_{}_{}", class.name(), name)
        } else {
            format!("zep_{ns}_{}_{}", class.name(), name)
        };
        ClassMethod {
            name,
            internal_name,
            is_static: false,
            is_initializer: false,
            is_internal: false,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Mark as a compiler-generated initializer (property or static
    /// initialisation). Initializers keep their plain name as ABI name.
    #[must_use]
    pub fn with_initializer(mut self, is_initializer: bool) -> Self {
        self.is_initializer = is_initializer;
        if is_initializer {
            self.internal_name.clone_from(&self.name);
        }
        self
    }

    /// Internal methods are called directly from C, not through the
    /// runtime's method table.
    #[must_use]
    pub fn with_internal(mut self, is_internal: bool) -> Self {
        self.is_internal = is_internal;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_initializer(&self) -> bool {
        self.is_initializer
    }

    pub fn is_internal(&self) -> bool {
        self.is_internal
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

/// A free function.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionDefinition {
    name: String,
    namespace: String,
    parameters: Vec<Parameter>,
}

impl FunctionDefinition {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        FunctionDefinition {
            name: name.into(),
            namespace: namespace.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// ABI name, `zephir_test_greet`.
    pub fn internal_name(&self) -> String {
        let ns = self.namespace.replace('\\', "_").to_lowercase();
        if ns.is_empty() {
            format!("zephir_{}", self.name)
        } else {
            format!("zephir_{ns}_{}", self.name)
        }
    }
}

/// Either kind of routine the method driver compiles.
#[derive(Copy, Clone, Debug)]
pub enum RoutineRef<'a> {
    Method(&'a ClassMethod),
    Function(&'a FunctionDefinition),
}

impl RoutineRef<'_> {
    pub fn name(&self) -> &str {
        match self {
            RoutineRef::Method(m) => m.name(),
            RoutineRef::Function(f) => f.name(),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            RoutineRef::Method(m) => m.parameters(),
            RoutineRef::Function(f) => f.parameters(),
        }
    }

    /// ABI name of the compiled routine.
    pub fn internal_name(&self) -> String {
        match self {
            RoutineRef::Method(m) => m.internal_name().to_owned(),
            RoutineRef::Function(f) => f.internal_name(),
        }
    }

    /// Internal routines receive their arguments through the C signature
    /// instead of fetching them from the call frame.
    pub fn is_internal(&self) -> bool {
        match self {
            RoutineRef::Method(m) => m.is_internal() || m.is_initializer(),
            RoutineRef::Function(_) => false,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            RoutineRef::Method(m) => m.is_static(),
            RoutineRef::Function(_) => true,
        }
    }

    /// Property initializers are compiled into the object-creation hook.
    pub fn is_property_initializer(&self) -> bool {
        self.name().starts_with("zephir_init_properties")
    }
}

#[cfg(test)]
mod tests;
