//! Symbol table contract and the scoped table the driver uses.
//!
//! Upstream analysis declares every user variable before code generation.
//! The backend only asks for existing slots, allocates temporaries and
//! records the scope-level "must grow stack" flag.

use rustc_hash::FxHashMap;
use zeal_ir::{SemanticType, SourceLocation, StorageClass, Variable};

use crate::{CodegenError, CodegenResult};

/// Allocate or fetch named slots of a semantic type.
pub trait SymbolTable {
    /// Add a variable to the scope, replacing any previous one of that name.
    fn declare(&mut self, variable: Variable);

    fn get_variable(&self, name: &str) -> Option<&Variable>;

    fn has_variable(&self, name: &str) -> bool {
        self.get_variable(name).is_some()
    }

    fn get_variable_for_read(
        &self,
        name: &str,
        location: Option<&SourceLocation>,
    ) -> CodegenResult<Variable>;

    fn get_variable_for_write(
        &mut self,
        name: &str,
        location: Option<&SourceLocation>,
    ) -> CodegenResult<Variable>;

    /// A fresh temporary the caller initializes before use.
    fn get_temp_variable_for_write(&mut self, ty: SemanticType) -> Variable;

    /// A fresh temporary with an explicit storage class.
    fn add_temp(&mut self, ty: SemanticType, storage: StorageClass) -> Variable;

    /// Count one more initialization of `name`; returns the previous count.
    fn record_variant_init(&mut self, name: &str) -> u32;

    fn set_must_grow_stack(&mut self, grow: bool);

    fn must_grow_stack(&self) -> bool;

    /// Declared variables in declaration order, reserved names excluded.
    fn variables(&self) -> Vec<Variable>;
}

/// Flat scope backed by a hash map plus declaration order.
#[derive(Clone, Debug, Default)]
pub struct ScopedSymbolTable {
    variables: FxHashMap<String, Variable>,
    order: Vec<String>,
    variant_inits: FxHashMap<String, u32>,
    temp_counter: u32,
    must_grow_stack: bool,
}

impl ScopedSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.declare(variable);
        self
    }

    fn reserved(name: &str) -> Option<Variable> {
        match name {
            "this" | Variable::THIS => Some(Variable::new(Variable::THIS, SemanticType::Variable)),
            Variable::RETURN_VALUE => {
                Some(Variable::new(Variable::RETURN_VALUE, SemanticType::Variable))
            }
            _ => None,
        }
    }

    fn lookup(&self, name: &str, location: Option<&SourceLocation>) -> CodegenResult<Variable> {
        if let Some(variable) = Self::reserved(name) {
            return Ok(variable);
        }
        self.variables
            .get(name)
            .cloned()
            .ok_or_else(|| CodegenError::UnknownVariable {
                name: name.to_owned(),
                location: location.cloned(),
            })
    }

    fn next_temp_name(&mut self) -> String {
        let name = format!("_{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }
}

impl SymbolTable for ScopedSymbolTable {
    fn declare(&mut self, variable: Variable) {
        let name = variable.name().to_owned();
        if self.variables.insert(name.clone(), variable).is_none() {
            self.order.push(name);
        }
    }

    fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    fn get_variable_for_read(
        &self,
        name: &str,
        location: Option<&SourceLocation>,
    ) -> CodegenResult<Variable> {
        self.lookup(name, location)
    }

    fn get_variable_for_write(
        &mut self,
        name: &str,
        location: Option<&SourceLocation>,
    ) -> CodegenResult<Variable> {
        self.lookup(name, location)
    }

    fn get_temp_variable_for_write(&mut self, ty: SemanticType) -> Variable {
        self.add_temp(ty, StorageClass::Abi)
    }

    fn add_temp(&mut self, ty: SemanticType, storage: StorageClass) -> Variable {
        let name = self.next_temp_name();
        let variable = Variable::new(name, ty).with_storage(storage);
        self.declare(variable.clone());
        variable
    }

    fn record_variant_init(&mut self, name: &str) -> u32 {
        let count = self.variant_inits.entry(name.to_owned()).or_insert(0);
        let previous = *count;
        *count += 1;
        previous
    }

    fn set_must_grow_stack(&mut self, grow: bool) {
        self.must_grow_stack = grow;
    }

    fn must_grow_stack(&self) -> bool {
        self.must_grow_stack
    }

    fn variables(&self) -> Vec<Variable> {
        self.order
            .iter()
            .filter_map(|name| self.variables.get(name))
            .filter(|variable| !variable.is_reserved())
            .cloned()
            .collect()
    }
}
