//! Variables as seen by the code generator.

use crate::{SemanticType, SourceLocation, StorageClass};

/// A named storage slot within one scope.
///
/// Created by the symbol table the first time a scope mentions a name.
/// The backend only reads it; the slot's runtime storage belongs to the
/// target runtime.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Variable {
    name: String,
    ty: SemanticType,
    storage: StorageClass,
    default_init: Option<String>,
    must_init_null: bool,
    original: Option<SourceLocation>,
}

impl Variable {
    /// Receiver of an instance method.
    pub const THIS: &'static str = "this_ptr";
    /// Slot a method writes its result into.
    pub const RETURN_VALUE: &'static str = "return_value";

    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Variable {
            name: name.into(),
            ty,
            storage: StorageClass::Abi,
            default_init: None,
            must_init_null: false,
            original: None,
        }
    }

    #[must_use]
    pub fn with_storage(mut self, storage: StorageClass) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_init = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_init_null(mut self, must_init_null: bool) -> Self {
        self.must_init_null = must_init_null;
        self
    }

    #[must_use]
    pub fn with_original(mut self, original: SourceLocation) -> Self {
        self.original = Some(original);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> SemanticType {
        self.ty
    }

    pub fn storage(&self) -> StorageClass {
        self.storage
    }

    pub fn default_init(&self) -> Option<&str> {
        self.default_init.as_deref()
    }

    pub fn must_init_null(&self) -> bool {
        self.must_init_null
    }

    pub fn original(&self) -> Option<&SourceLocation> {
        self.original.as_ref()
    }

    pub fn is_local_only(&self) -> bool {
        self.storage == StorageClass::LocalOnly
    }

    pub fn is_double_pointer(&self) -> bool {
        self.storage == StorageClass::DoublePointer
    }

    pub fn is_dynamic_container(&self) -> bool {
        self.ty.is_dynamic_container()
    }

    /// `this_ptr` or `return_value`: names the runtime hands us as pointers.
    pub fn is_reserved(&self) -> bool {
        self.name == Self::THIS || self.name == Self::RETURN_VALUE
    }
}
