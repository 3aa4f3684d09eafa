//! Semantic types and storage classes.

use std::fmt;

/// Abstract value category of a variable or expression.
///
/// The first group is what user code can name. The second group only
/// appears on temporaries the backend allocates for itself (hash cursors,
/// iteration keys, class-entry caches).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SemanticType {
    Int,
    UInt,
    Long,
    ULong,
    Double,
    Bool,
    Char,
    UChar,
    String,
    Array,
    Object,
    Callable,
    Resource,
    /// Opaque dynamic value.
    Variable,
    Null,

    /// Pointer to a dynamic value owned by someone else.
    DynamicPtr,
    /// Integer key of a hash entry.
    HashKeyIndex,
    /// String key of a hash entry.
    HashKeyString,
    HashTable,
    HashPosition,
    ClassEntry,
    FcallCache,
}

impl SemanticType {
    /// Every semantic type, in declaration order.
    pub const ALL: [SemanticType; 22] = [
        SemanticType::Int,
        SemanticType::UInt,
        SemanticType::Long,
        SemanticType::ULong,
        SemanticType::Double,
        SemanticType::Bool,
        SemanticType::Char,
        SemanticType::UChar,
        SemanticType::String,
        SemanticType::Array,
        SemanticType::Object,
        SemanticType::Callable,
        SemanticType::Resource,
        SemanticType::Variable,
        SemanticType::Null,
        SemanticType::DynamicPtr,
        SemanticType::HashKeyIndex,
        SemanticType::HashKeyString,
        SemanticType::HashTable,
        SemanticType::HashPosition,
        SemanticType::ClassEntry,
        SemanticType::FcallCache,
    ];

    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            SemanticType::Int => "int",
            SemanticType::UInt => "uint",
            SemanticType::Long => "long",
            SemanticType::ULong => "ulong",
            SemanticType::Double => "double",
            SemanticType::Bool => "bool",
            SemanticType::Char => "char",
            SemanticType::UChar => "uchar",
            SemanticType::String => "string",
            SemanticType::Array => "array",
            SemanticType::Object => "object",
            SemanticType::Callable => "callable",
            SemanticType::Resource => "resource",
            SemanticType::Variable => "variable",
            SemanticType::Null => "null",
            SemanticType::DynamicPtr => "zval_ptr",
            SemanticType::HashKeyIndex => "zend_ulong",
            SemanticType::HashKeyString => "zend_string",
            SemanticType::HashTable => "HashTable",
            SemanticType::HashPosition => "HashPosition",
            SemanticType::ClassEntry => "zend_class_entry",
            SemanticType::FcallCache => "zephir_fcall_cache_entry",
        }
    }

    /// Values of this type live in a reference-counted dynamic cell.
    ///
    /// These slots must be initialised to the runtime's empty state before
    /// first use and are never declared with a scalar initializer.
    pub fn is_dynamic_container(self) -> bool {
        matches!(
            self,
            SemanticType::Variable
                | SemanticType::String
                | SemanticType::Array
                | SemanticType::Resource
                | SemanticType::Callable
                | SemanticType::Object
        )
    }

    /// Integer-like types (used for index keys).
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SemanticType::Int | SemanticType::UInt | SemanticType::Long | SemanticType::ULong
        )
    }

    /// Plain C scalars.
    pub fn is_scalar(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                SemanticType::Double | SemanticType::Bool | SemanticType::Char | SemanticType::UChar
            )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a variable's slot is exposed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StorageClass {
    /// Visible to the runtime ABI (the usual case).
    #[default]
    Abi,
    /// Only ever touched by generated local code; declared without an
    /// initializer.
    LocalOnly,
    /// Pointer-to-pointer slot (hash cursors in the legacy family).
    DoublePointer,
}
