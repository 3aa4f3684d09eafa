//! C Code Generation Backend for Zeal
//!
//! Translates typed Zeal IR into C source for the Zend runtime, one routine
//! at a time. The runtime has two incompatible value models, and everything
//! that depends on which one is targeted sits behind the [`Backend`] trait.
//!
//! # Architecture
//!
//! - **Backend** (`backend/`): the [`Backend`] capability trait, the shared
//!   [`Baseline`] behaviour and the two runtime families
//!   ([`ZendEngine2`] and [`ZendEngine3`])
//! - **Context** (`context.rs`): per-unit mutable state, see
//!   [`CompilationContext`]
//! - **Expressions** (`expr.rs`): IR expressions to [`CompiledExpression`]s
//! - **Statements** (`stmt/`): one emitter per control construct
//! - **Driver** (`function.rs`): assembles a complete routine
//!
//! Every unit owns its own [`CompilationContext`], so independent units can
//! be compiled on different threads. Backends themselves are stateless and
//! shared.
//!
//! # Debugging
//!
//! Enable tracing with environment variables:
//! - `RUST_LOG=zeal_codegen=debug` - Backend selection and routine compilation
//! - `RUST_LOG=zeal_codegen=trace` - Every emitted construct (very verbose)
//!
//! # Example
//!
//! ```ignore
//! use zeal_codegen::{compile_routine, CodegenOptions, RuntimeFamily};
//! use zeal_ir::{ClassDefinition, ClassMethod, RoutineRef};
//!
//! let options = CodegenOptions::default().with_family(RuntimeFamily::ZendEngine3);
//! let class = ClassDefinition::new("Test", "Flow");
//! let method = ClassMethod::new(&class, "testIf1");
//! let unit = compile_routine(&options, Some(&class), RoutineRef::Method(&method), &[], &body)?;
//! println!("{}", unit.code);
//! ```
//!
//! [`CompiledExpression`]: zeal_ir::CompiledExpression

pub mod backend;
mod config;
mod context;
mod error;
pub mod expr;
mod flags;
mod function;
mod printer;
pub mod stmt;
mod symbols;
mod utils;
mod variable;

pub use backend::{
    backend_for, Backend, Baseline, CallDestination, CopySource, ForEachPlan, Indirection, InitCode,
    MemberKey, PropertyAccess, TypeDefinition, ZendEngine2, ZendEngine3,
};
pub use config::{CodegenOptions, ParseFamilyError, RuntimeFamily};
pub use context::{CompilationContext, HeadersManager};
pub use error::{CodegenError, CodegenResult};
pub use flags::AccessFlags;
pub use function::{compile_routine, CompiledUnit};
pub use printer::CodePrinter;
pub use symbols::{ScopedSymbolTable, SymbolTable};
pub use utils::escape_c_string;
pub use variable::{init_variant, observe_variant};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=zeal_codegen=debug` or `RUST_LOG=zeal_codegen=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
