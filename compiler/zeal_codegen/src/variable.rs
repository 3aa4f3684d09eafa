//! Lifecycle of dynamic variables inside a routine body.
//!
//! Before a dynamic slot receives a new value it is either initialized
//! (`ZEPHIR_INIT_*`, fresh null value) or observed (`ZEPHIR_OBS_*`, the
//! runtime will write a value it produces itself). The `N` variants release
//! the previous value and are used once the slot may already hold one.

use zeal_ir::Variable;

use crate::CompilationContext;

/// Prepare `variable` to receive a value built by the emitted code.
pub fn init_variant(variable: &Variable, ctx: &mut CompilationContext<'_>) {
    emit_lifecycle(variable, "ZEPHIR_INIT_VAR", "ZEPHIR_INIT_NVAR", ctx);
}

/// Prepare `variable` to receive a value produced by a runtime helper.
pub fn observe_variant(variable: &Variable, ctx: &mut CompilationContext<'_>) {
    emit_lifecycle(variable, "ZEPHIR_OBS_VAR", "ZEPHIR_OBS_NVAR", ctx);
}

fn emit_lifecycle(
    variable: &Variable,
    first: &str,
    again: &str,
    ctx: &mut CompilationContext<'_>,
) {
    if variable.is_reserved() {
        return;
    }
    let previous = ctx.symbol_table.record_variant_init(variable.name());
    let code = ctx.backend().variable_code(variable);
    let macro_name = if previous > 0 || ctx.inside_cycle() {
        again
    } else {
        first
    };
    ctx.output(&format!("{macro_name}({code});"));
    ctx.symbol_table.set_must_grow_stack(true);
    ctx.headers.add("kernel/memory");
}
