//! Routine Code Generation
//!
//! Assembles one complete C routine: signature, grouped declarations,
//! memory frame handling and the compiled body. The body is compiled first
//! because it decides which temporaries exist and whether the routine needs
//! a memory frame at all.

use rustc_hash::FxHashMap;
use zeal_ir::{ClassDefinition, RoutineRef, Stmt, StmtKind, Variable};

use crate::stmt::StatementBlock;
use crate::{
    backend_for, Backend, CodePrinter, CodegenError, CodegenOptions, CodegenResult,
    CompilationContext,
};

/// Output of [`compile_routine`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledUnit {
    /// The routine's C source.
    pub code: String,
    /// Kernel headers the code depends on, sorted.
    pub headers: Vec<String>,
}

/// Compile `body` as `routine`.
///
/// `locals` are the variables upstream analysis declared in the routine's
/// scope. Methods need their `class`.
pub fn compile_routine(
    options: &CodegenOptions,
    class: Option<&ClassDefinition>,
    routine: RoutineRef<'_>,
    locals: &[Variable],
    body: &[Stmt],
) -> CodegenResult<CompiledUnit> {
    let backend = backend_for(options.family());
    tracing::debug!(
        routine = routine.name(),
        family = %options.family(),
        statements = body.len(),
        "compiling routine"
    );

    let mut ctx = CompilationContext::new(backend, options);
    if let Some(class) = class {
        ctx = ctx.with_class(class);
    }
    for local in locals {
        ctx.symbol_table.declare(local.clone());
    }

    let signature = signature(backend, class, routine)?;
    let pre_init = backend.on_pre_init_var(routine, &mut ctx);

    ctx.printer.set_level(1);
    let compiled = compile_body(backend, routine, body, &mut ctx);
    if let Err(error) = &compiled {
        tracing::debug!(routine = routine.name(), %error, "routine failed");
    }
    compiled?;
    let body_code = ctx.printer.take_output();
    let grow = ctx.symbol_table.must_grow_stack();

    let mut printer = CodePrinter::new(options.indent());
    printer.output(&signature);
    printer.output("{");
    printer.increase_level();
    if let Some(line) = &pre_init {
        printer.output(line);
    }
    let inits = declare_variables(backend, &ctx, &mut printer)?;
    for init in &inits {
        printer.output(init);
    }
    if grow {
        printer.output("ZEPHIR_MM_GROW();");
    }
    for line in body_code.lines() {
        printer.output_raw(line);
    }
    printer.decrease_level();
    printer.output("}");

    Ok(CompiledUnit {
        code: printer.take_output(),
        headers: std::mem::take(&mut ctx.headers).into_vec(),
    })
}

fn signature(
    backend: &dyn Backend,
    class: Option<&ClassDefinition>,
    routine: RoutineRef<'_>,
) -> CodegenResult<String> {
    if routine.is_internal() {
        return Ok(backend.internal_signature(routine));
    }
    match routine {
        RoutineRef::Method(method) => {
            let class = class.ok_or_else(|| {
                CodegenError::invalid_statement(
                    format!("method '{}' compiled without its class", method.name()),
                    None,
                )
            })?;
            Ok(format!("PHP_METHOD({}, {})", class.c_name(), method.name()))
        }
        RoutineRef::Function(function) => {
            Ok(format!("PHP_FUNCTION({})", function.internal_name()))
        }
    }
}

/// Parameter prologue, hooks and statements, at the routine's top level.
fn compile_body(
    backend: &dyn Backend,
    routine: RoutineRef<'_>,
    body: &[Stmt],
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    backend.bind_parameters(routine, ctx)?;
    backend.on_pre_compile(routine, ctx);
    StatementBlock::new(body).compile_statements(ctx)?;
    let returns = matches!(
        body.last().map(|stmt| &stmt.kind),
        Some(StmtKind::Return(_))
    );
    if ctx.symbol_table.must_grow_stack() && !returns {
        ctx.output("ZEPHIR_MM_RESTORE();");
    }
    backend.on_post_compile(routine, ctx);
    Ok(())
}

/// One declaration per C storage type, in order of first use. Returns the
/// statements that must run before the body.
fn declare_variables(
    backend: &dyn Backend,
    ctx: &CompilationContext<'_>,
    printer: &mut CodePrinter,
) -> CodegenResult<Vec<String>> {
    let mut groups: Vec<(&'static str, Vec<String>)> = Vec::new();
    let mut group_index: FxHashMap<&'static str, usize> = FxHashMap::default();
    let mut inits = Vec::new();

    for variable in ctx.symbol_table.variables() {
        let definition = backend.type_definition(variable.ty());
        let init = backend.init_code(variable.ty(), definition.indirection, &variable)?;
        let index = *group_index.entry(definition.storage).or_insert_with(|| {
            groups.push((definition.storage, Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push(init.declarator);
        inits.extend(init.init);
    }

    for (storage, declarators) in &groups {
        printer.output(&format!("{storage} {};", declarators.join(", ")));
    }
    if !groups.is_empty() {
        printer.output_blank_line();
    }
    Ok(inits)
}

#[cfg(test)]
mod tests;
