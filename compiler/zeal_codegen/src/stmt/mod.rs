//! Statement Code Generation
//!
//! One emitter per control construct. A [`StatementBlock`] walks a list of
//! statements, dispatches each to its emitter and keeps the block-level
//! facts the backend needs: whether the block is a loop body and which
//! variables it mutates.

mod assign;
mod control;
mod iteration;
mod ret;

use rustc_hash::FxHashMap;
use zeal_ir::{Expr, SourceLocation, Stmt, StmtKind};

use crate::expr::{compile_expr, compile_function_call, compile_method_call};
use crate::{AccessFlags, CallDestination, CodegenResult, CompilationContext};

/// Per-block count of writes to each variable.
#[derive(Clone, Debug, Default)]
pub struct MutateGatherer {
    mutations: FxHashMap<String, u32>,
}

impl MutateGatherer {
    pub fn increase_mutations(&mut self, name: &str) {
        *self.mutations.entry(name.to_owned()).or_insert(0) += 1;
    }

    #[cfg(test)]
    pub fn number_of_mutations(&self, name: &str) -> u32 {
        self.mutations.get(name).copied().unwrap_or(0)
    }
}

/// A list of statements compiled one indentation level deeper than the
/// surrounding code.
pub struct StatementBlock<'s> {
    statements: &'s [Stmt],
    is_loop: bool,
    mutations: MutateGatherer,
}

impl<'s> StatementBlock<'s> {
    pub fn new(statements: &'s [Stmt]) -> Self {
        StatementBlock {
            statements,
            is_loop: false,
            mutations: MutateGatherer::default(),
        }
    }

    /// Mark the block as a loop body; `break` and `continue` become legal.
    pub fn set_loop(&mut self, is_loop: bool) {
        self.is_loop = is_loop;
    }

    #[cfg(test)]
    pub fn is_loop(&self) -> bool {
        self.is_loop
    }

    #[cfg(test)]
    pub fn mutations(&self) -> &MutateGatherer {
        &self.mutations
    }

    pub fn mutations_mut(&mut self) -> &mut MutateGatherer {
        &mut self.mutations
    }

    /// Compile the block at one level deeper than the current one.
    pub fn compile(&mut self, ctx: &mut CompilationContext<'_>) -> CodegenResult<()> {
        ctx.printer.increase_level();
        let result = self.compile_statements(ctx);
        ctx.printer.decrease_level();
        result
    }

    /// Compile the block at the current level.
    pub fn compile_statements(&mut self, ctx: &mut CompilationContext<'_>) -> CodegenResult<()> {
        if self.is_loop {
            ctx.enter_cycle();
        }
        let statements = self.statements;
        let result = statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt, ctx));
        if self.is_loop {
            ctx.leave_cycle();
        }
        result
    }

    fn compile_statement(&mut self, stmt: &Stmt, ctx: &mut CompilationContext<'_>) -> CodegenResult<()> {
        let location = &stmt.location;
        match &stmt.kind {
            StmtKind::Let { target, value } => {
                if let Some(name) = assign::mutated_variable(target) {
                    self.mutations.increase_mutations(name);
                }
                assign::compile_let(target, value, location, ctx)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => control::compile_if(condition, then_branch, else_branch.as_deref(), location, ctx),
            StmtKind::While { condition, body } => {
                control::compile_while(condition, body, location, ctx)
            }
            StmtKind::DoWhile { body, condition } => {
                control::compile_do_while(body, condition, location, ctx)
            }
            StmtKind::Loop { body } => control::compile_loop(body, ctx),
            StmtKind::ForRange(range) => iteration::compile_for_range(range, location, ctx),
            StmtKind::ForEach(each) => iteration::compile_for_each(each, location, ctx),
            StmtKind::Break => control::compile_jump("break", location, ctx),
            StmtKind::Continue => control::compile_jump("continue", location, ctx),
            StmtKind::Return(value) => ret::compile_return(value.as_ref(), location, ctx),
            StmtKind::Expr(expr) => compile_expression_statement(expr, location, ctx),
            StmtKind::UnsetIndex { array, index } => compile_unset(array, index, location, ctx),
        }
    }
}

/// Evaluate `expr` for its side effects.
fn compile_expression_statement(
    expr: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    match expr {
        Expr::MethodCall {
            object,
            method,
            args,
        } => compile_method_call(CallDestination::Discard, object, method, args, location, ctx),
        Expr::FunctionCall { name, args } => {
            compile_function_call(CallDestination::Discard, name, args, location, ctx)
        }
        other => compile_expr(other, location, ctx).map(drop),
    }
}

/// `unset(array[index])`
fn compile_unset(
    array: &str,
    index: &Expr,
    location: &SourceLocation,
    ctx: &mut CompilationContext<'_>,
) -> CodegenResult<()> {
    let array = ctx
        .symbol_table
        .get_variable_for_write(array, Some(location))?;
    let index = compile_expr(index, location, ctx)?;
    ctx.backend()
        .array_unset(&array, &index, AccessFlags::SEPARATE, ctx)
}
