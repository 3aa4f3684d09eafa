//! Per-unit compilation state.
//!
//! A [`CompilationContext`] lives for exactly one compiled routine. It owns
//! the code printer, the symbol table and the header set, and borrows the
//! backend and options, so units compiled on separate threads never share
//! mutable state.

use std::collections::BTreeSet;

use zeal_ir::{ClassDefinition, SourceLocation};

use crate::symbols::{ScopedSymbolTable, SymbolTable};
use crate::{Backend, CodePrinter, CodegenOptions};

/// Kernel headers the emitted code depends on, sorted and de-duplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadersManager {
    headers: BTreeSet<String>,
}

impl HeadersManager {
    pub fn add(&mut self, header: &str) {
        if !self.headers.contains(header) {
            self.headers.insert(header.to_owned());
        }
    }

    pub fn contains(&self, header: &str) -> bool {
        self.headers.contains(header)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.headers.into_iter().collect()
    }
}

/// Mutable state threaded through every backend operation.
pub struct CompilationContext<'a> {
    backend: &'a dyn Backend,
    options: &'a CodegenOptions,
    class_definition: Option<&'a ClassDefinition>,
    /// Sink for emitted lines.
    pub printer: CodePrinter,
    pub symbol_table: Box<dyn SymbolTable + 'a>,
    pub headers: HeadersManager,
    /// Depth of enclosing loops.
    inside_cycle: u32,
}

impl<'a> CompilationContext<'a> {
    pub fn new(backend: &'a dyn Backend, options: &'a CodegenOptions) -> Self {
        CompilationContext {
            backend,
            options,
            class_definition: None,
            printer: CodePrinter::new(options.indent()),
            symbol_table: Box::new(ScopedSymbolTable::new()),
            headers: HeadersManager::default(),
            inside_cycle: 0,
        }
    }

    #[must_use]
    pub fn with_symbol_table(mut self, symbol_table: impl SymbolTable + 'a) -> Self {
        self.symbol_table = Box::new(symbol_table);
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: &'a ClassDefinition) -> Self {
        self.class_definition = Some(class);
        self
    }

    /// The family this unit is compiled for. Shared baseline code calls
    /// back through it so family overrides take effect.
    pub fn backend(&self) -> &'a dyn Backend {
        self.backend
    }

    pub fn options(&self) -> &'a CodegenOptions {
        self.options
    }

    pub fn class_definition(&self) -> Option<&'a ClassDefinition> {
        self.class_definition
    }

    /// Emit one line at the current indentation.
    pub fn output(&mut self, line: &str) {
        self.printer.output(line);
    }

    /// `"file", line` arguments of location-tagged runtime calls.
    pub fn location_args(&self, location: &SourceLocation) -> String {
        format!(
            "\"{}\", {}",
            self.options.short_path(&location.file),
            location.line
        )
    }

    pub fn enter_cycle(&mut self) {
        self.inside_cycle += 1;
    }

    pub fn leave_cycle(&mut self) {
        debug_assert!(self.inside_cycle > 0, "leave_cycle outside of a loop");
        self.inside_cycle = self.inside_cycle.saturating_sub(1);
    }

    pub fn inside_cycle(&self) -> bool {
        self.inside_cycle > 0
    }
}
