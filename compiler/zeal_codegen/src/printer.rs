//! Indentation-aware line sink for emitted C.

/// Collects emitted lines at the current indentation level.
#[derive(Clone, Debug)]
pub struct CodePrinter {
    output: String,
    level: usize,
    indent: String,
}

impl Default for CodePrinter {
    fn default() -> Self {
        CodePrinter::new("\t")
    }
}

impl CodePrinter {
    pub fn new(indent: impl Into<String>) -> Self {
        CodePrinter {
            output: String::with_capacity(1024),
            level: 0,
            indent: indent.into(),
        }
    }

    /// Write a line at the current level.
    pub fn output(&mut self, line: &str) {
        for _ in 0..self.level {
            self.output.push_str(&self.indent);
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Write a line without indentation.
    pub fn output_raw(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    pub fn output_blank_line(&mut self) {
        self.output.push('\n');
    }

    pub fn increase_level(&mut self) {
        self.level += 1;
    }

    pub fn decrease_level(&mut self) {
        debug_assert!(self.level > 0, "decrease_level called at level zero");
        self.level = self.level.saturating_sub(1);
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn output_ref(&self) -> &str {
        &self.output
    }

    /// Remove and return everything written after byte offset `mark`.
    ///
    /// `mark` must come from an earlier `output_ref().len()`.
    pub fn split_off(&mut self, mark: usize) -> String {
        self.output.split_off(mark)
    }

    /// Append lines produced by [`split_off`](Self::split_off) unchanged.
    pub fn append(&mut self, lines: &str) {
        self.output.push_str(lines);
    }

    /// Take the generated output, leaving the printer empty.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}
