/// Line-oriented source buffer with block indentation.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    out: String,
    indent: usize,
}

const INDENT: &str = "    ";

impl CodeWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    /// Write `header` and indent until the matching [`close`](Self::close).
    pub(crate) fn open(&mut self, header: impl AsRef<str>) {
        self.line(header);
        self.indent += 1;
    }

    pub(crate) fn close(&mut self, footer: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(footer);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_indent() {
        let mut w = CodeWriter::new();
        w.open("fn main() {");
        w.line("let x = 1;");
        w.line("");
        w.close("}");
        w.blank();
        w.blank();
        w.line("// end");
        assert_eq!(w.finish(), "fn main() {\n    let x = 1;\n\n}\n\n// end\n");
    }
}
