use anyhow::Result;
use std::io::Write;

pub type EmitResult = Result<()>;

/// Indentation state threaded through emitters.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "  ".to_string(),
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn write_line<W: Write>(&self, writer: &mut W, text: &str) -> EmitResult {
        writeln!(writer, "{}{}", self.get_indent(), text)?;
        Ok(())
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Something that can render an item of type `T` to a writer.
pub trait Emitter<T> {
    fn emit<W: Write>(&self, item: &T, writer: &mut W, context: &mut EmitContext) -> EmitResult;

    fn emit_to_string(&self, item: &T) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::new();
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }
}
