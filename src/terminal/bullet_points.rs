const INDENT_SIZE: usize = 2;

/// Prints nested bullet point lists, e.g. the account hierarchy or a journal entry with its lines
#[derive(Clone)]
pub struct BulletPointPrinter<W: LineWriter + Clone> {
    writer: W,
    nesting: usize,
}

impl<W: LineWriter + Clone> BulletPointPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, nesting: 0 }
    }

    pub fn print_item(&self, message: impl std::fmt::Display) {
        let indent = " ".repeat(self.nesting * INDENT_SIZE);
        self.writer.write_line(&format!("{}• {}", indent, message));
    }

    /// Print `items`, or a placeholder if there are none
    pub fn print_items<T: std::fmt::Display>(
        &self,
        items: impl IntoIterator<Item = T>,
        placeholder: impl std::fmt::Display,
    ) {
        let mut empty = true;
        for item in items {
            empty = false;
            self.print_item(item);
        }
        if empty {
            self.print_item(placeholder);
        }
    }

    pub fn indent(&self) -> Self {
        self.nested(1)
    }

    pub fn nested(&self, levels: usize) -> Self {
        Self {
            writer: self.writer.clone(),
            nesting: self.nesting + levels,
        }
    }
}

impl BulletPointPrinter<StdoutLineWriter> {
    pub fn new_stdout() -> Self {
        Self::new(StdoutLineWriter)
    }
}

pub trait LineWriter {
    fn write_line(&self, line: &str);
}

#[derive(Clone, Copy)]
pub struct StdoutLineWriter;
impl LineWriter for StdoutLineWriter {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingLineWriter(Rc<RefCell<Vec<String>>>);
    impl LineWriter for RecordingLineWriter {
        fn write_line(&self, line: &str) {
            self.0.borrow_mut().push(line.to_string());
        }
    }

    #[test]
    fn nesting() {
        let writer = RecordingLineWriter::default();
        let printer = BulletPointPrinter::new(writer.clone());
        printer.print_item("Assets - Cash - PT");
        printer.indent().print_item("ICICI Bank - PT");
        printer.nested(2).print_item("Sub account");
        printer.print_item(42);
        assert_eq!(
            vec![
                "• Assets - Cash - PT",
                "  • ICICI Bank - PT",
                "    • Sub account",
                "• 42",
            ],
            *writer.0.borrow()
        );
    }

    #[test]
    fn print_items() {
        let writer = RecordingLineWriter::default();
        let printer = BulletPointPrinter::new(writer.clone());
        printer.print_items(["a", "b"], "(none)");
        printer.indent().print_items(Vec::<String>::new(), "(none)");
        assert_eq!(vec!["• a", "• b", "  • (none)"], *writer.0.borrow());
    }
}
