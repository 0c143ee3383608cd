use std::fmt;

use arrayvec::ArrayString;

pub const MAIN_CAPACITY: usize = 128;
/// Trailing annotations (`; ILLEGAL`, PC targets, availability) share this
/// much space. Anything beyond it is dropped.
pub const COMMENT_CAPACITY: usize = 48;

/// Fixed-capacity destination for one rendered instruction.
///
/// Writes never fail. Text that does not fit is cut off at a character
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    main: ArrayString<MAIN_CAPACITY>,
    comment: ArrayString<COMMENT_CAPACITY>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.comment.clear();
    }

    /// Instruction text without annotations.
    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Current column of the main text.
    pub fn column(&self) -> usize {
        self.main.len()
    }

    /// Main text followed directly by the annotations.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.main.len() + self.comment.len());
        text.push_str(&self.main);
        text.push_str(&self.comment);
        text
    }

    pub(crate) fn comment_writer(&mut self) -> CommentWriter<'_> {
        CommentWriter(&mut self.comment)
    }
}

fn push_truncating<const N: usize>(buf: &mut ArrayString<N>, s: &str) {
    for c in s.chars() {
        if buf.try_push(c).is_err() {
            break;
        }
    }
}

impl fmt::Write for OutputSink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        push_truncating(&mut self.main, s);
        Ok(())
    }
}

/// Appends to the annotation buffer of a sink.
pub(crate) struct CommentWriter<'a>(&'a mut ArrayString<COMMENT_CAPACITY>);

impl fmt::Write for CommentWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        push_truncating(self.0, s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn comment_follows_main_text() {
        let mut sink = OutputSink::new();
        write!(sink, "dc.w $4afc").unwrap();
        write!(sink.comment_writer(), "; ILLEGAL").unwrap();
        write!(sink, "!").unwrap();
        assert_eq!(sink.main(), "dc.w $4afc!");
        assert_eq!(sink.text(), "dc.w $4afc!; ILLEGAL");
    }

    #[test]
    fn overflow_truncates_silently() {
        let mut sink = OutputSink::new();
        for _ in 0..COMMENT_CAPACITY {
            write!(sink.comment_writer(), "; (2+)").unwrap();
        }
        assert_eq!(sink.comment().len(), COMMENT_CAPACITY);
        assert!(sink.comment().starts_with("; (2+); (2+)"));

        let long = "x".repeat(MAIN_CAPACITY * 2);
        assert!(write!(sink, "{long}").is_ok());
        assert_eq!(sink.column(), MAIN_CAPACITY);

        sink.clear();
        assert_eq!(sink.text(), "");
    }
}
