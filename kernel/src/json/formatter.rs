//! A [`Formatter`] that lays out JSON the way existing scan report consumers expect to see it.
//!
//! Objects put every entry on its own line, indented by two spaces per nesting level, with
//! `" : "` between key and value. Arrays stay on the line they start on: `[ a, b ]`. Empty objects
//! and arrays render as `{ }` and `[ ]`. Arrays do not add a nesting level, so an object inside an
//! array is indented relative to the object that contains the array:
//!
//! ```text
//! {
//!   "fields" : [ {
//!     "id" : 1
//!   } ]
//! }
//! ```

use std::io;

use serde_json::ser::Formatter;

const INDENT: &[u8] = b"  ";

#[derive(Debug, Default)]
pub struct IndentedFormatter {
    depth: usize,
    // one entry per open container: whether it has emitted a value yet
    has_value: Vec<bool>,
}

impl IndentedFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark_value(&mut self) {
        if let Some(last) = self.has_value.last_mut() {
            *last = true;
        }
    }
}

fn indent<W: ?Sized + io::Write>(writer: &mut W, depth: usize) -> io::Result<()> {
    writer.write_all(b"\n")?;
    for _ in 0..depth {
        writer.write_all(INDENT)?;
    }
    Ok(())
}

impl Formatter for IndentedFormatter {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.has_value.push(false);
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.has_value.pop();
        writer.write_all(b" ]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.mark_value();
        writer.write_all(if first { b" " } else { b", " })
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value.push(false);
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value.pop().unwrap_or(false) {
            indent(writer, self.depth)?;
        } else {
            writer.write_all(b" ")?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.mark_value();
        if !first {
            writer.write_all(b",")?;
        }
        indent(writer, self.depth)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        Ok(())
    }
}
