//! Single-pass column readers

use std::iter::Peekable;

use crate::schema::Level;

use super::entry::ColumnEntry;

/// Sequential access to one column stream.
///
/// Entries are consumed once, in produced order. The assembler only ever
/// needs the next entry and the repetition level of the one after it.
pub trait ColumnReader {
    /// Consumes the next entry, `None` once the stream is exhausted
    fn next_entry(&mut self) -> Option<ColumnEntry>;

    /// Repetition level of the next entry without consuming it
    fn peek_repetition_level(&mut self) -> Option<Level>;
}

impl<R: ColumnReader + ?Sized> ColumnReader for Box<R> {
    fn next_entry(&mut self) -> Option<ColumnEntry> {
        (**self).next_entry()
    }

    fn peek_repetition_level(&mut self) -> Option<Level> {
        (**self).peek_repetition_level()
    }
}

/// A [`ColumnReader`] over any iterator of entries, including lazy ones.
#[derive(Debug)]
pub struct StreamReader<I: Iterator<Item = ColumnEntry>> {
    inner: Peekable<I>,
}

impl<I: Iterator<Item = ColumnEntry>> StreamReader<I> {
    pub fn new<T>(entries: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            inner: entries.into_iter().peekable(),
        }
    }
}

impl<I: Iterator<Item = ColumnEntry>> ColumnReader for StreamReader<I> {
    fn next_entry(&mut self) -> Option<ColumnEntry> {
        self.inner.next()
    }

    fn peek_repetition_level(&mut self) -> Option<Level> {
        self.inner.peek().map(|e| e.repetition_level)
    }
}
