//! Utilities for testing.

use std::{
    cmp,
    fmt::Debug,
    io::{Read, Result},
};

use nom::IResult;
pub use qwk_types::testing::known_answer_test_encode;

/// Applies `parser` to `test` and asserts remainder and output.
pub fn known_answer_test_parse<'a, O, P>(
    (test, expected_remainder, expected_object): (&'a [u8], &[u8], O),
    parser: P,
) where
    O: Debug + PartialEq + 'a,
    P: Fn(&'a [u8]) -> IResult<&'a [u8], O>,
{
    let (got_remainder, got_object) = parser(test).unwrap();
    assert_eq!(expected_remainder, got_remainder);
    assert_eq!(expected_object, got_object);
}

/// A reader that returns at most `chunk` bytes per call.
///
/// Models decompression streams, which are free to return short reads even
/// when more data remains.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    inner: R,
    chunk: usize,
}

impl<R: Read> ChunkedReader<R> {
    pub fn new(inner: R, chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be positive");

        Self { inner, chunk }
    }
}

impl<R: Read> Read for ChunkedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = cmp::min(buf.len(), self.chunk);

        self.inner.read(&mut buf[..len])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_chunked_reader() {
        let mut reader = ChunkedReader::new(&b"abcdef"[..], 4);
        let mut buf = [0u8; 6];

        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(reader.read(&mut buf[4..]).unwrap(), 2);
        assert_eq!(&buf, b"abcdef");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }
}
