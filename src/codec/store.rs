//! Store codec (no compression).

use std::io::{self, Read};

/// A decoder that passes data through unchanged, bounded by the entry's
/// compressed size.
pub struct StoreDecoder<R> {
    inner: R,
    remaining: u64,
}

impl<R: Read> StoreDecoder<R> {
    /// Creates a new store decoder.
    ///
    /// # Arguments
    ///
    /// * `inner` - The data source
    /// * `size` - Expected size of the data
    pub fn new(inner: R, size: u64) -> Self {
        Self {
            inner,
            remaining: size,
        }
    }
}

impl<R: Read> Read for StoreDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }

        let max_read = (self.remaining as usize).min(buf.len());
        let n = self.inner.read(&mut buf[..max_read])?;
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_store_full_read() {
        let data = b"Hello, World!";
        let mut decoder = StoreDecoder::new(Cursor::new(data.to_vec()), data.len() as u64);

        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        assert_eq!(output, data);
    }

    #[test]
    fn test_store_bounded_read() {
        let data = b"Hello, World!";
        let mut decoder = StoreDecoder::new(Cursor::new(data.to_vec()), 5);

        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        assert_eq!(output, b"Hello");
    }

    #[test]
    fn test_store_empty() {
        let mut decoder = StoreDecoder::new(Cursor::new(Vec::<u8>::new()), 0);

        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        assert!(output.is_empty());
    }
}
