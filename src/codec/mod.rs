//! Compression codecs for ZIP entries.
//!
//! ZIP defines many compression methods; this writer produces the two
//! that every extractor understands: store (method 0) and deflate
//! (method 8).

pub mod deflate;
mod store;

use std::io::{self, Write};

use crate::{Error, Result};

pub use deflate::{DeflateDecoder, DeflateEncoder, DeflateEncoderOptions};
pub use store::StoreDecoder;

/// The compression method applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    /// No compression (method 0).
    Store,
    /// Raw deflate (method 8).
    #[default]
    Deflate,
}

impl CompressionMethod {
    /// The method id stored in ZIP headers.
    pub fn id(&self) -> u16 {
        match self {
            Self::Store => 0,
            Self::Deflate => 8,
        }
    }

    /// Resolves a method id from a ZIP header.
    pub fn from_id(id: u16) -> Result<Self> {
        match id {
            0 => Ok(Self::Store),
            8 => Ok(Self::Deflate),
            _ => Err(Error::UnsupportedFeature {
                feature: "compression method",
            }),
        }
    }
}

/// A compressing writer for one entry's content.
///
/// Wraps the downstream sink (the encrypting writer in the entry
/// pipeline) and compresses with the entry's method. [`finish`] flushes
/// any buffered compressor state and hands the sink back.
///
/// [`finish`]: Compressor::finish
pub enum Compressor<W: Write> {
    /// Passthrough for stored entries.
    Store(W),
    /// Raw deflate.
    Deflate(DeflateEncoder<W>),
}

impl<W: Write> Compressor<W> {
    /// Creates a compressor for the given method.
    pub fn new(method: CompressionMethod, output: W, options: &DeflateEncoderOptions) -> Self {
        match method {
            CompressionMethod::Store => Self::Store(output),
            CompressionMethod::Deflate => Self::Deflate(DeflateEncoder::new(output, options)),
        }
    }

    /// Finishes compression and returns the underlying sink.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Store(inner) => Ok(inner),
            Self::Deflate(encoder) => encoder.try_finish(),
        }
    }
}

impl<W: Write> Write for Compressor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Store(inner) => inner.write(buf),
            Self::Deflate(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Store(inner) => inner.flush(),
            Self::Deflate(encoder) => encoder.flush(),
        }
    }
}

impl<W: Write> std::fmt::Debug for Compressor<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(_) => f.debug_struct("Compressor::Store").finish_non_exhaustive(),
            Self::Deflate(_) => f.debug_struct("Compressor::Deflate").finish_non_exhaustive(),
        }
    }
}
