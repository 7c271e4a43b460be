/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A streaming, resumable deflate decoder.
//!
//! This crate decodes raw deflate, zlib and gzip streams through a
//! single caller-owned state value that can be suspended and resumed
//! at any byte boundary of input or output, making it usable both as
//! a one-shot decoder and as the core of a streaming pipeline that
//! only ever holds a bounded window of the output.
//!
//! Use it if
//! - You need to feed compressed data in arbitrary chunks as it
//!   arrives, e.g. off a socket
//! - You need to decompress into a fixed 32 KiB ring instead of
//!   holding the whole output in memory
//! - You want a 100% safe, pure rust implementation of the above
//!
//! # Usage
//!
//! Decoding fully buffered zlib data
//!
//! ```no_run
//! use streamflate::DeflateDecoder;
//! let totally_valid_data = [0; 23];
//! let mut decoder = DeflateDecoder::new(&totally_valid_data);
//!
//! let decompressed = decoder.decode_zlib();
//! ```
//!
//! Decoding a stream chunk by chunk
//!
//! ```no_run
//! use streamflate::InflateDecompressor;
//! use streamflate::{HAS_MORE_INPUT, USING_NON_WRAPPING_OUTPUT_BUF};
//!
//! let chunk = [0; 23];
//! let mut out = vec![0; 1 << 16];
//! let mut decompressor = InflateDecompressor::new();
//!
//! let (status, consumed, written) =
//!     decompressor.decompress(&chunk, &mut out, 0, HAS_MORE_INPUT | USING_NON_WRAPPING_OUTPUT_BUF);
//! // feed the next chunk starting at `consumed`, write at `written`
//! ```
//!
//! Decoding zlib data without confirming the adler32 checksum
//!
//! ```no_run
//! use streamflate::DeflateDecoder;
//! use streamflate::DeflateOptions;
//! let totally_valid_data = [0; 23];
//! let mut options = DeflateOptions::default()
//!                     .set_confirm_checksum(false);
//! let decoder = DeflateDecoder::new_with_options(&totally_valid_data, options);
//! ```
pub use crate::constants::{
    HAS_MORE_INPUT, LZ_DICT_SIZE, PARSE_GZIP_HEADER, PARSE_ZLIB_HEADER,
    USING_NON_WRAPPING_OUTPUT_BUF
};
pub use crate::decoder::{DeflateDecoder, DeflateOptions, InflateDecompressor};
pub use crate::errors::InflateStatus;

mod bitstream;
#[cfg(any(feature = "zlib", feature = "gzip"))]
mod checksum;
mod constants;
mod decoder;
pub mod errors;
mod huffman;
mod window;
