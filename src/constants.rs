/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decompression flags, DEFLATE symbol tables and table size limits.

/// If set, the input has a valid zlib header and ends with an adler32
/// checksum (it's a valid zlib stream).
pub const PARSE_ZLIB_HEADER: u32 = 0x01;

/// If set, the input has a valid gzip header and ends with a crc32
/// checksum and isize (it's a valid gzip stream).
pub const PARSE_GZIP_HEADER: u32 = 0x02;

/// If set, there are more input bytes available beyond the end of the
/// supplied input buffer. If clear, the input buffer contains all
/// remaining input.
pub const HAS_MORE_INPUT: u32 = 0x04;

/// If set, the output buffer is large enough to hold the entire
/// decompressed stream. If clear, the output buffer is treated as a
/// ring buffer at least the size of the dictionary (typically 32 KiB).
pub const USING_NON_WRAPPING_OUTPUT_BUF: u32 = 0x08;

/// Max size of the LZ dictionary.
pub const LZ_DICT_SIZE: usize = 32768;

/// Number of symbols in each Huffman code. Note: for the literal/length
/// and distance codes, these are actually the maximum values; a given
/// block might use fewer symbols.
pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_DIST_SYMS: usize = 32;

/// Maximum codeword length across all codes.
pub const DEFLATE_MAX_CODEWORD_LENGTH: u32 = 15;

/// Indices of the three decode tables held by the decompressor.
pub const LITLEN_TABLE: usize = 0;
pub const DIST_TABLE: usize = 1;
pub const PRECODE_TABLE: usize = 2;

/// Order in which precode lengths are stored.
pub static DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15
];

/// Added to `HLIT`/`HDIST`/`HCLEN` read from a dynamic block header.
pub static MIN_TABLE_SIZES: [u16; 3] = [257, 1, 4];

/// Bit widths of the `HLIT`/`HDIST`/`HCLEN` fields themselves.
pub static TABLE_SIZE_BITS: [u8; 3] = [5, 5, 4];

/// Scratch space for the run-length encoded litlen+distance code
/// lengths of a dynamic block. 137 extra bytes absorb the worst-case
/// overrun (a repeat of 138 zeroes when only one length was missing).
pub const MAX_LEN_CODES: usize = DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_DIST_SYMS + 137;

/// Base match length for litlen symbols 257..285, padded so that the
/// invalid symbols 286 and 287 decode to a harmless zero-length match.
pub static LENGTH_BASE: [u16; 31] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258, 0, 0
];

pub static LENGTH_EXTRA: [u8; 31] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0, 0, 0
];

/// Base match distance for distance symbols 0..29, padded for the two
/// reserved symbols.
pub static DIST_BASE: [u16; 32] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577, 0, 0
];

pub static DIST_EXTRA: [u8; 32] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13, 0, 0
];

/// Extra bits and base repeat count for the precode RLE symbols
/// 16, 17 and 18.
pub static PRECODE_REPEAT_EXTRA: [u8; 3] = [2, 3, 7];
pub static PRECODE_REPEAT_BASE: [u16; 3] = [3, 3, 11];

/// Gzip header flag bits.
pub const GZIP_FHCRC: u8 = 0x02;
pub const GZIP_FEXTRA: u8 = 0x04;
pub const GZIP_FNAME: u8 = 0x08;
pub const GZIP_FCOMMENT: u8 = 0x10;
