/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Status codes returned by the low-level decompressor and the error
//! type returned by the one-shot decoding API.

use std::fmt::{Debug, Formatter};

/// Result of a single `decompress` call.
///
/// Negative values indicate failure; the two positive values are the
/// suspension statuses of normal streaming operation.
#[repr(i8)]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum InflateStatus
{
    /// The decompressor needed one or more input bytes to make forward
    /// progress, but the caller indicated that no more are available.
    /// The compressed data is probably corrupted or truncated.
    FailedCannotMakeProgress = -5,
    /// One or more of the call parameters was obviously bogus; the
    /// saved state is untouched.
    BadParam = -4,
    /// The stream decoded completely but either the size recorded in
    /// the gzip trailer didn't match the actual output size, or the
    /// crc32 check failed. Calling again returns `Done`.
    IsizeOrCrc32Mismatch = -3,
    /// The stream decoded completely but the adler32 of the output
    /// didn't match the zlib trailer. Calling again returns `Done`.
    Adler32Mismatch = -2,
    /// Structural corruption: bad block type, bad Huffman table,
    /// invalid distance, stored-block length mismatch, bad framing
    /// magic. Sticky until the state is re-initialised.
    Failed = -1,
    /// The stream was fully decoded and the trailer, if any, verified.
    Done = 0,
    /// At least one more input byte is required; supply it and call
    /// again.
    NeedsMoreInput = 1,
    /// The output buffer is full; drain it and call again.
    HasMoreOutput = 2
}

impl InflateStatus
{
    /// Return true if this status is one of the negative failure codes.
    pub const fn is_failure(self) -> bool
    {
        (self as i8) < 0
    }
}

/// A struct returned when decompression fails
pub struct InflateDecodeErrors
{
    /// reason why decompression fails
    pub error: DecodeErrorStatus,
    /// Decoded data up until that decompression error
    pub data:  Vec<u8>
}

impl InflateDecodeErrors
{
    /// Create a new decode wrapper with data being
    /// how many bytes we actually decoded before hitting an error
    pub fn new(error: DecodeErrorStatus, data: Vec<u8>) -> InflateDecodeErrors
    {
        InflateDecodeErrors { error, data }
    }
    /// Create a new decode wrapper with an empty vector
    pub fn new_with_error(error: DecodeErrorStatus) -> InflateDecodeErrors
    {
        InflateDecodeErrors::new(error, vec![])
    }
}

impl Debug for InflateDecodeErrors
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        writeln!(f, "{:?}", self.error)
    }
}

pub enum DecodeErrorStatus
{
    /// Input data is not enough to construct
    /// a full output
    InsufficientData,
    /// Anything that isn't significant
    Generic(&'static str),
    ///Input data was malformed.
    CorruptData,
    /// Limit set by the user was exceeded by
    /// decompressed output
    OutputLimitExceeded(usize, usize),
    /// Output CRC does not match stored CRC.
    ///
    /// Only present for gzip
    MismatchedCRC(u32, u32),
    /// Output Adler does not match stored adler
    ///
    /// Only present for zlib
    MismatchedAdler(u32, u32),
    /// The size stored in the gzip trailer does not match
    /// the number of bytes the stream decompressed to
    MismatchedIsize(u32, u32)
}

impl Debug for DecodeErrorStatus
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::InsufficientData => writeln!(f, "Insufficient data"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::CorruptData => writeln!(f, "Corrupt data"),
            Self::OutputLimitExceeded(limit, current) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {current}"
            ),
            Self::MismatchedCRC(expected, found) =>
            {
                writeln!(f, "Mismatched CRC, expected {expected} but found {found}")
            }
            Self::MismatchedAdler(expected, found) =>
            {
                writeln!(f, "Mismatched Adler, expected {expected} but found {found}")
            }
            Self::MismatchedIsize(expected, found) =>
            {
                writeln!(f, "Mismatched isize, expected {expected} but found {found}")
            }
        }
    }
}
