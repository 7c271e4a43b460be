/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Incremental trailer checksums.
//!
//! The decompressor folds every slice of output it emits into a
//! running value held in its saved state, so checksumming survives
//! suspension the same way the bit buffer does. The stored value is
//! the finalised form, which both hashers here can resume from.

#[cfg(feature = "zlib")]
pub(crate) fn adler32_update(running: u32, data: &[u8]) -> u32
{
    use simd_adler32::Adler32;

    let mut hasher = Adler32::from_checksum(running);
    hasher.write(data);
    hasher.finish()
}

#[cfg(feature = "gzip")]
pub(crate) fn crc32_update(running: u32, data: &[u8]) -> u32
{
    let mut hasher = crc32fast::Hasher::new_with_initial(running);
    hasher.update(data);
    hasher.finalize()
}
