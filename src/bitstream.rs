/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! `BitReader` API
//!
//! This module provides an interface to read bits (and bytes) for
//! huffman decoding across suspension points.
//!
//! Unlike a one-shot reader, this one is constructed from the bit
//! state a previous call saved and hands that state back when the call
//! returns, so a decode loop can stop at any input byte boundary and
//! resume later with nothing lost.

pub(crate) struct BitReader<'src>
{
    // buffer from which we are pulling in bits from
    // used in decompression.
    src:          &'src [u8],
    // position in our buffer
    position:     usize,
    pub bit_buf:  u64,
    pub num_bits: u32
}

impl<'src> BitReader<'src>
{
    /// Create a new `BitReader` resuming from the bit state a previous
    /// call left behind. `bit_buf` must hold exactly `num_bits` valid
    /// low bits.
    pub fn new(src: &'src [u8], bit_buf: u64, num_bits: u32) -> BitReader<'src>
    {
        BitReader {
            src,
            position: 0,
            bit_buf,
            num_bits
        }
    }

    /// Ensure at least `num_bits` bits are buffered, pulling input one
    /// byte at a time.
    ///
    /// Returns false if the input ran dry first; the bytes already
    /// pulled stay buffered, so the caller can suspend and retry the
    /// same operation once more input arrives.
    #[inline(always)]
    pub fn need_bits(&mut self, num_bits: u32) -> bool
    {
        debug_assert!(num_bits <= 32);

        while self.num_bits < num_bits
        {
            match self.src.get(self.position)
            {
                Some(byte) =>
                {
                    self.bit_buf |= u64::from(*byte) << self.num_bits;
                    self.num_bits += 8;
                    self.position += 1;
                }
                None => return false
            }
        }
        true
    }

    /// Return the low `num_bits` bits and discard them from the buffer.
    ///
    /// The bits must already be buffered, see [`need_bits`].
    ///
    /// [`need_bits`]: Self::need_bits
    #[inline(always)]
    pub fn get_bits(&mut self, num_bits: u32) -> u32
    {
        debug_assert!(self.num_bits >= num_bits);

        let mask = (1_u64 << num_bits) - 1;

        let value = self.bit_buf & mask;

        self.bit_buf >>= num_bits;
        self.num_bits -= num_bits;

        value as u32
    }

    #[inline(always)]
    pub fn drop_bits(&mut self, bits: u32)
    {
        debug_assert!(self.num_bits >= bits);
        self.bit_buf >>= bits;
        self.num_bits -= bits;
    }

    /// Refill four bytes at once, little endian.
    ///
    /// The fast path of the literal/length loop calls this once per
    /// iteration instead of topping the buffer up byte by byte; the
    /// caller must have checked that four input bytes remain.
    #[inline(always)]
    pub fn refill_32(&mut self)
    {
        if self.num_bits < 30
        {
            let mut buf = [0_u8; 4];

            buf.copy_from_slice(&self.src[self.position..self.position + 4]);

            self.bit_buf |= u64::from(u32::from_le_bytes(buf)) << self.num_bits;
            self.num_bits += 32;
            self.position += 4;
        }
    }

    /// Refill two bytes at once; the caller must have checked that two
    /// input bytes remain and that fewer than 15 bits are buffered.
    #[inline(always)]
    pub fn refill_16(&mut self)
    {
        debug_assert!(self.num_bits < 15);

        self.bit_buf |= u64::from(self.src[self.position]) << self.num_bits;
        self.bit_buf |= u64::from(self.src[self.position + 1]) << (self.num_bits + 8);
        self.num_bits += 16;
        self.position += 2;
    }

    /// Bytes of input not yet pulled into the bit buffer.
    pub fn src_remaining(&self) -> &'src [u8]
    {
        &self.src[self.position..]
    }

    /// Advance the reader n bytes ahead, skipping the bit buffer.
    ///
    /// Only meaningful while the bit buffer is byte aligned, e.g. the
    /// bulk copy of a stored block.
    pub fn advance(&mut self, bytes: usize)
    {
        self.position += bytes;
    }

    /// Number of input bytes consumed so far, after any push-back.
    pub const fn position(&self) -> usize
    {
        self.position
    }

    /// Return whole unconsumed bytes from the bit buffer to the input
    /// cursor.
    ///
    /// The decompressor may look ahead up to 7 bytes past what it
    /// actually uses; whatever data follows the deflate payload (a
    /// gzip trailer, or a concatenated stream) must be handed back to
    /// the caller untouched. Only bytes read during this call can be
    /// returned.
    pub fn push_back_whole_bytes(&mut self)
    {
        while self.position > 0 && self.num_bits >= 8
        {
            self.position -= 1;
            self.num_bits -= 8;
        }
        self.bit_buf &= (1_u64 << self.num_bits) - 1;
    }

    /// The bit buffer masked to its valid low bits.
    pub const fn masked_bit_buf(&self) -> u64
    {
        self.bit_buf & ((1_u64 << self.num_bits) - 1)
    }
}

#[cfg(test)]
mod tests
{
    use super::BitReader;

    #[test]
    fn need_and_get_round_down_to_bytes()
    {
        let data = [0b1010_1010, 0b0101_0101];
        let mut reader = BitReader::new(&data, 0, 0);

        assert!(reader.need_bits(3));
        assert_eq!(reader.get_bits(3), 0b010);
        assert!(reader.need_bits(8));
        assert_eq!(reader.num_bits, 13);
        assert_eq!(reader.get_bits(8), 0b101_10101);
        assert!(!reader.need_bits(6));
        assert_eq!(reader.num_bits, 5);
    }

    #[test]
    fn push_back_returns_whole_lookahead_bytes()
    {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BitReader::new(&data, 0, 0);

        assert!(reader.need_bits(4));
        assert_eq!(reader.get_bits(4), 1);
        // 4 bits of the first byte remain, plus look ahead
        assert!(reader.need_bits(20));
        assert_eq!(reader.position(), 3);

        reader.push_back_whole_bytes();
        // bytes 2 and 3 went back, the partial byte cannot
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.num_bits, 4);
        assert_eq!(reader.masked_bit_buf(), 0);
    }

    #[test]
    fn resumes_from_saved_state()
    {
        let first = [0b0000_0111];
        let mut reader = BitReader::new(&first, 0, 0);
        assert!(reader.need_bits(8));
        assert!(!reader.need_bits(11));

        let (bit_buf, num_bits) = (reader.masked_bit_buf(), reader.num_bits);

        let second = [0b1111_1000];
        let mut reader = BitReader::new(&second, bit_buf, num_bits);
        assert!(reader.need_bits(11));
        assert_eq!(reader.get_bits(11), 0b000_0000_0111);
        assert_eq!(reader.get_bits(5), 0b11111);
    }
}
