/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The streaming decompressor.
//!
//! The whole decoder is one logical coroutine: [`InflateDecompressor`]
//! owns every piece of its bit-level state, and each
//! [`decompress`][InflateDecompressor::decompress] call runs the state
//! machine until it finishes, hits structural corruption, or cannot
//! continue without more input or output space. A suspended call can
//! be resumed at any byte boundary of input or output and produces
//! output identical to a single uninterrupted run.
//!
//! [`DeflateDecoder`] wraps the same machine in a one-shot API that
//! grows a `Vec` for callers that have the whole stream in memory.

use std::cmp::min;

use crate::bitstream::BitReader;
use crate::constants::{
    DEFLATE_NUM_PRECODE_SYMS, DEFLATE_PRECODE_LENS_PERMUTATION, DIST_BASE, DIST_EXTRA, DIST_TABLE,
    GZIP_FCOMMENT, GZIP_FEXTRA, GZIP_FHCRC, GZIP_FNAME, HAS_MORE_INPUT, LENGTH_BASE, LENGTH_EXTRA,
    LITLEN_TABLE, LZ_DICT_SIZE, MAX_LEN_CODES, MIN_TABLE_SIZES, PARSE_GZIP_HEADER,
    PARSE_ZLIB_HEADER, PRECODE_REPEAT_BASE, PRECODE_REPEAT_EXTRA, PRECODE_TABLE, TABLE_SIZE_BITS,
    USING_NON_WRAPPING_OUTPUT_BUF
};
use crate::errors::{DecodeErrorStatus, InflateDecodeErrors, InflateStatus};
use crate::huffman::HuffmanTable;
use crate::window;

/// Resumption label of the decompressor coroutine.
///
/// Every variant a call can return in marks a point where the machine
/// may suspend; the remaining variants are transient and always run to
/// the next label within the same call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum State
{
    Start,
    ZlibHeader,
    GzipHeader,
    GzipXlen,
    GzipExtra,
    GzipName,
    GzipComment,
    GzipHcrc,
    BlockHeader,
    StoredAlign,
    StoredHeader,
    StoredFromBitBuf,
    StoredCopy,
    StaticSetup,
    DynamicTableSizes,
    DynamicPrecodeLens,
    DecodeLenCodes,
    LenCodesExtra,
    BuildTables,
    DecodeLitlen,
    WriteLiteral,
    ReadLengthExtra,
    DecodeDistance,
    ReadDistanceExtra,
    MatchSetup,
    MatchCopy,
    BlockDone,
    TrailerAlign,
    ZlibAdler,
    GzipCrc,
    GzipIsize,
    VerifyTrailer,
    DoneForever,
    Corrupt
}

/// The owned state of the streaming decompressor.
///
/// Creating one performs the only allocation-free initialisation the
/// decoder ever needs; afterwards it is mutated exclusively through
/// [`decompress`][Self::decompress] until a terminal status, then
/// either dropped or [`reset`][Self::reset] for a new stream.
pub struct InflateDecompressor
{
    state:     State,
    bit_buf:   u64,
    num_bits:  u32,
    // cursors that stay live across suspensions inside copy loops
    dist:      u32,
    counter:   u32,
    num_extra: u32,
    dist_from_out_buf_start: usize,
    is_final_block: bool,
    block_type:     u8,
    table_sizes: [u32; 3],
    tables:      [HuffmanTable; 3],
    len_codes:   [u8; MAX_LEN_CODES],
    zlib_header: [u8; 2],
    gzip_header: [u8; 10],
    raw_header:  [u8; 4],
    checksum_expected: u32,
    checksum_running:  u32,
    gzip_isize:        u32
}

impl Default for InflateDecompressor
{
    fn default() -> InflateDecompressor
    {
        InflateDecompressor::new()
    }
}

impl InflateDecompressor
{
    pub fn new() -> InflateDecompressor
    {
        InflateDecompressor {
            state:     State::Start,
            bit_buf:   0,
            num_bits:  0,
            dist:      0,
            counter:   0,
            num_extra: 0,
            dist_from_out_buf_start: 0,
            is_final_block: false,
            block_type:     0,
            table_sizes: [0; 3],
            tables:      Default::default(),
            len_codes:   [0; MAX_LEN_CODES],
            zlib_header: [0; 2],
            gzip_header: [0; 10],
            raw_header:  [0; 4],
            checksum_expected: 0,
            checksum_running:  0,
            gzip_isize:        0
        }
    }

    /// Prepare the state for a fresh stream.
    ///
    /// Everything else is reinitialised lazily when the machine runs.
    pub fn reset(&mut self)
    {
        self.state = State::Start;
    }

    /// The trailer checksum read from the stream, valid once the
    /// trailer has been parsed.
    pub const fn checksum_expected(&self) -> u32
    {
        self.checksum_expected
    }

    /// The checksum computed over all output produced so far.
    pub const fn checksum_computed(&self) -> u32
    {
        self.checksum_running
    }

    /// Run the decompressor over `in_buf`, writing into `out` starting
    /// at `out_pos`.
    ///
    /// `out` is either the whole destination
    /// ([`USING_NON_WRAPPING_OUTPUT_BUF`]) or a power-of-two ring
    /// buffer at least the size of the deflate dictionary, in which
    /// case `out_pos` wraps under the caller's control.
    ///
    /// Returns the status plus how many input bytes were consumed and
    /// output bytes produced. Bytes the decoder looked ahead past the
    /// end of the stream are never counted as consumed.
    pub fn decompress(
        &mut self, in_buf: &[u8], out: &mut [u8], out_pos: usize, flags: u32
    ) -> (InflateStatus, usize, usize)
    {
        let non_wrapping = (flags & USING_NON_WRAPPING_OUTPUT_BUF) != 0;

        let out_buf_size_mask = if non_wrapping
        {
            usize::MAX
        }
        else
        {
            out.len().wrapping_sub(1)
        };

        if !non_wrapping && !out.len().is_power_of_two()
        {
            return (InflateStatus::BadParam, 0, 0);
        }
        if out_pos > out.len()
        {
            return (InflateStatus::BadParam, 0, 0);
        }
        if (flags & PARSE_ZLIB_HEADER) != 0 && (flags & PARSE_GZIP_HEADER) != 0
        {
            return (InflateStatus::BadParam, 0, 0);
        }

        let mut reader = BitReader::new(in_buf, self.bit_buf, self.num_bits);
        let out_begin = out_pos;
        let mut out_pos = out_pos;

        #[allow(unused_mut)]
        let mut status = 'machine: loop
        {
            match self.state
            {
                State::Start =>
                {
                    reader.bit_buf = 0;
                    reader.num_bits = 0;

                    self.dist = 0;
                    self.counter = 0;
                    self.num_extra = 0;
                    self.dist_from_out_buf_start = 0;
                    self.is_final_block = false;
                    self.block_type = 0;
                    self.zlib_header = [0; 2];
                    self.gzip_header = [0; 10];
                    self.checksum_expected = 0;
                    self.checksum_running = 0;
                    self.gzip_isize = 0;

                    if (flags & PARSE_ZLIB_HEADER) != 0
                    {
                        // adler32 of nothing
                        self.checksum_running = 1;
                        self.state = State::ZlibHeader;
                    }
                    else if (flags & PARSE_GZIP_HEADER) != 0
                    {
                        self.state = State::GzipHeader;
                    }
                    else
                    {
                        self.state = State::BlockHeader;
                    }
                }
                State::ZlibHeader =>
                {
                    while self.counter < 2
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.zlib_header[self.counter as usize] = reader.get_bits(8) as u8;
                        self.counter += 1;
                    }

                    // See https://www.ietf.org/rfc/rfc1950.txt
                    let cmf = u32::from(self.zlib_header[0]);
                    let flg = u32::from(self.zlib_header[1]);

                    let mut bad = (cmf * 256 + flg) % 31 != 0;
                    // FDICT is not supported
                    bad |= (flg & 32) != 0;
                    bad |= (cmf & 15) != 8;

                    if !non_wrapping
                    {
                        // the declared window must fit in the ring
                        let window_size = 1_usize << (8 + (cmf >> 4));

                        bad |= window_size > LZ_DICT_SIZE;
                        bad |= out.len() < window_size;
                    }
                    if bad
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }
                    self.counter = 0;
                    self.state = State::BlockHeader;
                }
                State::GzipHeader =>
                {
                    while self.counter < 10
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.gzip_header[self.counter as usize] = reader.get_bits(8) as u8;
                        self.counter += 1;
                    }

                    if self.gzip_header[0] != 0x1F
                        || self.gzip_header[1] != 0x8B
                        || self.gzip_header[2] != 8
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }

                    let header_flags = self.gzip_header[3];

                    self.counter = 0;
                    self.num_extra = 0;
                    self.state = if (header_flags & GZIP_FEXTRA) != 0
                    {
                        State::GzipXlen
                    }
                    else if (header_flags & GZIP_FNAME) != 0
                    {
                        State::GzipName
                    }
                    else if (header_flags & GZIP_FCOMMENT) != 0
                    {
                        State::GzipComment
                    }
                    else if (header_flags & GZIP_FHCRC) != 0
                    {
                        State::GzipHcrc
                    }
                    else
                    {
                        State::BlockHeader
                    };
                }
                State::GzipXlen =>
                {
                    while self.counter < 2
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.num_extra |= reader.get_bits(8) << (8 * self.counter);
                        self.counter += 1;
                    }
                    self.counter = 0;
                    self.state = State::GzipExtra;
                }
                State::GzipExtra =>
                {
                    while self.counter < self.num_extra
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        reader.drop_bits(8);
                        self.counter += 1;
                    }

                    let header_flags = self.gzip_header[3];

                    self.counter = 0;
                    self.state = if (header_flags & GZIP_FNAME) != 0
                    {
                        State::GzipName
                    }
                    else if (header_flags & GZIP_FCOMMENT) != 0
                    {
                        State::GzipComment
                    }
                    else if (header_flags & GZIP_FHCRC) != 0
                    {
                        State::GzipHcrc
                    }
                    else
                    {
                        State::BlockHeader
                    };
                }
                State::GzipName =>
                {
                    loop
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        if reader.get_bits(8) == 0
                        {
                            break;
                        }
                    }

                    let header_flags = self.gzip_header[3];

                    self.counter = 0;
                    self.state = if (header_flags & GZIP_FCOMMENT) != 0
                    {
                        State::GzipComment
                    }
                    else if (header_flags & GZIP_FHCRC) != 0
                    {
                        State::GzipHcrc
                    }
                    else
                    {
                        State::BlockHeader
                    };
                }
                State::GzipComment =>
                {
                    loop
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        if reader.get_bits(8) == 0
                        {
                            break;
                        }
                    }

                    let header_flags = self.gzip_header[3];

                    self.counter = 0;
                    self.state = if (header_flags & GZIP_FHCRC) != 0
                    {
                        State::GzipHcrc
                    }
                    else
                    {
                        State::BlockHeader
                    };
                }
                State::GzipHcrc =>
                {
                    while self.counter < 2
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        reader.drop_bits(8);
                        self.counter += 1;
                    }
                    self.counter = 0;
                    self.state = State::BlockHeader;
                }
                State::BlockHeader =>
                {
                    if !reader.need_bits(3)
                    {
                        break 'machine input_starved(flags);
                    }
                    let bits = reader.get_bits(3);

                    self.is_final_block = (bits & 1) != 0;
                    self.block_type = (bits >> 1) as u8;

                    match self.block_type
                    {
                        0 => self.state = State::StoredAlign,
                        1 => self.state = State::StaticSetup,
                        2 =>
                        {
                            self.counter = 0;
                            self.state = State::DynamicTableSizes;
                        }
                        _ =>
                        {
                            self.state = State::Corrupt;
                            break 'machine InflateStatus::Failed;
                        }
                    }
                }
                State::StoredAlign =>
                {
                    // skip any remaining bits of the current byte
                    reader.drop_bits(reader.num_bits & 7);
                    self.counter = 0;
                    self.state = State::StoredHeader;
                }
                State::StoredHeader =>
                {
                    while self.counter < 4
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.raw_header[self.counter as usize] = reader.get_bits(8) as u8;
                        self.counter += 1;
                    }

                    let len = u32::from(self.raw_header[0]) | u32::from(self.raw_header[1]) << 8;
                    let nlen = u32::from(self.raw_header[2]) | u32::from(self.raw_header[3]) << 8;

                    if len != (nlen ^ 0xFFFF)
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }
                    self.counter = len;
                    self.state = State::StoredFromBitBuf;
                }
                State::StoredFromBitBuf =>
                {
                    // drain whole bytes still sitting in the bit buffer
                    // before switching to the bulk copy
                    while self.counter > 0 && reader.num_bits != 0
                    {
                        if out_pos >= out.len()
                        {
                            break 'machine InflateStatus::HasMoreOutput;
                        }
                        out[out_pos] = reader.get_bits(8) as u8;
                        out_pos += 1;
                        self.counter -= 1;
                    }
                    self.state = State::StoredCopy;
                }
                State::StoredCopy =>
                {
                    while self.counter > 0
                    {
                        if out_pos >= out.len()
                        {
                            break 'machine InflateStatus::HasMoreOutput;
                        }
                        let src = reader.src_remaining();

                        if src.is_empty()
                        {
                            break 'machine input_starved(flags);
                        }
                        let n = min(min(out.len() - out_pos, src.len()), self.counter as usize);

                        out[out_pos..out_pos + n].copy_from_slice(&src[..n]);
                        reader.advance(n);
                        out_pos += n;
                        self.counter -= n as u32;
                    }
                    self.state = State::BlockDone;
                }
                State::StaticSetup =>
                {
                    let litlen = &mut self.tables[LITLEN_TABLE];

                    litlen.code_size[0..144].fill(8);
                    litlen.code_size[144..256].fill(9);
                    litlen.code_size[256..280].fill(7);
                    litlen.code_size[280..288].fill(8);

                    self.tables[DIST_TABLE].code_size[..32].fill(5);

                    self.table_sizes[LITLEN_TABLE] = 288;
                    self.table_sizes[DIST_TABLE] = 32;
                    self.state = State::BuildTables;
                }
                State::DynamicTableSizes =>
                {
                    while self.counter < 3
                    {
                        let idx = self.counter as usize;
                        let bits = u32::from(TABLE_SIZE_BITS[idx]);

                        if !reader.need_bits(bits)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.table_sizes[idx] =
                            reader.get_bits(bits) + u32::from(MIN_TABLE_SIZES[idx]);
                        self.counter += 1;
                    }
                    self.tables[PRECODE_TABLE].code_size.fill(0);
                    self.counter = 0;
                    self.state = State::DynamicPrecodeLens;
                }
                State::DynamicPrecodeLens =>
                {
                    while self.counter < self.table_sizes[PRECODE_TABLE]
                    {
                        if !reader.need_bits(3)
                        {
                            break 'machine input_starved(flags);
                        }
                        let slot = DEFLATE_PRECODE_LENS_PERMUTATION[self.counter as usize];

                        self.tables[PRECODE_TABLE].code_size[usize::from(slot)] =
                            reader.get_bits(3) as u8;
                        self.counter += 1;
                    }
                    self.table_sizes[PRECODE_TABLE] = DEFLATE_NUM_PRECODE_SYMS as u32;

                    if self.tables[PRECODE_TABLE].build(DEFLATE_NUM_PRECODE_SYMS).is_err()
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }
                    self.counter = 0;
                    self.state = State::DecodeLenCodes;
                }
                State::DecodeLenCodes =>
                {
                    let total = self.table_sizes[LITLEN_TABLE] + self.table_sizes[DIST_TABLE];

                    while self.counter < total
                    {
                        let sym =
                            match decode_huffman(&self.tables[PRECODE_TABLE], &mut reader, flags)
                            {
                                Ok(sym) => sym,
                                Err(status) => break 'machine status
                            };

                        if sym < 16
                        {
                            // explicit codeword length
                            self.len_codes[self.counter as usize] = sym as u8;
                            self.counter += 1;
                            continue;
                        }
                        if sym == 16 && self.counter == 0
                        {
                            // nothing to repeat yet
                            self.state = State::Corrupt;
                            break 'machine InflateStatus::Failed;
                        }
                        self.dist = sym;
                        self.num_extra = u32::from(PRECODE_REPEAT_EXTRA[(sym - 16) as usize]);
                        self.state = State::LenCodesExtra;
                        continue 'machine;
                    }

                    if self.counter != total
                    {
                        // the last repeat overran the requested count
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }

                    let litlen_count = self.table_sizes[LITLEN_TABLE] as usize;
                    let dist_count = self.table_sizes[DIST_TABLE] as usize;

                    self.tables[LITLEN_TABLE].code_size[..litlen_count]
                        .copy_from_slice(&self.len_codes[..litlen_count]);
                    self.tables[DIST_TABLE].code_size[..dist_count]
                        .copy_from_slice(&self.len_codes[litlen_count..litlen_count + dist_count]);

                    self.state = State::BuildTables;
                }
                State::LenCodesExtra =>
                {
                    if !reader.need_bits(self.num_extra)
                    {
                        break 'machine input_starved(flags);
                    }
                    let idx = (self.dist - 16) as usize;
                    let count = reader.get_bits(self.num_extra)
                        + u32::from(PRECODE_REPEAT_BASE[idx]);

                    let fill = if self.dist == 16
                    {
                        self.len_codes[self.counter as usize - 1]
                    }
                    else
                    {
                        0
                    };
                    let start = self.counter as usize;

                    self.len_codes[start..start + count as usize].fill(fill);
                    self.counter += count;
                    self.state = State::DecodeLenCodes;
                }
                State::BuildTables =>
                {
                    let dist_syms = self.table_sizes[DIST_TABLE] as usize;
                    let litlen_syms = self.table_sizes[LITLEN_TABLE] as usize;

                    if self.tables[DIST_TABLE].build(dist_syms).is_err()
                        || self.tables[LITLEN_TABLE].build(litlen_syms).is_err()
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }
                    self.state = State::DecodeLitlen;
                }
                State::DecodeLitlen =>
                {
                    loop
                    {
                        if reader.src_remaining().len() < 4 || out.len() - out_pos < 2
                        {
                            // tail path, resumable at any input byte
                            let sym = match decode_huffman(
                                &self.tables[LITLEN_TABLE],
                                &mut reader,
                                flags
                            )
                            {
                                Ok(sym) => sym,
                                Err(status) => break 'machine status
                            };

                            self.counter = sym;

                            if sym & 256 != 0
                            {
                                break;
                            }
                            self.state = State::WriteLiteral;
                            continue 'machine;
                        }

                        // Hot loop: with four input bytes and two output
                        // bytes guaranteed, decode without suspension
                        // checks and emit literal pairs directly.
                        reader.refill_32();

                        let (sym, code_len) = self.tables[LITLEN_TABLE].decode(reader.bit_buf);

                        reader.drop_bits(code_len);

                        if sym & 256 != 0
                        {
                            self.counter = sym;
                            break;
                        }

                        let (sym2, code_len2) = self.tables[LITLEN_TABLE].decode(reader.bit_buf);

                        reader.drop_bits(code_len2);

                        out[out_pos] = sym as u8;

                        if sym2 & 256 != 0
                        {
                            out_pos += 1;
                            self.counter = sym2;
                            break;
                        }
                        out[out_pos + 1] = sym2 as u8;
                        out_pos += 2;
                    }

                    // end of block, or the start of a match
                    self.counter &= 511;

                    if self.counter == 256
                    {
                        self.state = State::BlockDone;
                        continue;
                    }
                    let idx = (self.counter - 257) as usize;

                    self.num_extra = u32::from(LENGTH_EXTRA[idx]);
                    self.counter = u32::from(LENGTH_BASE[idx]);
                    self.state = if self.num_extra != 0
                    {
                        State::ReadLengthExtra
                    }
                    else
                    {
                        State::DecodeDistance
                    };
                }
                State::WriteLiteral =>
                {
                    if out_pos >= out.len()
                    {
                        break 'machine InflateStatus::HasMoreOutput;
                    }
                    out[out_pos] = self.counter as u8;
                    out_pos += 1;
                    self.state = State::DecodeLitlen;
                }
                State::ReadLengthExtra =>
                {
                    if !reader.need_bits(self.num_extra)
                    {
                        break 'machine input_starved(flags);
                    }
                    self.counter += reader.get_bits(self.num_extra);
                    self.state = State::DecodeDistance;
                }
                State::DecodeDistance =>
                {
                    let sym = match decode_huffman(&self.tables[DIST_TABLE], &mut reader, flags)
                    {
                        Ok(sym) => sym,
                        Err(status) => break 'machine status
                    };

                    self.num_extra = u32::from(DIST_EXTRA[sym as usize]);
                    self.dist = u32::from(DIST_BASE[sym as usize]);
                    self.state = if self.num_extra != 0
                    {
                        State::ReadDistanceExtra
                    }
                    else
                    {
                        State::MatchSetup
                    };
                }
                State::ReadDistanceExtra =>
                {
                    if !reader.need_bits(self.num_extra)
                    {
                        break 'machine input_starved(flags);
                    }
                    self.dist += reader.get_bits(self.num_extra);
                    self.state = State::MatchSetup;
                }
                State::MatchSetup =>
                {
                    self.dist_from_out_buf_start = out_pos;

                    let dist = self.dist as usize;

                    // in a flat buffer a reference cannot reach before
                    // the start of the output; the ring wraps instead
                    if non_wrapping && dist > self.dist_from_out_buf_start
                    {
                        self.state = State::Corrupt;
                        break 'machine InflateStatus::Failed;
                    }

                    let src_pos =
                        self.dist_from_out_buf_start.wrapping_sub(dist) & out_buf_size_mask;
                    let length = self.counter as usize;

                    if src_pos.max(out_pos) + length <= out.len()
                    {
                        window::copy_match(out, src_pos, out_pos, length);
                        out_pos += length;
                        self.counter = 0;
                        self.state = State::DecodeLitlen;
                    }
                    else
                    {
                        self.state = State::MatchCopy;
                    }
                }
                State::MatchCopy =>
                {
                    // byte at a time, masked: handles ring wrap-around,
                    // overlapping copies and output exhaustion alike
                    while self.counter > 0
                    {
                        if out_pos >= out.len()
                        {
                            break 'machine InflateStatus::HasMoreOutput;
                        }
                        let src_pos = self
                            .dist_from_out_buf_start
                            .wrapping_sub(self.dist as usize)
                            & out_buf_size_mask;

                        out[out_pos] = out[src_pos];
                        out_pos += 1;
                        self.dist_from_out_buf_start += 1;
                        self.counter -= 1;
                    }
                    self.state = State::DecodeLitlen;
                }
                State::BlockDone =>
                {
                    self.state = if self.is_final_block
                    {
                        State::TrailerAlign
                    }
                    else
                    {
                        State::BlockHeader
                    };
                }
                State::TrailerAlign =>
                {
                    // byte-align, then hand back every whole byte we
                    // looked ahead so trailing data stays with the
                    // caller
                    reader.drop_bits(reader.num_bits & 7);
                    reader.push_back_whole_bytes();

                    self.counter = 0;
                    self.checksum_expected = 0;

                    if (flags & PARSE_ZLIB_HEADER) != 0
                    {
                        self.state = State::ZlibAdler;
                    }
                    else if (flags & PARSE_GZIP_HEADER) != 0
                    {
                        self.state = State::GzipCrc;
                    }
                    else
                    {
                        self.state = State::DoneForever;
                        break 'machine InflateStatus::Done;
                    }
                }
                State::ZlibAdler =>
                {
                    // big endian
                    while self.counter < 4
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.checksum_expected =
                            (self.checksum_expected << 8) | reader.get_bits(8);
                        self.counter += 1;
                    }
                    self.state = State::VerifyTrailer;
                    break 'machine InflateStatus::Done;
                }
                State::GzipCrc =>
                {
                    // little endian
                    while self.counter < 4
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.checksum_expected |= reader.get_bits(8) << (8 * self.counter);
                        self.counter += 1;
                    }
                    self.counter = 0;
                    self.state = State::GzipIsize;
                }
                State::GzipIsize =>
                {
                    // the declared size counts down against bytes
                    // produced and must land on zero
                    while self.counter < 4
                    {
                        if !reader.need_bits(8)
                        {
                            break 'machine input_starved(flags);
                        }
                        self.gzip_isize = self
                            .gzip_isize
                            .wrapping_sub(reader.get_bits(8) << (8 * self.counter));
                        self.counter += 1;
                    }
                    self.state = State::VerifyTrailer;
                    break 'machine InflateStatus::Done;
                }
                State::VerifyTrailer | State::DoneForever =>
                {
                    break 'machine InflateStatus::Done;
                }
                State::Corrupt =>
                {
                    break 'machine InflateStatus::Failed;
                }
            }
        };

        // Whole unconsumed lookahead bytes go back to the caller, but
        // never bytes we know we need for forward progress.
        if status != InflateStatus::NeedsMoreInput
            && status != InflateStatus::FailedCannotMakeProgress
        {
            reader.push_back_whole_bytes();
        }

        self.bit_buf = reader.masked_bit_buf();
        self.num_bits = reader.num_bits;

        let in_consumed = reader.position();
        let out_produced = out_pos - out_begin;

        if !status.is_failure()
        {
            #[cfg(feature = "zlib")]
            if (flags & PARSE_ZLIB_HEADER) != 0
            {
                self.checksum_running =
                    crate::checksum::adler32_update(self.checksum_running, &out[out_begin..out_pos]);

                if self.state == State::VerifyTrailer
                    && self.checksum_running != self.checksum_expected
                {
                    status = InflateStatus::Adler32Mismatch;
                }
            }
            #[cfg(feature = "gzip")]
            if (flags & PARSE_GZIP_HEADER) != 0
            {
                self.checksum_running =
                    crate::checksum::crc32_update(self.checksum_running, &out[out_begin..out_pos]);
                self.gzip_isize = self.gzip_isize.wrapping_add(out_produced as u32);

                if self.state == State::VerifyTrailer
                    && (self.gzip_isize != 0 || self.checksum_running != self.checksum_expected)
                {
                    status = InflateStatus::IsizeOrCrc32Mismatch;
                }
            }
        }

        // a mismatch is reported exactly once, the stream itself ended
        if self.state == State::VerifyTrailer
        {
            self.state = State::DoneForever;
        }

        (status, in_consumed, out_produced)
    }
}

const fn input_starved(flags: u32) -> InflateStatus
{
    if (flags & HAS_MORE_INPUT) != 0
    {
        InflateStatus::NeedsMoreInput
    }
    else
    {
        InflateStatus::FailedCannotMakeProgress
    }
}

/// Decode one Huffman symbol, suspending rather than reading past the
/// last byte the code actually needs.
///
/// Near the end of the input the bit buffer is topped up one byte at a
/// time, attempting a decode after each byte, so a raw deflate stream
/// terminates exactly at its final byte instead of demanding a phantom
/// one.
fn decode_huffman(
    table: &HuffmanTable, reader: &mut BitReader, flags: u32
) -> Result<u32, InflateStatus>
{
    if reader.num_bits < 15
    {
        if reader.src_remaining().len() < 2
        {
            loop
            {
                if let Some((sym, code_len)) = table.try_decode(reader.bit_buf, reader.num_bits)
                {
                    reader.drop_bits(code_len);
                    return Ok(sym);
                }
                if reader.num_bits >= 15
                {
                    break;
                }
                let wanted = reader.num_bits + 8;

                if !reader.need_bits(wanted)
                {
                    return Err(input_starved(flags));
                }
            }
        }
        else
        {
            reader.refill_16();
        }
    }

    let (sym, code_len) = table.decode(reader.bit_buf);

    reader.drop_bits(code_len);

    Ok(sym)
}

/// Options for the one-shot [`DeflateDecoder`] API.
#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions
{
    limit:            usize,
    confirm_checksum: bool,
    size_hint:        usize
}

impl Default for DeflateOptions
{
    fn default() -> DeflateOptions
    {
        DeflateOptions {
            limit:            usize::MAX,
            confirm_checksum: true,
            size_hint:        37000
        }
    }
}

impl DeflateOptions
{
    /// Set the maximum size the output is allowed to grow to before
    /// decoding fails with `OutputLimitExceeded`.
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> DeflateOptions
    {
        self.limit = limit;
        self
    }

    /// Whether a trailer checksum mismatch should fail the decode.
    ///
    /// Defaults to true; turning it off makes zlib and gzip decoding
    /// return whatever was decompressed, checksum be damned.
    #[must_use]
    pub fn set_confirm_checksum(mut self, yes: bool) -> DeflateOptions
    {
        self.confirm_checksum = yes;
        self
    }

    /// Initial size of the output buffer, for callers that know
    /// roughly how large the decompressed data will be.
    #[must_use]
    pub fn set_size_hint(mut self, hint: usize) -> DeflateOptions
    {
        self.size_hint = hint;
        self
    }
}

/// One-shot decoder over a fully buffered stream.
pub struct DeflateDecoder<'a>
{
    data:    &'a [u8],
    options: DeflateOptions,
    inner:   Box<InflateDecompressor>
}

impl<'a> DeflateDecoder<'a>
{
    /// Create a new decoder over `data` with default options.
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a>
    {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a>
    {
        DeflateDecoder {
            data,
            options,
            inner: Box::new(InflateDecompressor::new())
        }
    }

    /// Decode a raw deflate stream.
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.decode_inner(0)
    }

    /// Decode a zlib stream, verifying the adler32 trailer unless the
    /// options say otherwise.
    #[cfg(feature = "zlib")]
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.decode_inner(PARSE_ZLIB_HEADER)
    }

    /// Decode a gzip stream, verifying the crc32 and isize trailer
    /// unless the options say otherwise.
    #[cfg(feature = "gzip")]
    pub fn decode_gzip(&mut self) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        self.decode_inner(PARSE_GZIP_HEADER)
    }

    fn decode_inner(&mut self, framing: u32) -> Result<Vec<u8>, InflateDecodeErrors>
    {
        let flags = framing | USING_NON_WRAPPING_OUTPUT_BUF;

        let mut out = vec![0_u8; self.options.size_hint.max(64)];
        let mut out_pos = 0;
        let mut in_pos = 0;

        loop
        {
            let (status, consumed, written) =
                self.inner
                    .decompress(&self.data[in_pos..], &mut out, out_pos, flags);

            in_pos += consumed;
            out_pos += written;

            match status
            {
                InflateStatus::Done =>
                {
                    out.truncate(out_pos);
                    return Ok(out);
                }
                InflateStatus::HasMoreOutput =>
                {
                    if out.len() >= self.options.limit
                    {
                        out.truncate(out_pos);
                        return Err(InflateDecodeErrors::new(
                            DecodeErrorStatus::OutputLimitExceeded(self.options.limit, out.len()),
                            out
                        ));
                    }
                    let new_len = out.len().saturating_mul(2).min(self.options.limit);

                    out.resize(new_len, 0);
                }
                InflateStatus::Adler32Mismatch =>
                {
                    out.truncate(out_pos);

                    if !self.options.confirm_checksum
                    {
                        return Ok(out);
                    }
                    return Err(InflateDecodeErrors::new(
                        DecodeErrorStatus::MismatchedAdler(
                            self.inner.checksum_expected,
                            self.inner.checksum_running
                        ),
                        out
                    ));
                }
                InflateStatus::IsizeOrCrc32Mismatch =>
                {
                    out.truncate(out_pos);

                    if !self.options.confirm_checksum
                    {
                        return Ok(out);
                    }
                    let error = if self.inner.checksum_expected != self.inner.checksum_running
                    {
                        DecodeErrorStatus::MismatchedCRC(
                            self.inner.checksum_expected,
                            self.inner.checksum_running
                        )
                    }
                    else
                    {
                        let actual = out_pos as u32;

                        DecodeErrorStatus::MismatchedIsize(
                            actual.wrapping_sub(self.inner.gzip_isize),
                            actual
                        )
                    };
                    return Err(InflateDecodeErrors::new(error, out));
                }
                InflateStatus::NeedsMoreInput | InflateStatus::FailedCannotMakeProgress =>
                {
                    out.truncate(out_pos);
                    return Err(InflateDecodeErrors::new(
                        DecodeErrorStatus::InsufficientData,
                        out
                    ));
                }
                InflateStatus::Failed =>
                {
                    out.truncate(out_pos);
                    return Err(InflateDecodeErrors::new(DecodeErrorStatus::CorruptData, out));
                }
                InflateStatus::BadParam =>
                {
                    return Err(InflateDecodeErrors::new_with_error(
                        DecodeErrorStatus::Generic("bad decompressor parameters")
                    ));
                }
            }
        }
    }
}
