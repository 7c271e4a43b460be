/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Back-reference copies through the output window.
//!
//! Every write goes through a bounds-checked index into the caller's
//! buffer, so a hostile distance can at worst copy the wrong bytes,
//! never write outside the window.

/// Copy `length` bytes inside `out` from `src_pos` to `dst_pos`.
///
/// Both ranges must lie inside the buffer; the caller has already
/// resolved ring wrap-around, this handles only the linear region.
///
/// As in most LZ77 formats the length may exceed the distance, e.g.
/// "xababab" can be encoded as
///
/// ```text
///   <literal "xab"> <copy offset=2 length=4>
/// ```
///
/// so an overlapping copy must proceed byte by byte, each written byte
/// becoming source material for a later one. Only a fully disjoint
/// forward copy may be done in bulk.
#[inline(always)]
pub(crate) fn copy_match(out: &mut [u8], src_pos: usize, dst_pos: usize, length: usize)
{
    if src_pos + length <= dst_pos
    {
        out.copy_within(src_pos..src_pos + length, dst_pos);
    }
    else
    {
        for i in 0..length
        {
            out[dst_pos + i] = out[src_pos + i];
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::copy_match;

    #[test]
    fn disjoint_copy()
    {
        let mut buf = *b"abcd____";
        copy_match(&mut buf, 0, 4, 4);
        assert_eq!(&buf, b"abcdabcd");
    }

    #[test]
    fn overlapping_copy_repeats()
    {
        let mut buf = *b"ab______";
        copy_match(&mut buf, 0, 2, 6);
        assert_eq!(&buf, b"abababab");
    }

    #[test]
    fn distance_one_is_run_length()
    {
        let mut buf = *b"x___";
        copy_match(&mut buf, 0, 1, 3);
        assert_eq!(&buf, b"xxxx");
    }
}
