// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Row-pitch aware copies.

Mapped GPU memory may pad each row out to an alignment boundary, so the byte
stride between rows (the row pitch) can exceed `width * texel_size`.  Caller
buffers are always tightly packed.
*/

/// Rounds `value` up to the next multiple of `alignment` (a power of two or not).
pub const fn align_up(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

pub const fn ceil_div(value: usize, divisor: usize) -> usize {
    value.div_ceil(divisor)
}

/// Number of bytes spanned in a pitched layout by `size` tightly packed bytes.
pub const fn pitched_span(size: usize, row_bytes: usize, pitch: usize) -> usize {
    let full_rows = size / row_bytes;
    let remainder = size % row_bytes;
    if remainder == 0 {
        if full_rows == 0 {
            0
        } else {
            (full_rows - 1) * pitch + row_bytes
        }
    } else {
        full_rows * pitch + remainder
    }
}

/**
Copies `size` bytes of row-major data from `src` to `dst`.

`row_bytes` is the tightly packed length of one row; `dst_pitch` and `src_pitch`
are the strides of each side.  Equal pitches are copied in one go, otherwise
row by row, with a trailing partial row when `size` ends mid-row.

Callers validate sizes beforehand; both slices must cover the pitched span.
*/
pub fn copy_region(
    dst: &mut [u8],
    dst_pitch: usize,
    src: &[u8],
    src_pitch: usize,
    row_bytes: usize,
    size: usize,
) {
    debug_assert!(row_bytes > 0);
    debug_assert!(dst_pitch >= row_bytes && src_pitch >= row_bytes);
    if size == 0 {
        return;
    }
    if dst_pitch == src_pitch {
        let span = pitched_span(size, row_bytes, dst_pitch);
        dst[..span].copy_from_slice(&src[..span]);
        return;
    }
    let mut remaining = size;
    let mut row = 0;
    while remaining > 0 {
        let len = remaining.min(row_bytes);
        let d = row * dst_pitch;
        let s = row * src_pitch;
        dst[d..d + len].copy_from_slice(&src[s..s + len]);
        remaining -= len;
        row += 1;
    }
}
