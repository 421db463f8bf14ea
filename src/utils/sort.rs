use core::mem;

/// LSD radix sort for token ids.
/// - Sorts ascending, in place
/// - Only runs the byte passes needed for the largest id
///
/// Complexity: at most 4 passes, each O(n + 256)
pub fn radix_sort_ids(ids: &mut [u32]) {
    let n = ids.len();
    if n <= 1 {
        return;
    }

    // small documents: insertion sort beats allocating scratch
    if n <= 32 {
        insertion_sort_ids(ids);
        return;
    }

    let max = ids.iter().copied().max().unwrap_or(0);
    let passes = (u32::BITS - max.leading_zeros()).div_ceil(8).max(1);

    let mut scratch = vec![0u32; n];
    let mut src: &mut [u32] = ids;
    let mut dst: &mut [u32] = &mut scratch;

    for pass in 0..passes {
        let shift = pass * 8;
        let mut count = [0usize; 256];

        for &k in src.iter() {
            count[((k >> shift) & 0xFF) as usize] += 1;
        }

        // prefix sum -> starting positions
        let mut sum = 0usize;
        for c in count.iter_mut() {
            let tmp = *c;
            *c = sum;
            sum += tmp;
        }

        for &k in src.iter() {
            let b = ((k >> shift) & 0xFF) as usize;
            dst[count[b]] = k;
            count[b] += 1;
        }

        mem::swap(&mut src, &mut dst);
    }

    // odd pass count leaves the result in scratch
    if passes % 2 == 1 {
        dst.copy_from_slice(src);
    }
}

#[inline]
fn insertion_sort_ids(ids: &mut [u32]) {
    for i in 1..ids.len() {
        let mut j = i;
        while j > 0 && ids[j] < ids[j - 1] {
            ids.swap(j, j - 1);
            j -= 1;
        }
    }
}
