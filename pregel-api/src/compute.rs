use rayon::prelude::*;

/// Compute the inclusive prefix sum of `values` in parallel, one chunk per rayon thread.
pub fn par_cum_sum(values: &mut [usize]) {
    if values.is_empty() {
        return;
    }
    let num_chunks = rayon::current_num_threads();
    let chunk_size = values.len().div_ceil(num_chunks);
    let mut chunk_sums = Vec::with_capacity(num_chunks);
    values
        .par_chunks_mut(chunk_size)
        .map(|chunk| {
            let mut cum_sum = 0;
            for v in chunk {
                *v += cum_sum;
                cum_sum = *v;
            }
            cum_sum
        })
        .collect_into_vec(&mut chunk_sums);

    let mut offset = 0;
    for (partial_sum, next_chunk) in chunk_sums
        .into_iter()
        .zip(values.chunks_mut(chunk_size).skip(1))
    {
        offset += partial_sum;
        next_chunk.par_iter_mut().for_each(|v| *v += offset);
    }
}

#[cfg(test)]
mod test {
    use super::par_cum_sum;

    #[quickcheck]
    fn matches_sequential_scan(values: Vec<u16>) {
        let mut values: Vec<usize> = values.into_iter().map(|v| v as usize).collect();
        let expected: Vec<usize> = values
            .iter()
            .scan(0, |acc, v| {
                *acc += v;
                Some(*acc)
            })
            .collect();
        par_cum_sum(&mut values);
        assert_eq!(values, expected);
    }
}
