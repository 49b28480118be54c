use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The buffer cannot be split in rows of the requested length.
    #[error("buffer of length {0} cannot be split in rows of length {1}")]
    SizeMismatch(usize, usize),
}

/// Controls how the grid builders and the sampler are executed.
///
/// Every strategy runs the same per-row kernel, so results are identical
/// across strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// This is the reference implementation, useful for small canvases and debugging.
    Serial,

    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    Fixed(usize),
}

impl std::str::FromStr for ExecutionStrategy {
    type Err = crate::error::WarpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "serial" | "reference" => Ok(Self::Serial),
            "parallel" | "parallel_rows" | "rayon" => Ok(Self::ParallelRows),
            _ => name
                .strip_prefix("fixed:")
                .and_then(|n| n.parse::<usize>().ok())
                .map(Self::Fixed)
                .ok_or_else(|| crate::error::WarpError::UnknownExecutionStrategy(s.to_string())),
        }
    }
}

fn check_rows(len: usize, row_len: usize) -> Result<usize, ParallelError> {
    if row_len == 0 || len % row_len != 0 {
        return Err(ParallelError::SizeMismatch(len, row_len));
    }
    Ok(len / row_len)
}

fn run_with<F>(strategy: ExecutionStrategy, op: F) -> Result<(), ParallelError>
where
    F: FnOnce(bool) + Send,
{
    match strategy {
        ExecutionStrategy::Serial => op(false),
        ExecutionStrategy::ParallelRows => op(true),
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| op(true));
        }
    }
    Ok(())
}

/// Apply `f(row_index, row)` to every row of `dst`.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `dst` - The destination buffer, a whole number of rows.
/// * `row_len` - The number of elements per row.
/// * `f` - The kernel to run on each row.
pub fn for_each_row<T, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    row_len: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    check_rows(dst.len(), row_len)?;

    run_with(strategy, |parallel| {
        if parallel {
            dst.par_chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(i, row)| f(i, row));
        } else {
            dst.chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(i, row)| f(i, row));
        }
    })
}

/// Apply `f(row_index, row_a, row_b)` to the matching rows of two buffers.
///
/// Both buffers must hold the same number of rows.
pub fn for_each_row_zip<T, U, F>(
    strategy: ExecutionStrategy,
    dst_a: &mut [T],
    row_len_a: usize,
    dst_b: &mut [U],
    row_len_b: usize,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    U: Send,
    F: Fn(usize, &mut [T], &mut [U]) + Send + Sync,
{
    let rows_a = check_rows(dst_a.len(), row_len_a)?;
    let rows_b = check_rows(dst_b.len(), row_len_b)?;
    if rows_a != rows_b {
        return Err(ParallelError::SizeMismatch(dst_b.len(), row_len_b));
    }

    run_with(strategy, |parallel| {
        if parallel {
            dst_a
                .par_chunks_exact_mut(row_len_a)
                .zip(dst_b.par_chunks_exact_mut(row_len_b))
                .enumerate()
                .for_each(|(i, (a, b))| f(i, a, b));
        } else {
            dst_a
                .chunks_exact_mut(row_len_a)
                .zip(dst_b.chunks_exact_mut(row_len_b))
                .enumerate()
                .for_each(|(i, (a, b))| f(i, a, b));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_row_strategies() -> Result<(), ParallelError> {
        for strategy in [
            ExecutionStrategy::Serial,
            ExecutionStrategy::ParallelRows,
            ExecutionStrategy::Fixed(2),
        ] {
            let mut dst = vec![0usize; 6];
            for_each_row(strategy, &mut dst, 2, |i, row| {
                row.iter_mut().enumerate().for_each(|(j, v)| *v = i * 10 + j);
            })?;
            assert_eq!(dst, vec![0, 1, 10, 11, 20, 21]);
        }
        Ok(())
    }

    #[test]
    fn test_for_each_row_zip() -> Result<(), ParallelError> {
        let mut a = vec![0.0f32; 4];
        let mut b = vec![false; 2];
        for_each_row_zip(
            ExecutionStrategy::ParallelRows,
            &mut a,
            2,
            &mut b,
            1,
            |i, ra, rb| {
                ra.fill(i as f32);
                rb[0] = i == 1;
            },
        )?;
        assert_eq!(a, vec![0.0, 0.0, 1.0, 1.0]);
        assert_eq!(b, vec![false, true]);
        Ok(())
    }

    #[test]
    fn test_row_len_mismatch() {
        let mut dst = vec![0u8; 5];
        let res = for_each_row(ExecutionStrategy::Serial, &mut dst, 2, |_, _| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch(5, 2)));
    }

    #[test]
    fn test_fixed_error() {
        let mut dst = vec![0u8; 2];
        let res = for_each_row(ExecutionStrategy::Fixed(0), &mut dst, 1, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "serial".parse::<ExecutionStrategy>().ok(),
            Some(ExecutionStrategy::Serial)
        );
        assert_eq!(
            "Fixed:4".parse::<ExecutionStrategy>().ok(),
            Some(ExecutionStrategy::Fixed(4))
        );
        assert!("gpu".parse::<ExecutionStrategy>().is_err());
    }
}
