use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::Threads;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
enum Mode {
    Sequential,
    #[default]
    Global,
    Pool(Arc<ThreadPool>),
}

/// Executor for per-document work
///
/// Items are split into contiguous ranges of equal length, one per worker,
/// and results are always returned in input order.
/// The sequential mode runs the very same closures in a plain loop.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    mode: Mode,
}

impl Executor {
    pub fn new(threads: Threads) -> Result<Self> {
        let mode = match threads {
            Threads::Auto => Mode::Global,
            Threads::Sequential => Mode::Sequential,
            Threads::Fixed(n) if n <= 1 => Mode::Sequential,
            Threads::Fixed(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()?;
                Mode::Pool(Arc::new(pool))
            }
        };
        Ok(Self { mode })
    }

    pub fn sequential() -> Self {
        Self { mode: Mode::Sequential }
    }

    /// number of workers used by this executor
    pub fn num_threads(&self) -> usize {
        match &self.mode {
            Mode::Sequential => 1,
            Mode::Global => rayon::current_num_threads(),
            Mode::Pool(pool) => pool.current_num_threads(),
        }
    }

    #[inline]
    fn range_len(&self, len: usize) -> usize {
        let threads = self.num_threads().max(1);
        ((len + threads - 1) / threads).max(1)
    }

    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.mode {
            Mode::Pool(pool) => pool.install(op),
            _ => op(),
        }
    }

    /// Map every item (with its index) and collect in input order
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        if matches!(self.mode, Mode::Sequential) {
            return items.iter().enumerate().map(|(i, item)| f(i, item)).collect();
        }
        let chunk = self.range_len(items.len());
        let f = &f;
        self.install(|| {
            items
                .par_chunks(chunk)
                .enumerate()
                .flat_map_iter(|(c, part)| {
                    let base = c * chunk;
                    part.iter().enumerate().map(move |(i, item)| f(base + i, item))
                })
                .collect()
        })
    }

    /// Fallible `map`: the first error aborts the whole batch
    pub fn try_map<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> Result<R> + Sync + Send,
    {
        if matches!(self.mode, Mode::Sequential) {
            return items.iter().enumerate().map(|(i, item)| f(i, item)).collect();
        }
        let chunk = self.range_len(items.len());
        let f = &f;
        let parts: Result<Vec<Vec<R>>> = self.install(|| {
            items
                .par_chunks(chunk)
                .enumerate()
                .map(|(c, part)| {
                    let base = c * chunk;
                    part.iter()
                        .enumerate()
                        .map(|(i, item)| f(base + i, item))
                        .collect::<Result<Vec<R>>>()
                })
                .collect()
        });
        Ok(parts?.into_iter().flatten().collect())
    }

    /// Mutate every item in place; each worker owns a disjoint range
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        if matches!(self.mode, Mode::Sequential) {
            items.iter_mut().enumerate().for_each(|(i, item)| f(i, item));
            return;
        }
        let chunk = self.range_len(items.len());
        let f = &f;
        self.install(|| {
            items
                .par_chunks_mut(chunk)
                .enumerate()
                .for_each(|(c, part)| {
                    let base = c * chunk;
                    part.iter_mut().enumerate().for_each(|(i, item)| f(base + i, item));
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokensError;

    fn executors() -> Vec<Executor> {
        vec![
            Executor::sequential(),
            Executor::new(Threads::Auto).unwrap(),
            Executor::new(Threads::Fixed(3)).unwrap(),
        ]
    }

    #[test]
    fn map_keeps_input_order() {
        let items: Vec<u32> = (0..1000).collect();
        for exec in executors() {
            let out = exec.map(&items, |i, x| (i as u32) * 10 + x);
            let expected: Vec<u32> = (0..1000).map(|x| x * 11).collect();
            assert_eq!(out, expected);
        }
    }

    #[test]
    fn try_map_reports_error() {
        let items: Vec<u32> = (0..100).collect();
        for exec in executors() {
            let res = exec.try_map(&items, |_, &x| {
                if x == 57 { Err(TokensError::value("boom")) } else { Ok(x) }
            });
            assert!(matches!(res, Err(TokensError::Value(_))));
        }
    }

    #[test]
    fn for_each_mut_visits_every_item_once() {
        for exec in executors() {
            let mut items = vec![0usize; 37];
            exec.for_each_mut(&mut items, |i, x| *x += i + 1);
            assert_eq!(items, (1..=37).collect::<Vec<_>>());
        }
    }

    #[test]
    fn small_fixed_pool_is_sequential() {
        assert_eq!(Executor::new(Threads::Fixed(1)).unwrap().num_threads(), 1);
        assert_eq!(Executor::new(Threads::Fixed(2)).unwrap().num_threads(), 2);
    }
}
