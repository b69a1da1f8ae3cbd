use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use log::debug;

use crate::error::{Error, Result};

/// Parts handed to each worker per call. More parts than workers keeps a
/// slow band (the set's interior) from holding up the whole call.
pub const PARTS_PER_WORKER: usize = 4;

pub trait Split: Sized {
    /// Splits into at most `n` ordered parts.
    fn split_to_vec(self, n: usize) -> Vec<Self>;
}

pub trait Join: Sized {
    /// Rejoins parts produced by `split_to_vec`, in order.
    fn join_vec(parts: Vec<Self>) -> Result<Self>;
}

impl<T> Split for Vec<T> {
    fn split_to_vec(mut self, n: usize) -> Vec<Self> {
        let ranges = RangeSplitter::split(0, self.len(), n);
        let mut parts: Vec<Vec<T>> = Vec::with_capacity(ranges.len());
        for &(m, _) in ranges.iter().rev() {
            parts.push(self.split_off(m));
        }
        parts.reverse();
        parts
    }
}

impl<T> Join for Vec<T> {
    fn join_vec(parts: Vec<Self>) -> Result<Self> {
        let mut v = Vec::with_capacity(parts.iter().map(Vec::len).sum());
        for part in parts {
            v.extend(part);
        }
        Ok(v)
    }
}

pub struct RangeSplitter;

impl RangeSplitter {
    /// Cuts `start..end` into at most `n` contiguous, non-empty ranges whose
    /// lengths differ by at most one. An empty range yields one empty part.
    pub fn split(start: usize, end: usize, n: usize) -> Vec<(usize, usize)> {
        let len = end.saturating_sub(start);
        let n = n.clamp(1, len.max(1));
        let size = len / n;
        let extra = len % n;

        let mut ranges = Vec::with_capacity(n);
        let mut m = start;
        for i in 0..n {
            let k = m + size + usize::from(i < extra);
            ranges.push((m, k));
            m = k;
        }
        ranges
    }
}

pub trait Call<T, U> {
    fn call(&self, input: T) -> Result<U>;
}

impl<F, T, U> Call<T, U> for F
where
    F: Fn(T) -> Result<U>,
{
    fn call(&self, input: T) -> Result<U> {
        self(input)
    }
}

#[derive(Debug)]
struct SplitPart<T> {
    n: usize,
    part: T,
}

type Job<T> = SplitPart<T>;
type Done<U> = SplitPart<Result<U>>;

struct Worker<T> {
    tx: Option<mpsc::Sender<Job<T>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl<T> Worker<T>
where
    T: Send + 'static,
{
    fn spawn<F, U>(id: usize, f: F, done: mpsc::Sender<Done<U>>) -> Self
    where
        F: Fn(T) -> Result<U> + Send + 'static,
        U: Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job<T>>();
        let handle = thread::Builder::new()
            .name(format!("mandelgen-worker-{}", id))
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    let SplitPart { n, part } = job;
                    let result = panic::catch_unwind(AssertUnwindSafe(|| f(part)))
                        .unwrap_or(Err(Error::WorkerPanicked));
                    if done.send(SplitPart { n, part: result }).is_err() {
                        return;
                    }
                }
            });

        match handle {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
            },
            // A worker that failed to start has no sender; jobs routed to it
            // fail with `Disconnected`.
            Err(_) => Self {
                tx: None,
                handle: None,
            },
        }
    }
}

impl<T> Worker<T> {
    fn send(&self, job: Job<T>) -> Result<()> {
        match &self.tx {
            Some(tx) => tx.send(job).map_err(|_| Error::Disconnected),
            None => Err(Error::Disconnected),
        }
    }
}

/// A fixed set of threads. Each call splits its input, farms the parts out
/// round-robin and joins the results back in their original order.
pub struct WorkerPool<T, U> {
    workers: Vec<Worker<T>>,
    rx: mpsc::Receiver<Done<U>>,
}

impl<T, U> WorkerPool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Spawns `n` workers (at least one), each running a function built by
    /// `factory`.
    pub fn with<G, F>(n: usize, factory: G) -> Self
    where
        G: Fn() -> F,
        F: Fn(T) -> Result<U> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let workers = (0..n.max(1))
            .map(|id| Worker::spawn(id, factory(), tx.clone()))
            .collect();
        Self { workers, rx }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl<T, U> Call<T, U> for WorkerPool<T, U>
where
    T: Split,
    U: Join,
{
    fn call(&self, input: T) -> Result<U> {
        let parts = input.split_to_vec(self.workers.len() * PARTS_PER_WORKER);
        let count = parts.len();
        debug!("dispatching {} parts to {} workers", count, self.workers.len());

        let mut first_err = None;
        let mut sent = 0;
        for (n, part) in parts.into_iter().enumerate() {
            if let Err(e) = self.workers[n % self.workers.len()].send(SplitPart { n, part }) {
                first_err = Some(e);
                break;
            }
            sent += 1;
        }

        // Drain everything that was sent, even after a failure, so no stale
        // part is left behind for the next call.
        let mut results: Vec<Option<U>> = (0..count).map(|_| None).collect();
        for _ in 0..sent {
            let SplitPart { n, part } = self.rx.recv().map_err(|_| Error::Disconnected)?;
            match part {
                Ok(u) => results[n] = Some(u),
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let parts = results
            .into_iter()
            .collect::<Option<Vec<U>>>()
            .ok_or(Error::Disconnected)?;
        U::join_vec(parts)
    }
}

impl<T, U> Drop for WorkerPool<T, U> {
    fn drop(&mut self) {
        for worker in &mut self.workers {
            worker.tx.take();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_vec_split(length: usize, n: usize) {
        let v: Vec<usize> = (0..length).collect();
        let parts = v.clone().split_to_vec(n);
        assert!(parts.len() <= n.max(1));
        assert!(parts.len() == 1 || parts.iter().all(|p| !p.is_empty()));
        assert_eq!(Vec::join_vec(parts).unwrap(), v);
    }

    #[test]
    fn test_vec_splits() {
        test_vec_split(1, 1);
        test_vec_split(0, 2);
        test_vec_split(5, 8);
        test_vec_split(8, 5);
        test_vec_split(100, 1);
        test_vec_split(55, 47);
    }

    #[test]
    fn test_range_splitter() {
        assert_eq!(RangeSplitter::split(0, 10, 3), vec![(0, 4), (4, 7), (7, 10)]);
        assert_eq!(RangeSplitter::split(5, 7, 4), vec![(5, 6), (6, 7)]);
        assert_eq!(RangeSplitter::split(3, 3, 4), vec![(3, 3)]);
        assert_eq!(RangeSplitter::split(0, 4, 0), vec![(0, 4)]);
    }

    #[test]
    fn test_pool_keeps_order() {
        let pool = WorkerPool::with(3, || {
            |v: Vec<i64>| -> Result<Vec<i64>> { Ok(v.into_iter().map(|x| x * x).collect()) }
        });
        assert_eq!(pool.size(), 3);
        let input: Vec<i64> = (0..1000).collect();
        let expected: Vec<i64> = input.iter().map(|x| x * x).collect();
        assert_eq!(pool.call(input.clone()).unwrap(), expected);
        // the pool is reusable
        assert_eq!(pool.call(input).unwrap(), expected);
    }

    #[test]
    fn test_pool_reports_errors() {
        let pool = WorkerPool::with(2, || {
            |v: Vec<i64>| -> Result<Vec<i64>> {
                if v.contains(&13) {
                    Err(Error::Cancelled)
                } else {
                    Ok(v)
                }
            }
        });
        let input: Vec<i64> = (0..100).collect();
        assert!(matches!(pool.call(input), Err(Error::Cancelled)));
        assert_eq!(pool.call(vec![1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pool_survives_panics() {
        let pool = WorkerPool::with(2, || {
            |v: Vec<i64>| -> Result<Vec<i64>> {
                if v.contains(&7) {
                    panic!("boom");
                }
                Ok(v)
            }
        });
        assert!(matches!(
            pool.call((0..20).collect()),
            Err(Error::WorkerPanicked)
        ));
        assert_eq!(pool.call(vec![1, 2]).unwrap(), vec![1, 2]);
    }
}
