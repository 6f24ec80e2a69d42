use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::error::EngineError;

/// Fixed-size pool running one unit of work per satellite.
pub struct Coordinator {
    pool: ThreadPool,
}

impl Coordinator {
    pub fn new(concurrency_level: usize) -> Result<Self, EngineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency_level.max(1))
            .thread_name(|i| format!("overhead-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `work` over every item and blocks until all are done. Results come
    /// back in submission order.
    pub fn run<T, U, F>(&self, items: &[T], work: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(work).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_submission_order() {
        let coordinator = Coordinator::new(4).unwrap();
        assert_eq!(coordinator.num_threads(), 4);
        let items: Vec<u64> = (0..100).collect();
        let squares = coordinator.run(&items, |x| x * x);
        assert_eq!(squares, items.iter().map(|x| x * x).collect::<Vec<_>>());
    }

    #[test]
    fn single_thread_matches_many() {
        let items: Vec<u64> = (0..37).collect();
        let sequential = Coordinator::new(1).unwrap().run(&items, |x| x + 1);
        let parallel = Coordinator::new(8).unwrap().run(&items, |x| x + 1);
        assert_eq!(sequential, parallel);
    }
}
