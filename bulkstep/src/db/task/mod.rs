use crate::core::utils::errors::BspError;
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::warn;

pub mod context;
pub(crate) mod executor;
pub mod program;
pub mod runner;

/// Environment variable capping the size of the shared pool.
pub const MAX_THREADS_ENV: &str = "BULKSTEP_MAX_THREADS";

static POOL: OnceCell<Arc<ThreadPool>> = OnceCell::new();

fn default_num_threads() -> usize {
    let available = || {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    };
    match std::env::var(MAX_THREADS_ENV) {
        Ok(s) => match s.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!("{MAX_THREADS_ENV} must be a positive number, got {s:?}");
                available()
            }
        },
        Err(_) => available(),
    }
}

/// The pool shared by every job that does not ask for a thread count.
pub fn pool() -> Result<Arc<ThreadPool>, BspError> {
    POOL.get_or_try_init(|| custom_pool(default_num_threads()))
        .cloned()
}

pub fn custom_pool(n_threads: usize) -> Result<Arc<ThreadPool>, BspError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("bulkstep-{i}"))
        .build()?;

    Ok(Arc::new(pool))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn custom_pool_has_the_requested_size() {
        let pool = custom_pool(3).unwrap();
        assert_eq!(pool.current_num_threads(), 3);
    }

    #[test]
    fn shared_pool_is_built_once() {
        let a = pool().unwrap();
        let b = pool().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
