//! Worker pool setup for file reading, parsing and binding.

use anyhow::Result;

/// Size the global rayon pool. `None` uses every core.
pub fn init_thread_pool(jobs: Option<usize>) -> Result<()> {
    let cores = num_cpus::get();
    let workers = jobs.unwrap_or(cores).max(1);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    tracing::debug!(workers, cores, "initialized thread pool");

    Ok(())
}
