//! Keyword scheduling across a bounded worker pool
//!
//! Keywords live in a single shared pool with an atomic take-one
//! operation. In randomized mode workers draw a uniformly random
//! remaining keyword (without replacement); otherwise keywords come out
//! in input order. A fixed number of worker tasks drain the pool, each
//! keyword's crawl runs fully inside one worker, and shutdown waits for
//! every in-flight crawl to finish.

use rand::Rng;
use std::sync::{Arc, Mutex};

use crate::harvest::crawler::KeywordCrawler;
use crate::output::RunSummary;

/// Shared keyword pool with an atomic take-one operation
///
/// All workers draw from the same mutex-guarded list, so randomized draw
/// is without replacement across the whole pool rather than per worker.
pub struct KeywordPool {
    keywords: Mutex<Vec<String>>,
    randomized: bool,
}

impl KeywordPool {
    /// Creates a pool over the given keywords
    pub fn new(keywords: Vec<String>, randomized: bool) -> Self {
        Self {
            keywords: Mutex::new(keywords),
            randomized,
        }
    }

    /// Removes and returns one keyword, or None when the pool is drained
    pub fn take(&self) -> Option<String> {
        let mut pool = self.keywords.lock().unwrap();
        if pool.is_empty() {
            return None;
        }

        if self.randomized {
            let index = rand::thread_rng().gen_range(0..pool.len());
            Some(pool.swap_remove(index))
        } else {
            Some(pool.remove(0))
        }
    }

    /// Number of keywords not yet taken
    pub fn remaining(&self) -> usize {
        self.keywords.lock().unwrap().len()
    }
}

/// Runs keyword crawls across a bounded worker pool
///
/// # Arguments
///
/// * `crawler` - The per-keyword pipeline, shared by all workers
/// * `keywords` - The keywords to process, each exactly once
/// * `concurrency` - Worker pool size
/// * `randomized` - Draw keywords in random order without replacement
///
/// # Returns
///
/// The merged run summary once every worker has finished
pub async fn run_harvest(
    crawler: KeywordCrawler,
    keywords: Vec<String>,
    concurrency: u32,
    randomized: bool,
) -> RunSummary {
    let crawler = Arc::new(crawler);
    let pool = Arc::new(KeywordPool::new(keywords, randomized));

    let mut handles = Vec::new();
    for worker_id in 0..concurrency {
        let crawler = Arc::clone(&crawler);
        let pool = Arc::clone(&pool);

        handles.push(tokio::spawn(async move {
            let mut partial = RunSummary::default();

            while let Some(keyword) = pool.take() {
                tracing::debug!("Worker {} starting keyword '{}'", worker_id, keyword);

                let run = crawler.crawl_keyword(&keyword).await;
                partial.merge(&run.stats);
                if run.aborted {
                    partial.keywords_aborted += 1;
                } else {
                    partial.keywords_processed += 1;
                }
            }

            partial
        }));
    }

    let mut summary = RunSummary::default();
    for handle in handles {
        match handle.await {
            Ok(partial) => summary.absorb(&partial),
            // A panicking keyword crawl is isolated to its worker; the
            // keywords it never reached were drained by the others
            Err(e) => tracing::error!("Keyword worker failed: {}", e),
        }
    }

    summary
}
