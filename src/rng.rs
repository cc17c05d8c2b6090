// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Random-number streams for parallel sampling.

The emission operation draws Poisson counts for many cells in parallel, so
each worker needs its own stream. The pool here owns one seedable ChaCha
stream per worker, every stream seeded by drawing from the caller's primary
stream in index order. Streams are handed to work by a fixed partition of the
cell list — contiguous chunks, one per stream — never by looking up a runtime
thread id, so a run is reproducible for a fixed stream count regardless of
how the scheduler interleaves the workers.

The primary stream is only borrowed: it seeds the pool, remains untouched
otherwise, and stays with the caller after the pool is dropped at the end of
the operation.

*/

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon;


/// A pool of independent, deterministically seeded random streams.
#[derive(Clone, Debug)]
pub struct RngPool {
    streams: Vec<ChaCha8Rng>,
}

impl RngPool {
    /// Create a pool of `n_streams` streams (at least one), seeded in index
    /// order from the primary stream.
    pub fn new<R: RngCore>(primary: &mut R, n_streams: usize) -> Self {
        let n = n_streams.max(1);

        RngPool {
            streams: (0..n).map(|_| ChaCha8Rng::seed_from_u64(primary.next_u64())).collect(),
        }
    }

    /// Create a pool with one stream per rayon worker thread.
    pub fn per_worker<R: RngCore>(primary: &mut R) -> Self {
        RngPool::new(primary, rayon::current_num_threads())
    }

    /// The number of streams in the pool.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether the pool is empty; it never is.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// The chunk length that partitions `n_items` work items contiguously
    /// across the streams, one chunk per stream.
    pub fn chunk_len(&self, n_items: usize) -> usize {
        ((n_items + self.streams.len() - 1) / self.streams.len()).max(1)
    }

    /// Mutable access to the streams, for zipping against partitioned work.
    pub fn streams_mut(&mut self) -> &mut [ChaCha8Rng] {
        &mut self.streams
    }
}
