// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! The shared, growable pool of photon records.

Everything in the simulation reads and writes one ordered buffer of photon
records. A record whose weight is zero is a *null slot*: a photon that was
absorbed or never existed, whose storage may be reused. The weight is the
only authoritative occupancy marker — transport elsewhere in the simulator
nulls photons by zeroing their weight without telling us — so the pool
rebuilds its free-list from a scan of the buffer at the start of each
emission operation.

The free-list holds null-slot indices in ascending order and is consumed
from the tail, so the highest-indexed (most recently invalidated or most
recently appended) slots are reused first. When a request outstrips the
free-list the buffer grows by exactly the shortfall; existing records keep
their indices and their bits. Growth that the allocator cannot satisfy is
reported as an error rather than aborting, and the pool is left unchanged.

*/

use rayon::prelude::*;

use {EmissionError, Photon};


/// The photon population: an ordered, growable buffer of records plus a
/// free-list of reusable null slots.
#[derive(Clone, Debug, Default)]
pub struct PhotonPool {
    photons: Vec<Photon>,
    free: Vec<usize>,
}

impl PhotonPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        PhotonPool {
            photons: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Adopt an existing photon buffer, indexing its null slots.
    pub fn from_photons(photons: Vec<Photon>) -> Self {
        let mut pool = PhotonPool {
            photons: photons,
            free: Vec::new(),
        };
        pool.refresh_free();
        pool
    }

    /// The total number of slots, occupied or not.
    pub fn len(&self) -> usize {
        self.photons.len()
    }

    /// Whether the pool holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// The number of null slots currently on the free-list.
    pub fn null_count(&self) -> usize {
        self.free.len()
    }

    /// Read-only access to every record.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Mutable access to every record. Callers that null or revive photons
    /// through this are expected to let [`PhotonPool::refresh_free`] run
    /// before the next acquisition.
    pub fn photons_mut(&mut self) -> &mut [Photon] {
        &mut self.photons
    }

    /// Rebuild the free-list by scanning the buffer for zero-weight records.
    ///
    /// The scan is a parallel filter over independent slots; the collected
    /// indices come back in ascending order.
    pub fn refresh_free(&mut self) {
        self.free = self.photons.par_iter()
            .enumerate()
            .filter(|&(_, ph)| ph.is_null())
            .map(|(i, _)| i)
            .collect();
    }

    /// Reserve `n` slots for new photons, growing the buffer by exactly the
    /// shortfall if the free-list cannot cover the request.
    ///
    /// Newly grown slots are initialized null. The returned indices are in
    /// ascending order and are meant to be consumed from the tail (pop), so
    /// the most recently invalidated or freshly grown slots fill first. The
    /// returned slots are no longer on the free-list; whoever acquires them
    /// must either populate them or push them back via
    /// [`PhotonPool::refresh_free`].
    pub fn acquire(&mut self, n: usize) -> Result<Vec<usize>, EmissionError> {
        if n > self.free.len() {
            let shortfall = n - self.free.len();

            self.photons.try_reserve_exact(shortfall).map_err(|source| {
                EmissionError::PoolAllocation {
                    additional: shortfall,
                    source: source,
                }
            })?;

            for _ in 0..shortfall {
                self.free.push(self.photons.len());
                self.photons.push(Photon::null());
            }
        }

        let at = self.free.len() - n;
        Ok(self.free.split_off(at))
    }
}


#[cfg(test)]
mod tests {
    use {Photon, PhotonType};
    use super::PhotonPool;

    fn occupied(tag: f64) -> Photon {
        let mut ph = Photon::null();
        ph.weight = tag;
        ph.kind = PhotonType::Injected;
        ph.lab_momentum = [tag, 0., 0., tag];
        ph
    }

    #[test]
    fn empty_pool_grows_by_request() {
        let mut pool = PhotonPool::new();
        let slots = pool.acquire(5).unwrap();

        assert_eq!(pool.len(), 5);
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
        assert_eq!(pool.null_count(), 0);
        assert!(pool.photons().iter().all(|ph| ph.is_null()));
        assert!(pool.photons().iter().all(|ph| ph.nearest_block_index == -1));
    }

    #[test]
    fn free_slots_are_consumed_tail_first() {
        let mut pool = PhotonPool::from_photons(vec![
            Photon::null(),
            occupied(1.),
            Photon::null(),
            occupied(2.),
            Photon::null(),
        ]);

        assert_eq!(pool.null_count(), 3);

        let slots = pool.acquire(2).unwrap();
        // Ascending storage, tail-first consumption: the caller pops 4 then 2.
        assert_eq!(slots, vec![2, 4]);
        assert_eq!(pool.null_count(), 1);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn growth_is_exactly_the_shortfall() {
        let mut pool = PhotonPool::from_photons(vec![
            occupied(1.),
            Photon::null(),
            Photon::null(),
        ]);

        let slots = pool.acquire(5).unwrap();

        assert_eq!(pool.len(), 6);
        assert_eq!(slots, vec![1, 2, 3, 4, 5]);
        assert_eq!(pool.null_count(), 0);
    }

    #[test]
    fn growth_preserves_existing_records() {
        let originals = vec![occupied(1.), occupied(2.), Photon::null(), occupied(3.)];
        let mut pool = PhotonPool::from_photons(originals.clone());

        pool.acquire(10).unwrap();

        assert_eq!(pool.len(), originals.len() + 9);
        for (before, after) in originals.iter().zip(pool.photons()) {
            assert_eq!(before, after);
        }
    }

    #[test]
    fn refresh_tracks_externally_nulled_photons() {
        let mut pool = PhotonPool::from_photons(vec![occupied(1.), occupied(2.), occupied(3.)]);
        assert_eq!(pool.null_count(), 0);

        // Transport absorbs the middle photon.
        pool.photons_mut()[1].weight = 0.;
        pool.refresh_free();

        assert_eq!(pool.null_count(), 1);
        assert_eq!(pool.acquire(1).unwrap(), vec![1]);
    }

    #[test]
    fn acquire_zero_is_a_no_op() {
        let mut pool = PhotonPool::from_photons(vec![occupied(1.), Photon::null()]);
        let slots = pool.acquire(0).unwrap();

        assert!(slots.is_empty());
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.null_count(), 1);
    }
}
