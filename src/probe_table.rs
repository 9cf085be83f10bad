//! ProbeTable: open addressing with linear probing and multiplicative growth.

use crate::behavior::{HashedBehavior, TableBehavior};
use crate::config::TableConfig;
use crate::error::{PutError, TableError};
use crate::reentrancy::DebugReentrancy;
use core::fmt;

/// Outcome of a linear probe for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Occupied(usize),
    Vacant(usize),
}

/// Parallel key/value arrays; slot `i` is empty iff `keys[i]` is `None`.
struct Slots<K, V> {
    keys: Vec<Option<K>>,
    values: Vec<Option<V>>,
}

impl<K, V> Slots<K, V> {
    fn filled(capacity: usize) -> Self {
        Self {
            keys: (0..capacity).map(|_| None).collect(),
            values: (0..capacity).map(|_| None).collect(),
        }
    }

    fn try_filled(capacity: usize) -> Result<Self, TableError> {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        keys.try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocationFailed { capacity })?;
        values
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocationFailed { capacity })?;
        keys.resize_with(capacity, || None);
        values.resize_with(capacity, || None);
        Ok(Self { keys, values })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    fn home(&self, hash: u64) -> usize {
        (hash % self.capacity() as u64) as usize
    }

    fn probe<B>(&self, behavior: &B, key: &K) -> Probe
    where
        B: TableBehavior<K, V>,
    {
        self.probe_from(behavior, key, behavior.hash(key))
    }

    /// Walk from the home slot of `hash` until a match or an empty slot.
    /// Terminates because a table never fills up (threshold < 1).
    fn probe_from<B>(&self, behavior: &B, key: &K, hash: u64) -> Probe
    where
        B: TableBehavior<K, V>,
    {
        let capacity = self.capacity();
        let mut index = self.home(hash);
        loop {
            match &self.keys[index] {
                None => return Probe::Vacant(index),
                Some(resident) if behavior.equals(resident, key) => {
                    return Probe::Occupied(index)
                }
                Some(_) => index = (index + 1) % capacity,
            }
        }
    }

    /// Move every entry into `fresh` in ascending slot order, placing each
    /// by the hash recorded for its old slot in `hashes`. Runs no user code.
    ///
    /// Returns `(migrated, skipped)`: entries moved and occupied slots passed
    /// over while finding each one a home.
    fn migrate_into(
        &mut self,
        fresh: &mut Slots<K, V>,
        hashes: &[Option<u64>],
    ) -> (usize, usize) {
        let capacity = fresh.capacity();
        let mut migrated = 0;
        let mut skipped = 0;
        let slots = self.keys.iter_mut().zip(self.values.iter_mut());
        for ((key, value), hash) in slots.zip(hashes) {
            let (Some(key), Some(hash)) = (key.take(), *hash) else { continue };
            let mut index = fresh.home(hash);
            while fresh.keys[index].is_some() {
                index = (index + 1) % capacity;
                skipped += 1;
            }
            fresh.keys[index] = Some(key);
            fresh.values[index] = value.take();
            migrated += 1;
        }
        (migrated, skipped)
    }

    fn occupied(&self) -> impl Iterator<Item = (usize, &K, &V)> {
        self.keys
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .filter_map(|(i, (k, v))| Some((i, k.as_ref()?, v.as_ref()?)))
    }
}

/// Snapshot of a table's size and observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub size: usize,
    pub capacity: usize,
    /// Occupied slots skipped while re-placing entries during rehashes.
    pub collisions: usize,
    /// Entries migrated across all rehashes.
    pub rehashes: usize,
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Size: {}, Capacity: {}, Collisions: {}, Rehashes: {}",
            self.size, self.capacity, self.collisions, self.rehashes
        )
    }
}

/// Open-addressing hash table parameterized by a `TableBehavior`.
///
/// The table takes ownership of keys and values. On destruction (explicit
/// `destroy` or drop) each remaining pair is handed to
/// `TableBehavior::delete` in slot order.
///
/// ```
/// use probe_table::ProbeTable;
///
/// let mut t = ProbeTable::new();
/// assert_eq!(t.put("a".to_string(), 1).unwrap(), None);
/// assert_eq!(t.put("a".to_string(), 2).unwrap(), Some(1));
/// assert_eq!(t.get(&"a".to_string()), Some(&2));
/// assert_eq!(t.len(), 1);
/// ```
pub struct ProbeTable<K, V, B = HashedBehavior>
where
    B: TableBehavior<K, V>,
{
    behavior: B,
    config: TableConfig,
    slots: Slots<K, V>,
    size: usize,
    collisions: usize,
    rehashes: usize,
    reentrancy: DebugReentrancy,
}

impl<K, V> ProbeTable<K, V>
where
    HashedBehavior: TableBehavior<K, V>,
{
    pub fn new() -> Self {
        Self::with_behavior(HashedBehavior::new())
    }
}

impl<K, V> Default for ProbeTable<K, V>
where
    HashedBehavior: TableBehavior<K, V>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over occupied slots in ascending slot order.
pub struct Iter<'a, K, V> {
    keys: core::slice::Iter<'a, Option<K>>,
    values: core::slice::Iter<'a, Option<V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.keys.next()?;
            let value = self.values.next()?;
            if let (Some(k), Some(v)) = (key, value) {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V, B> ProbeTable<K, V, B>
where
    B: TableBehavior<K, V>,
{
    /// Create a table with the default configuration.
    pub fn with_behavior(behavior: B) -> Self {
        let config = TableConfig::default();
        let slots = Slots::filled(config.initial_capacity);
        Self::from_parts(behavior, config, slots)
    }

    /// Create a table with explicit capacity and growth settings.
    pub fn with_config(behavior: B, config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let slots = Slots::try_filled(config.initial_capacity)?;
        Ok(Self::from_parts(behavior, config, slots))
    }

    fn from_parts(behavior: B, config: TableConfig, slots: Slots<K, V>) -> Self {
        log::trace!(
            "ProbeTable created: capacity {}, threshold {}, factor {}",
            slots.capacity(),
            config.load_threshold,
            config.resize_factor
        );
        Self {
            behavior,
            config,
            slots,
            size: 0,
            collisions: 0,
            rehashes: 0,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }
    pub fn collisions(&self) -> usize {
        self.collisions
    }
    pub fn rehashes(&self) -> usize {
        self.rehashes
    }
    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.slots.capacity() as f64
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            size: self.size,
            capacity: self.slots.capacity(),
            collisions: self.collisions,
            rehashes: self.rehashes,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        matches!(
            self.slots.probe(&self.behavior, key),
            Probe::Occupied(_)
        )
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        match self.slots.probe(&self.behavior, key) {
            Probe::Occupied(index) => self.slots.values[index].as_ref(),
            Probe::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        match self.slots.probe(&self.behavior, key) {
            Probe::Occupied(index) => self.slots.values[index].as_mut(),
            Probe::Vacant(_) => None,
        }
    }

    /// Insert or update.
    ///
    /// An existing equal key keeps its resident key object and only has its
    /// value replaced; the previous value is returned. A new key is stored
    /// and, if the insert pushes the load factor above the threshold, the
    /// table is rehashed into `capacity * resize_factor` slots before
    /// returning.
    ///
    /// Growth storage is acquired, and every resident key hashed, before the
    /// new pair is stored. An `Err` leaves the table exactly as it was and
    /// hands the pair back in the `PutError`.
    pub fn put(&mut self, key: K, value: V) -> Result<Option<V>, PutError<K, V>> {
        let _g = self.reentrancy.enter("put");
        let hash = self.behavior.hash(&key);
        let index = match self.slots.probe_from(&self.behavior, &key, hash) {
            Probe::Occupied(index) => return Ok(self.slots.values[index].replace(value)),
            Probe::Vacant(index) => index,
        };

        let old_capacity = self.slots.capacity();
        let growth = if self.config.exceeds_threshold(self.size + 1, old_capacity) {
            match self.prepare_growth() {
                Ok(growth) => Some(growth),
                Err(error) => {
                    log::warn!("ProbeTable growth from {old_capacity} slots failed: {error}");
                    return Err(PutError { error, key, value });
                }
            }
        } else {
            None
        };

        self.slots.keys[index] = Some(key);
        self.slots.values[index] = Some(value);
        self.size += 1;

        if let Some((mut fresh, mut hashes)) = growth {
            hashes[index] = Some(hash);
            let (migrated, skipped) = self.slots.migrate_into(&mut fresh, &hashes);
            debug_assert_eq!(migrated, self.size);
            self.slots = fresh;
            self.rehashes += migrated;
            self.collisions += skipped;
            log::debug!(
                "ProbeTable rehashed {migrated} entries: capacity {old_capacity} -> {}, {skipped} collisions",
                self.slots.capacity()
            );
        }
        Ok(None)
    }

    /// Allocate the grown slot arrays and hash every resident key, one hash
    /// per old slot. All user code of a rehash runs here, before any entry
    /// moves.
    fn prepare_growth(&self) -> Result<(Slots<K, V>, Vec<Option<u64>>), TableError> {
        let capacity = self.slots.capacity();
        let factor = self.config.resize_factor;
        let new_capacity = capacity
            .checked_mul(factor)
            .ok_or(TableError::CapacityOverflow { capacity, factor })?;
        let fresh = Slots::try_filled(new_capacity)?;

        let mut hashes = Vec::new();
        hashes
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocationFailed { capacity })?;
        hashes.extend(
            self.slots
                .keys
                .iter()
                .map(|k| k.as_ref().map(|k| self.behavior.hash(k))),
        );
        Ok((fresh, hashes))
    }

    /// Keys of all occupied slots, in ascending slot order.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.size);
        keys.extend(self.iter().map(|(k, _)| k));
        keys
    }

    /// Values of all occupied slots, in the same order as `keys`.
    pub fn values(&self) -> Vec<&V> {
        let mut values = Vec::with_capacity(self.size);
        values.extend(self.iter().map(|(_, v)| v));
        values
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: self.slots.keys.iter(),
            values: self.slots.values.iter(),
            remaining: self.size,
        }
    }

    /// Write size, capacity and counters; with `contents`, also every
    /// occupied bucket rendered through `TableBehavior::print`.
    pub fn dump<W: fmt::Write>(&self, contents: bool, out: &mut W) -> fmt::Result {
        let _g = self.reentrancy.enter("dump");
        writeln!(out, "Hash Table Information:")?;
        writeln!(out, "{}", self.stats())?;
        if contents {
            writeln!(out, "Hash Table Contents:")?;
            for (index, key, value) in self.slots.occupied() {
                write!(out, "Bucket {index}: ")?;
                self.behavior.print(key, value, out)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// Release every entry through `TableBehavior::delete`, then the table.
    pub fn destroy(self) {
        drop(self);
    }

    #[cfg(test)]
    pub(crate) fn slot_of(&self, key: &K) -> Option<usize> {
        match self.slots.probe(&self.behavior, key) {
            Probe::Occupied(index) => Some(index),
            Probe::Vacant(_) => None,
        }
    }

    /// Panics unless the structural invariants hold: parallel arrays agree,
    /// `size` matches, no duplicate keys, and every key is reachable from its
    /// home slot without crossing an empty slot.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.slots.capacity();
        assert!(capacity >= 1);
        assert_eq!(self.slots.values.len(), capacity);
        let mut occupied = 0;
        for (i, (k, v)) in self.slots.keys.iter().zip(&self.slots.values).enumerate() {
            assert_eq!(k.is_some(), v.is_some(), "slot {i} half occupied");
            let Some(key) = k else { continue };
            occupied += 1;

            let mut index = self.slots.home(self.behavior.hash(key));
            while index != i {
                let resident = self.slots.keys[index]
                    .as_ref()
                    .unwrap_or_else(|| panic!("slot {i} unreachable: empty slot {index} on path"));
                assert!(
                    !self.behavior.equals(resident, key),
                    "duplicate key at slots {index} and {i}"
                );
                index = (index + 1) % capacity;
            }
        }
        assert_eq!(occupied, self.size);
        assert!(!self.config.exceeds_threshold(self.size, capacity));
    }
}

impl<K, V, B> Drop for ProbeTable<K, V, B>
where
    B: TableBehavior<K, V>,
{
    fn drop(&mut self) {
        let _g = self.reentrancy.enter("destroy");
        let mut released = 0usize;
        for (key, value) in self.slots.keys.iter_mut().zip(self.slots.values.iter_mut()) {
            if let (Some(key), Some(value)) = (key.take(), value.take()) {
                self.behavior.delete(key, value);
                released += 1;
            }
        }
        log::trace!(
            "ProbeTable destroyed: {released} entries released from {} slots",
            self.slots.capacity()
        );
    }
}

impl<'a, K, V, B> IntoIterator for &'a ProbeTable<K, V, B>
where
    B: TableBehavior<K, V>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, B> fmt::Debug for ProbeTable<K, V, B>
where
    B: TableBehavior<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeTable")
            .field("stats", &self.stats())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
