use cozy_chess::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
    pub gen: u32,
}

const WAYS: usize = 4;

#[derive(Default, Clone, Copy)]
struct Bucket {
    slots: [Option<Entry>; WAYS],
}

/// Bucketed transposition table owned by a single searcher.
pub struct Tt {
    buckets: Vec<Bucket>,
    gen: u32,
}

impl Default for Tt {
    fn default() -> Self { Self::with_entries(1 << 16) }
}

impl Tt {
    pub fn with_entries(cap: usize) -> Self {
        let buckets = (cap.max(WAYS) + WAYS - 1) / WAYS;
        Self { buckets: vec![Bucket::default(); buckets], gen: 0 }
    }

    pub fn clear(&mut self) {
        for b in &mut self.buckets { *b = Bucket::default(); }
        self.gen = 0;
    }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len()
    }

    pub fn get(&self, key: u64) -> Option<Entry> {
        let b = &self.buckets[self.bucket_index(key)];
        b.slots.iter().flatten().find(|e| e.key == key).copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.slots.iter().flatten().count()).sum()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn put(&mut self, mut e: Entry) {
        e.gen = self.gen;
        let idx = self.bucket_index(e.key);
        let bucket = &mut self.buckets[idx];
        // Replace same key if deeper
        for slot in bucket.slots.iter_mut() {
            if let Some(cur) = slot {
                if cur.key == e.key {
                    if e.depth >= cur.depth { *slot = Some(e); }
                    return;
                }
            }
        }
        if let Some(slot) = bucket.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(e);
            return;
        }
        // Evict lowest depth, then oldest generation
        let victim = bucket.slots.iter().enumerate()
            .min_by_key(|(_, s)| s.map(|c| (c.depth, c.gen)).unwrap_or((0, 0)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        bucket.slots[victim] = Some(e);
    }

    pub fn bump_generation(&mut self) { self.gen = self.gen.wrapping_add(1); }
}
