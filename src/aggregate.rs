use crate::record::KeystrokeRecord;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Insertion-ordered counter.
///
/// Iteration follows first-insertion order, and [`Tally::most_common`] uses a
/// stable sort so equal counts keep that order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u64)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: K, n: u64) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, n));
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(k, n)| (k, *n))
    }

    /// Entries sorted by descending count; ties keep insertion order.
    pub fn most_common(&self) -> Vec<(&K, u64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

/// Identity of a row in the frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub key_name: String,
    pub key_code: String,
}

impl PairKey {
    pub fn new(key_name: &str, key_code: &str) -> Self {
        Self {
            key_name: key_name.to_string(),
            key_code: key_code.to_string(),
        }
    }
}

pub type FrequencyCounter = Tally<PairKey>;

/// Case variant of an n-gram sample. `Literal` keeps the character as typed,
/// `Upper` folds ASCII `a`..=`z` to upper case and leaves everything else alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum CaseFold {
    #[strum(serialize = "cs")]
    Literal,
    #[strum(serialize = "ci")]
    Upper,
}

impl CaseFold {
    pub fn apply(self, ch: char) -> char {
        match self {
            CaseFold::Literal => ch,
            CaseFold::Upper if ch.is_ascii_lowercase() => ch.to_ascii_uppercase(),
            CaseFold::Upper => ch,
        }
    }

    pub fn is_uppercase(self) -> bool {
        self == CaseFold::Upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NgramKey {
    pub length: usize,
    pub fold: CaseFold,
}

impl NgramKey {
    pub fn new(length: usize, fold: CaseFold) -> Self {
        Self { length, fold }
    }
}

/// Character samples per (length, case variant).
#[derive(Debug, Clone, Default)]
pub struct NgramTable {
    tables: BTreeMap<NgramKey, Tally<char>>,
}

impl NgramTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: NgramKey) -> Option<&Tally<char>> {
        self.tables.get(&key)
    }

    pub fn get_or_insert(&mut self, key: NgramKey) -> &mut Tally<char> {
        self.tables.entry(key).or_default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in key order: by length, then `Literal` before `Upper`.
    pub fn iter(&self) -> impl Iterator<Item = (&NgramKey, &Tally<char>)> {
        self.tables.iter()
    }
}

/// Records one keystroke in both statistics.
///
/// Every record bumps its (key name, key code) pair. Single-character key names
/// are also sampled into the length-1 n-gram tables, once per case variant.
pub fn observe(record: &KeystrokeRecord, counter: &mut FrequencyCounter, ngrams: &mut NgramTable) {
    counter.increment(PairKey::new(record.key_name(), record.key_code()));

    let mut chars = record.key_name().chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        for fold in CaseFold::iter() {
            ngrams
                .get_or_insert(NgramKey::new(1, fold))
                .increment(fold.apply(ch));
        }
    }
}

/// Owner of the run-wide statistics.
#[derive(Debug, Default)]
pub struct Aggregator {
    counter: FrequencyCounter,
    ngrams: NgramTable,
    records: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &KeystrokeRecord) {
        observe(record, &mut self.counter, &mut self.ngrams);
        self.records += 1;
    }

    pub fn counter(&self) -> &FrequencyCounter {
        &self.counter
    }

    pub fn ngrams(&self) -> &NgramTable {
        &self.ngrams
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn into_parts(self) -> (FrequencyCounter, NgramTable) {
        (self.counter, self.ngrams)
    }
}
