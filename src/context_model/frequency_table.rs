use ahash::AHashMap;

use crate::alphabet::Alphabet;

/// Successor counts of a single context, indexed by alphabet index.
#[derive(Debug, Clone)]
pub struct ContextCounter {
    counts: Vec<u64>,
    total: u64,
}

impl ContextCounter {
    fn new(alphabet_size: usize) -> Self {
        Self {
            counts: vec![0; alphabet_size],
            total: 0,
        }
    }

    fn increment(&mut self, index: usize) {
        self.counts[index] += 1;
        self.total += 1;
    }

    /// The count of the symbol with the given alphabet index.
    /// Symbols outside the alphabet were never observed and count zero.
    pub fn count(&self, index: Option<usize>) -> u64 {
        index.map_or(0, |index| self.counts[index])
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Maps each context of the reference to the counts of the symbols following it.
///
/// Contexts that never occur in the reference are absent.
#[derive(Debug)]
pub struct FrequencyTable {
    context_width: usize,
    counters: AHashMap<Vec<u8>, ContextCounter>,
}

impl FrequencyTable {
    pub fn from_text(text: &[u8], context_width: usize, alphabet: &Alphabet) -> Self {
        let mut result = Self {
            context_width,
            counters: Default::default(),
        };

        let mut start = 0;
        while start + context_width < text.len() {
            let end = start + context_width;
            let context = &text[start..end];
            let successor = text[end];

            if let Some(index) = alphabet.index_of(successor) {
                if let Some(counter) = result.counters.get_mut(context) {
                    counter.increment(index);
                } else {
                    let mut counter = ContextCounter::new(alphabet.len());
                    counter.increment(index);
                    result.counters.insert(context.to_vec(), counter);
                }
            }

            start += 1;
        }

        result
    }

    pub fn get(&self, context: &[u8]) -> Option<&ContextCounter> {
        debug_assert_eq!(context.len(), self.context_width);
        self.counters.get(context)
    }

    pub fn context_count(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Sum of the totals of all counters.
    pub fn observation_count(&self) -> u64 {
        self.counters.values().map(ContextCounter::total).sum()
    }
}
