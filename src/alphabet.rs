/// The distinct symbols of a reference text, in order of first appearance.
///
/// Symbols are bytes. Each symbol gets a dense index used by the frequency table.
#[derive(Debug, Clone)]
pub struct Alphabet {
    symbols: Vec<u8>,
    indices: [Option<u8>; 256],
}

impl Alphabet {
    pub fn from_text(text: &[u8]) -> Self {
        let mut result = Self {
            symbols: Vec::new(),
            indices: [None; 256],
        };

        for &symbol in text {
            if result.indices[symbol as usize].is_none() {
                result.indices[symbol as usize] = Some(result.symbols.len() as u8);
                result.symbols.push(symbol);
            }
        }

        result
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn index_of(&self, symbol: u8) -> Option<usize> {
        self.indices[symbol as usize].map(usize::from)
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
}

/// Number of distinct symbols in `sequence`, whether or not they belong to any alphabet.
pub fn count_distinct_symbols(sequence: &[u8]) -> usize {
    let mut seen = [false; 256];
    let mut count = 0;
    for &symbol in sequence {
        if !seen[symbol as usize] {
            seen[symbol as usize] = true;
            count += 1;
        }
    }
    count
}
