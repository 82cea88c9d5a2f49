use std::f64::consts::LN_2;

use log::{info, warn};

use crate::{
    alphabet::{count_distinct_symbols, Alphabet},
    error::{Error, Result},
};

use frequency_table::FrequencyTable;
pub use progression::Progression;

mod frequency_table;
mod progression;

/// The hyperparameters of a [`ContextModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    context_width: usize,
    alpha: f64,
}

impl ModelParameters {
    pub fn new(context_width: usize, alpha: f64) -> Result<Self> {
        if context_width == 0 {
            return Err(Error::ContextWidthZero);
        }
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(Error::InvalidAlpha(alpha));
        }
        if alpha == 0.0 {
            warn!("alpha is 0, symbols unseen in a context will make scoring fail");
        }

        Ok(Self {
            context_width,
            alpha,
        })
    }
}

/// An order-k finite-context model of a reference text with additive smoothing.
///
/// Coding costs are reported in bits as non-negative numbers,
/// i.e. the negated base-2 logarithm of the predicted probabilities.
#[derive(Debug)]
pub struct ContextModel {
    parameters: ModelParameters,
    alphabet: Alphabet,
    table: FrequencyTable,
    /// `alpha * |alphabet|`, the smoothing mass added to each denominator.
    smoothing_mass: f64,
}

impl ContextModel {
    pub fn train(reference: &[u8], parameters: ModelParameters) -> Result<Self> {
        let alphabet = Alphabet::from_text(reference);
        if alphabet.is_empty() {
            return Err(Error::EmptyAlphabet);
        }

        let table = FrequencyTable::from_text(reference, parameters.context_width, &alphabet);
        if table.is_empty() {
            warn!(
                "the reference of length {} is not longer than the context width {}, all predictions are uniform",
                reference.len(),
                parameters.context_width
            );
        }

        info!(
            "Trained model with k = {} and alpha = {}: {} symbols, {} contexts, {} observations",
            parameters.context_width,
            parameters.alpha,
            alphabet.len(),
            table.context_count(),
            table.observation_count()
        );

        let smoothing_mass = parameters.alpha * alphabet.len() as f64;
        Ok(Self {
            parameters,
            alphabet,
            table,
            smoothing_mass,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The smoothed probability that `symbol` follows `context`.
    pub fn probability(&self, context: &[u8], symbol: u8) -> f64 {
        let (count, total) = match self.table.get(context) {
            Some(counter) => (
                counter.count(self.alphabet.index_of(symbol)),
                counter.total(),
            ),
            None => (0, 0),
        };

        (count as f64 + self.parameters.alpha) / (total as f64 + self.smoothing_mass)
    }

    /// The probability of the symbol following the window that starts at `position`.
    fn window_probability(&self, sequence: &[u8], position: usize) -> f64 {
        let end = position + self.parameters.context_width;
        self.probability(&sequence[position..end], sequence[end])
    }

    /// The number of window positions in a sequence of the given length.
    fn window_count(&self, length: usize) -> usize {
        length - self.parameters.context_width
    }

    fn check_length(&self, sequence: &[u8]) -> Result<()> {
        if sequence.len() < self.parameters.context_width {
            Err(Error::SequenceShorterThanContext {
                length: sequence.len(),
                context_width: self.parameters.context_width,
            })
        } else {
            Ok(())
        }
    }

    /// The estimated number of bits needed to encode `sequence` with this model.
    pub fn estimate_bits(&self, sequence: &[u8]) -> Result<f64> {
        self.check_length(sequence)?;

        let mut information = 0.0;
        for position in 0..self.window_count(sequence.len()) {
            let probability = self.window_probability(sequence, position);
            if probability.is_nan() || probability <= 0.0 {
                return Err(Error::UndefinedProbability { position });
            }
            information -= probability.ln();
        }

        Ok(information / LN_2)
    }

    /// The per-position coding costs of `sequence`, in bits.
    pub fn progression<'model, 'sequence>(
        &'model self,
        sequence: &'sequence [u8],
    ) -> Result<Progression<'model, 'sequence>> {
        self.check_length(sequence)?;
        Ok(Progression::new(self, sequence))
    }

    /// Normalised relative compression of `sequence`.
    ///
    /// Returns the estimated bits together with the score.
    pub fn nrc(&self, sequence: &[u8]) -> Result<(f64, f64)> {
        let bits = self.estimate_bits(sequence)?;
        let score = normalise(bits, sequence, self.alphabet.len())?;
        Ok((bits, score))
    }
}

/// Divides `bits` by `|alphabet| * log2(u)`, where `u` is the number of distinct symbols in `sequence`.
///
/// Note that the divisor does not depend on the length of the sequence.
pub fn normalise(bits: f64, sequence: &[u8], alphabet_size: usize) -> Result<f64> {
    let distinct_symbols = count_distinct_symbols(sequence);
    if distinct_symbols <= 1 {
        return Err(Error::DegenerateNormalization { distinct_symbols });
    }

    Ok(bits / (alphabet_size as f64 * (distinct_symbols as f64).log2()))
}
