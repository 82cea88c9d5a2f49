use std::f64::consts::LN_2;

use super::ContextModel;

/// Iterator over the coding cost in bits of each window position of a sequence.
///
/// Clone it before iterating to trace the same sequence again.
#[derive(Debug, Clone)]
pub struct Progression<'model, 'sequence> {
    model: &'model ContextModel,
    sequence: &'sequence [u8],
    position: usize,
    limit: usize,
}

impl<'model, 'sequence> Progression<'model, 'sequence> {
    pub(super) fn new(model: &'model ContextModel, sequence: &'sequence [u8]) -> Self {
        Self {
            model,
            sequence,
            position: 0,
            limit: model.window_count(sequence.len()),
        }
    }
}

impl Iterator for Progression<'_, '_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position < self.limit {
            let probability = self.model.window_probability(self.sequence, self.position);
            self.position += 1;
            Some(-probability.ln() / LN_2)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.limit - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Progression<'_, '_> {}

#[cfg(test)]
mod tests {
    use crate::context_model::{ContextModel, ModelParameters};

    fn model() -> ContextModel {
        ContextModel::train(
            b"ACGTTGCAACGGATCCATGAACGTAGCTAGCTTAGGCA",
            ModelParameters::new(3, 0.25).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_sum_matches_total() {
        let model = model();
        let sequences: [&[u8]; 4] = [
            b"ACGTTGCAAC",
            b"TTTTTTTTTTTTTTTTTTTTTTTTTTT",
            b"GATTACAGATTACANNN",
            b"ACG",
        ];
        for sequence in sequences {
            let total = model.estimate_bits(sequence).unwrap();
            let summed: f64 = model.progression(sequence).unwrap().sum();
            assert!((total - summed).abs() < 1e-9, "{total} != {summed}");
        }
    }

    #[test]
    fn test_length_and_sign() {
        let model = model();
        let progression = model.progression(b"ACGTTGCAAC").unwrap();
        assert_eq!(progression.len(), 7);
        assert!(progression.clone().all(|bits| bits >= 0.0));
        assert_eq!(progression.count(), 7);
    }

    #[test]
    fn test_restartable() {
        let model = model();
        let progression = model.progression(b"GCAACGGATCCTTT").unwrap();
        let first: Vec<f64> = progression.clone().collect();
        let second: Vec<f64> = progression.collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            model
                .progression(b"GCAACGGATCCTTT")
                .unwrap()
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unseen_context_costs_uniform() {
        let model = model();
        let alphabet_size = model.alphabet().len() as f64;
        let bits: Vec<f64> = model.progression(b"TTTT").unwrap().collect();
        assert_eq!(bits.len(), 1);
        assert!((bits[0] - alphabet_size.log2()).abs() < 1e-12);
    }
}
