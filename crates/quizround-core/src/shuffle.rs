//! Fisher-Yates shuffling of round content.

use rand::Rng;

/// Return a uniformly shuffled copy of `items`.
///
/// Walks from the last index down to 1 and swaps each slot with a uniformly
/// chosen index in `0..=i`. The input is left untouched; empty and
/// single-element inputs come back unchanged.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn output_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 0..40u32 {
            let input: Vec<u32> = (0..n).collect();
            let mut out = shuffle(&input, &mut rng);
            assert_eq!(out.len(), input.len());
            out.sort_unstable();
            assert_eq!(out, input);
        }
    }

    #[test]
    fn small_inputs_are_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: Vec<&str> = vec![];
        assert!(shuffle(&empty, &mut rng).is_empty());
        assert_eq!(shuffle(&["only"], &mut rng), vec!["only"]);
    }

    #[test]
    fn input_is_not_mutated() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let _ = shuffle(&input, &mut rng);
        assert_eq!(input, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn same_seed_same_order() {
        let input: Vec<u32> = (0..20).collect();
        let a = shuffle(&input, &mut StdRng::seed_from_u64(99));
        let b = shuffle(&input, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn every_position_is_reachable() {
        // The first element should land in each of the three slots at some point.
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let out = shuffle(&['a', 'b', 'c'], &mut rng);
            let pos = out.iter().position(|&c| c == 'a').unwrap();
            seen[pos] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }
}
