use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

/// Tire un candidat proportionnellement à son poids.
///
/// Les poids négatifs ou non finis comptent pour zéro. Si tous les poids sont
/// nuls, le tirage est uniforme. `None` uniquement si `candidates` est vide.
pub fn weighted_choice<T: Clone, R: Rng + ?Sized>(
    candidates: &[(T, f64)],
    rng: &mut R,
) -> Option<T> {
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|(_, w)| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();

    let idx = match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.random_range(0..candidates.len()),
    };
    Some(candidates[idx].0.clone())
}

pub fn uniform_choice<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.random_range(0..items.len())].clone())
}

pub fn uniform_digits<R: Rng + ?Sized>(rng: &mut R) -> [u8; 6] {
    std::array::from_fn(|_| rng.random_range(0..10u8))
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_weighted_choice_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: Vec<(u8, f64)> = vec![];
        assert_eq!(weighted_choice(&empty, &mut rng), None);
    }

    #[test]
    fn test_weighted_choice_single_positive_weight() {
        let mut rng = StdRng::seed_from_u64(7);
        let candidates = vec![('a', 0.0), ('b', 3.0), ('c', 0.0)];
        for _ in 0..200 {
            assert_eq!(weighted_choice(&candidates, &mut rng), Some('b'));
        }
    }

    #[test]
    fn test_weighted_choice_proportions() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = vec![(0u8, 1.0), (1u8, 3.0)];
        let n = 20_000;
        let ones = (0..n)
            .filter(|_| weighted_choice(&candidates, &mut rng) == Some(1))
            .count();
        let share = ones as f64 / n as f64;
        assert!((share - 0.75).abs() < 0.02, "part = {share}");
    }

    #[test]
    fn test_weighted_choice_all_zero_is_uniform() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates: Vec<(u8, f64)> = (0..4).map(|d| (d, 0.0)).collect();
        let mut seen = [0u32; 4];
        for _ in 0..4_000 {
            let d = weighted_choice(&candidates, &mut rng).unwrap();
            seen[d as usize] += 1;
        }
        for &count in &seen {
            assert!(count > 800, "tirage non uniforme : {seen:?}");
        }
    }

    #[test]
    fn test_weighted_choice_ignores_invalid_weights() {
        let mut rng = StdRng::seed_from_u64(9);
        let candidates = vec![(0u8, f64::NAN), (1u8, -2.0), (2u8, 1.0)];
        for _ in 0..100 {
            assert_eq!(weighted_choice(&candidates, &mut rng), Some(2));
        }
    }

    #[test]
    fn test_constant_rng_weighted_choice_terminates() {
        let mut rng = testing::ConstantRng(0);
        let candidates = vec![(0u8, 1.0), (1u8, 1.0)];
        assert!(weighted_choice(&candidates, &mut rng).is_some());
        let digits = uniform_digits(&mut rng);
        assert!(digits.iter().all(|&d| d <= 9));
    }
}
