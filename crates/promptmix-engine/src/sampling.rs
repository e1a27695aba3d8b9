use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use promptmix_core::LibraryValue;

/// Pick one value with probability proportional to weight.
///
/// Walks the candidates subtracting weights from a uniform draw; if
/// floating-point rounding leaves nothing selected, the last candidate is
/// returned rather than erroring. Weights at or below zero never win while
/// any positive weight exists. Returns `None` only for an empty slice.
pub fn pick_weighted<'a>(
    values: &[&'a LibraryValue],
    rng: &mut impl Rng,
) -> Option<&'a LibraryValue> {
    pick_weighted_index(values, rng).map(|index| values[index])
}

fn pick_weighted_index(values: &[&LibraryValue], rng: &mut impl Rng) -> Option<usize> {
    if values.is_empty() {
        return None;
    }

    // Clamp to a finite total: pathological weights may sum to infinity,
    // and `random_range` rejects an unbounded range.
    let total: f64 = values
        .iter()
        .map(|value| value.weight().max(0.0))
        .sum::<f64>()
        .min(f64::MAX);
    if total <= 0.0 {
        // Degenerate all-zero pool: fall back to the last candidate.
        return Some(values.len() - 1);
    }

    let mut remainder = rng.random_range(0.0..total);
    for (index, value) in values.iter().enumerate() {
        remainder -= value.weight().max(0.0);
        if remainder <= 0.0 {
            return Some(index);
        }
    }
    Some(values.len() - 1)
}

/// Repeated weighted picks without replacement.
///
/// Stops at pool exhaustion, so the result never exceeds
/// `min(count, values.len())` and never contains the same candidate twice.
pub fn pick_weighted_many<'a>(
    values: &[&'a LibraryValue],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<&'a LibraryValue> {
    let mut pool: Vec<&LibraryValue> = values.to_vec();
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count {
        let Some(index) = pick_weighted_index(&pool, rng) else {
            break;
        };
        picked.push(pool.swap_remove(index));
    }
    picked
}

/// Values eligible under a linkage category: untagged values are universal,
/// tagged values must carry the target. No target keeps everything.
pub fn filter_by_category<'a>(
    values: &'a [LibraryValue],
    category: Option<&str>,
) -> Vec<&'a LibraryValue> {
    match category {
        None => values.iter().collect(),
        Some(target) => values
            .iter()
            .filter(|value| value.matches_category(target))
            .collect(),
    }
}

/// Uniform choice, used within a category filter where weights do not apply.
pub fn pick_uniform<'a>(
    values: &[&'a LibraryValue],
    rng: &mut impl Rng,
) -> Option<&'a LibraryValue> {
    values.choose(rng).copied()
}

/// Random shuffle-and-slice, capped at the pool size.
pub fn shuffled_prefix<'a>(
    values: &[&'a LibraryValue],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<&'a LibraryValue> {
    let mut pool: Vec<&LibraryValue> = values.to_vec();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn refs(values: &[LibraryValue]) -> Vec<&LibraryValue> {
        values.iter().collect()
    }

    #[test]
    fn empty_pool_yields_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(pick_weighted(&[], &mut rng).is_none());
        assert!(pick_uniform(&[], &mut rng).is_none());
    }

    #[test]
    fn zero_weight_never_wins_against_positive_weight() {
        let values = vec![
            LibraryValue::weighted("never", 0.0),
            LibraryValue::weighted("always", 1.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let picked = pick_weighted(&refs(&values), &mut rng).expect("non-empty pool");
            assert_eq!(picked.text(), "always");
        }
    }

    #[test]
    fn all_zero_pool_falls_back_to_last() {
        let values = vec![
            LibraryValue::weighted("a", 0.0),
            LibraryValue::weighted("b", 0.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picked = pick_weighted(&refs(&values), &mut rng).expect("non-empty pool");
        assert_eq!(picked.text(), "b");
    }

    #[test]
    fn overflowing_weight_sum_still_picks_without_panicking() {
        let values = vec![
            LibraryValue::weighted("huge_a", 1e308),
            LibraryValue::weighted("huge_b", 1e308),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(pick_weighted(&refs(&values), &mut rng).is_some());
        }
    }

    #[test]
    fn weight_one_sampling_is_roughly_uniform() {
        let values: Vec<LibraryValue> = ["a", "b", "c", "d"]
            .iter()
            .map(|text| LibraryValue::plain(*text))
            .collect();
        let pool = refs(&values);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let trials = 20_000;
        let mut counts = std::collections::HashMap::new();
        for _ in 0..trials {
            let picked = pick_weighted(&pool, &mut rng).expect("non-empty pool");
            *counts.entry(picked.text().to_string()).or_insert(0usize) += 1;
        }

        let expected = trials / values.len();
        for (text, count) in counts {
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(
                deviation < 0.1,
                "value {text} drawn {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn pick_many_never_duplicates_and_respects_pool_size() {
        let values: Vec<LibraryValue> = (0..5)
            .map(|index| LibraryValue::plain(format!("v{index}")))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let picked = pick_weighted_many(&refs(&values), 3, &mut rng);
        assert_eq!(picked.len(), 3);
        let unique: std::collections::HashSet<&str> =
            picked.iter().map(|value| value.text()).collect();
        assert_eq!(unique.len(), 3);

        let picked = pick_weighted_many(&refs(&values), 99, &mut rng);
        assert_eq!(picked.len(), values.len());
    }

    #[test]
    fn category_filter_keeps_universal_and_matching_values() {
        let values = vec![
            LibraryValue::plain("universal"),
            LibraryValue::categorized("nature", vec!["自然".to_string()]),
            LibraryValue::categorized("city", vec!["都市".to_string()]),
        ];

        let filtered = filter_by_category(&values, Some("自然"));
        let texts: Vec<&str> = filtered.iter().map(|value| value.text()).collect();
        assert_eq!(texts, vec!["universal", "nature"]);

        assert_eq!(filter_by_category(&values, None).len(), 3);
    }

    #[test]
    fn shuffled_prefix_is_capped_at_pool_size() {
        let values = vec![LibraryValue::plain("a"), LibraryValue::plain("b")];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(shuffled_prefix(&refs(&values), 10, &mut rng).len(), 2);
        assert_eq!(shuffled_prefix(&refs(&values), 1, &mut rng).len(), 1);
    }
}
