use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Weakest and strongest signal a simulated radio reports, in dBm.
pub const SIGNAL_FLOOR: i32 = -95;
pub const SIGNAL_CEILING: i32 = -20;

/// Picks a base signal the way distance would: a few very close access
/// points, a band of nearby ones, and a long tail of far ones.
pub fn base_signal<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    let distance_factor: f64 = rng.random_range(0.1..1.0);
    let base = if distance_factor < 0.2 {
        -30
    } else if distance_factor < 0.5 {
        -50
    } else {
        -70
    };

    (base + rng.random_range(-15..=5)).clamp(SIGNAL_FLOOR, SIGNAL_CEILING)
}

/// Adds multipath fading to a base signal.
pub fn fluctuate_signal<R: Rng + ?Sized>(rng: &mut R, base: i32, std_dev: f64) -> i32 {
    let noise = match Normal::new(0.0, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => 0.0,
    };

    (base as f64 + noise).round().clamp(SIGNAL_FLOOR as f64, SIGNAL_CEILING as f64) as i32
}

/// Roulette-wheel selection over `(item, weight)` pairs.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, choices: &'a [(T, f64)]) -> &'a T {
    let total: f64 = choices.iter().map(|(_, weight)| weight).sum();
    let mut target = rng.random_range(0.0..total);

    for (item, weight) in choices {
        if target < *weight {
            return item;
        }
        target -= weight;
    }

    &choices[choices.len() - 1].0
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_signals_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let base = base_signal(&mut rng);
            assert!((SIGNAL_FLOOR..=SIGNAL_CEILING).contains(&base));

            let noisy = fluctuate_signal(&mut rng, base, 4.0);
            assert!((SIGNAL_FLOOR..=SIGNAL_CEILING).contains(&noisy));
        }
    }

    #[test]
    fn test_weighted_choice_respects_zero_weight() {
        let mut rng = StdRng::seed_from_u64(11);
        let choices = [("never", 0.0), ("always", 1.0)];
        for _ in 0..100 {
            assert_eq!(*weighted_choice(&mut rng, &choices), "always");
        }
    }
}
