use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use super::NamedImage;

/// Uniform random subset of `pool` with at most `count` entries
///
/// Images sharing a name count once, so a draw never repeats an image. A pool
/// smaller than `count` yields every distinct image in random order.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    pool: &[NamedImage],
    count: usize,
    rng: &mut R,
) -> Vec<NamedImage> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<NamedImage> = pool
        .iter()
        .filter(|image| seen.insert(image.name.as_str()))
        .cloned()
        .collect();

    let count = count.min(candidates.len());
    let (chosen, _) = candidates.partial_shuffle(rng, count);
    chosen.to_vec()
}
