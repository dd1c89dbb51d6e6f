pub mod render;
pub mod respond;

pub use render::render_command;
pub use respond::respond_command;

use rand::SeedableRng;
use rand::rngs::StdRng;

pub(crate) fn draw_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
