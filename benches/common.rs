use ridgeline::tools::{Singularity, synthetic_print};

/// Deterministic grid of alternating singularities over a `width` × `height` print.
pub fn fixture_print(width: usize, height: usize) -> Vec<u8> {
    let mut singularities = Vec::new();
    let step = 56.0;
    let mut charge = 1.0;
    let mut y = 48.0;
    while y < height as f32 - 40.0 {
        let mut x = 40.0 + (y / step) % 2.0 * 20.0;
        while x < width as f32 - 40.0 {
            singularities.push(Singularity::new(x, y, charge));
            charge = -charge;
            x += step;
        }
        y += step;
    }
    synthetic_print(width, height, 9.0, &singularities)
}
