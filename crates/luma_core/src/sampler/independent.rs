use super::{pixel_stream, Pcg32, Sampler};
use luma_math::UVec2;

/// Uniformly distributed, stochastically independent random numbers.
///
/// The simplest sampler; every draw comes straight from a PCG32 stream. The
/// pixel seeding derives a fresh stream from the pixel coordinate so that
/// neighbouring pixels are uncorrelated.
#[derive(Debug, Clone)]
pub struct Independent {
    base_seed: u64,
    samples_per_pixel: u32,
    pcg: Pcg32,
}

impl Independent {
    pub fn new(samples_per_pixel: u32, base_seed: u64) -> Self {
        Self {
            base_seed,
            samples_per_pixel,
            pcg: Pcg32::default(),
        }
    }
}

impl Sampler for Independent {
    fn next(&mut self) -> f32 {
        self.pcg.next_f32()
    }

    fn seed_sample(&mut self, sample_index: u64) {
        self.pcg.seed(self.base_seed, sample_index);
    }

    fn seed_pixel(&mut self, pixel: UVec2, sample_index: u64) {
        // derive a stream from the pixel, then re-seed with a draw from it so
        // the sample index selects uncorrelated sequences
        self.pcg.seed(self.base_seed, pixel_stream(pixel));
        let pixel_hash = self.pcg.next_u32() as u64;
        self.pcg.seed(pixel_hash, sample_index);
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    fn clone_sampler(&self) -> Box<dyn Sampler> {
        Box::new(self.clone())
    }
}
