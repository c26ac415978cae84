#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::IVec3;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Observer positions within a few hundred blocks of spawn, with uniform headings.
pub fn random_sightings(count: usize, seed: u64) -> Vec<(IVec3, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let x = (unit(&mut rng) * 600.0 - 300.0) as i32;
            let z = (unit(&mut rng) * 600.0 - 300.0) as i32;
            let heading = unit(&mut rng) * 360.0;
            (IVec3::new(x, 70, z), heading)
        })
        .collect()
}

fn unit(rng: &mut StdRng) -> f64 {
    rng.next_u32() as f64 / u32::MAX as f64
}
