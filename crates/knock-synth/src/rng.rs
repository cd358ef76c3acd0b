//! Deterministic RNG using PCG32 with BLAKE3 seed derivation.
//!
//! Every source of randomness in the engine flows through this module. Seeds
//! for independent components (noise residuals, layers, the optimizer's
//! search stream) are derived by hashing the base seed together with a key,
//! so adding a consumer never shifts the stream another consumer reads.

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Creates a PCG32 generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Derives an independent seed for a named component.
///
/// Hashes the base seed (little-endian) concatenated with the key bytes and
/// truncates the BLAKE3 digest to 64 bits.
pub fn derive_component_seed(base_seed: u64, key: &str) -> u64 {
    let mut input = Vec::with_capacity(8 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let bytes: [u8; 8] = hash.as_bytes()[0..8].try_into().unwrap();
    u64::from_le_bytes(bytes)
}

/// Derives an independent seed for an indexed layer.
pub fn derive_layer_seed(base_seed: u64, layer_index: u32) -> u64 {
    let mut input = Vec::with_capacity(12);
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&layer_index.to_le_bytes());

    let hash = blake3::hash(&input);
    let bytes: [u8; 8] = hash.as_bytes()[0..8].try_into().unwrap();
    u64::from_le_bytes(bytes)
}
