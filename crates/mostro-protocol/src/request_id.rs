use rand::Rng;

/// 48-bit opaque correlation token, regenerated per outgoing request.
pub fn generate_request_id() -> u64 {
    rand::rng().random::<u64>() & 0x0000_FFFF_FFFF_FFFF
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_in_48_bits() {
        for _ in 0..1000 {
            assert!(generate_request_id() <= 0x0000_FFFF_FFFF_FFFF);
        }
    }
}
