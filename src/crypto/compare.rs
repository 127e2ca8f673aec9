use subtle::ConstantTimeEq;

/// Compare two derived hashes without an early exit.
///
/// Equal-length inputs are examined byte for byte over their full length.
/// Lengths are fixed by policy and therefore not secret, so a length mismatch
/// is rejected straight away.
pub fn hashes_equal(candidate: &[u8], expected: &[u8]) -> bool {
    if candidate.len() != expected.len() {
        return false;
    }
    candidate.ct_eq(expected).into()
}
