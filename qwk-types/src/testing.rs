//! Utilities for testing.

use crate::codec::Encode;

/// Encodes `object` and asserts the result equals `expected`.
pub fn known_answer_test_encode<O>((object, expected): (O, &[u8]))
where
    O: Encode,
{
    let got = object.encode_detached().unwrap();
    assert_eq!(
        expected,
        got,
        "expected {:?}, got {:?}",
        crate::utils::escape_byte_string(expected),
        crate::utils::escape_byte_string(&got),
    );
}
