//! SHA-1 for SAPISIDHASH signing.
//!
//! With the `native-sha1` feature (default) the RustCrypto `sha1` crate is
//! used; otherwise the in-process implementation below. The backend checks
//! the hash server-side, so both must be bit-exact with FIPS 180-4.

/// Lowercase hex SHA-1 of `input`.
pub fn sha1_hex(input: &str) -> String {
    #[cfg(feature = "native-sha1")]
    {
        use ::sha1::{Digest, Sha1};
        hex::encode(Sha1::digest(input.as_bytes()))
    }
    #[cfg(not(feature = "native-sha1"))]
    {
        sha1_fallback_hex(input)
    }
}

/// Lowercase hex SHA-1 of `input`, always via the in-process implementation.
pub fn sha1_fallback_hex(input: &str) -> String {
    hex::encode(sha1_fallback(input.as_bytes()))
}

fn sha1_fallback(data: &[u8]) -> [u8; 20] {
    let mut h: [u32; 5] = [
        0x6745_2301,
        0xEFCD_AB89,
        0x98BA_DCFE,
        0x1032_5476,
        0xC3D2_E1F0,
    ];

    // Pad: 0x80, zeros to 56 mod 64, then the bit length as big-endian u64.
    let bit_len = (data.len() as u64).wrapping_mul(8);
    let mut msg = data.to_vec();
    msg.push(0x80);
    while msg.len() % 64 != 56 {
        msg.push(0);
    }
    msg.extend_from_slice(&bit_len.to_be_bytes());

    let mut w = [0u32; 80];
    for block in msg.chunks_exact(64) {
        for (slot, word) in w.iter_mut().zip(block.chunks_exact(4)) {
            *slot = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        }
        for i in 16..80 {
            w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
        }

        let [mut a, mut b, mut c, mut d, mut e] = h;
        for (i, &wi) in w.iter().enumerate() {
            let (f, k) = match i {
                0..=19 => ((b & c) | (!b & d), 0x5A82_7999),
                20..=39 => (b ^ c ^ d, 0x6ED9_EBA1),
                40..=59 => ((b & c) | (b & d) | (c & d), 0x8F1B_BCDC),
                _ => (b ^ c ^ d, 0xCA62_C1D6),
            };
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(wi);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        for (state, v) in h.iter_mut().zip([a, b, c, d, e]) {
            *state = state.wrapping_add(v);
        }
    }

    let mut out = [0u8; 20];
    for (bytes, v) in out.chunks_exact_mut(4).zip(h) {
        bytes.copy_from_slice(&v.to_be_bytes());
    }
    out
}
