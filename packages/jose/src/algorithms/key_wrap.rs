//! AES Key Wrap (RFC 3394) for the A*KW and ECDH-ES+A*KW algorithms

use super::block::AesKey;
use super::utils::constant_time_eq;
use crate::error::{JoseError, JoseResult};
use aes::Block;
use zeroize::Zeroizing;

const DEFAULT_IV: [u8; 8] = [0xA6; 8];

fn xor_counter(a: &mut [u8; 8], t: u64) {
    for (byte, counter) in a.iter_mut().zip(t.to_be_bytes()) {
        *byte ^= counter;
    }
}

/// Wrap `key_data` (a multiple of 8 bytes, at least 16) under `kek`.
pub(crate) fn wrap(kek: &[u8], key_data: &[u8]) -> JoseResult<Vec<u8>> {
    if key_data.len() % 8 != 0 || key_data.len() < 16 {
        return Err(JoseError::invalid_key("key data to wrap must be 64-bit blocks, at least two"));
    }
    let cipher = AesKey::new(kek)?;
    let n = key_data.len() / 8;
    let mut a = DEFAULT_IV;
    let mut r = Zeroizing::new(key_data.to_vec());
    let mut block = Block::default();

    for j in 0..6 {
        for i in 0..n {
            let ri = &mut r[i * 8..i * 8 + 8];
            block[..8].copy_from_slice(&a);
            block[8..].copy_from_slice(ri);
            cipher.encrypt(&mut block);
            a.copy_from_slice(&block[..8]);
            xor_counter(&mut a, (n * j + i + 1) as u64);
            ri.copy_from_slice(&block[8..]);
        }
    }

    let mut wrapped = Vec::with_capacity(8 + r.len());
    wrapped.extend_from_slice(&a);
    wrapped.extend_from_slice(&r);
    Ok(wrapped)
}

/// Unwrap `wrapped` under `kek`; an integrity check failure is
/// [`JoseError::DecryptionFailed`].
pub(crate) fn unwrap(kek: &[u8], wrapped: &[u8]) -> JoseResult<Zeroizing<Vec<u8>>> {
    if wrapped.len() % 8 != 0 || wrapped.len() < 24 {
        return Err(JoseError::DecryptionFailed);
    }
    let cipher = AesKey::new(kek)?;
    let n = wrapped.len() / 8 - 1;
    let mut a = [0u8; 8];
    a.copy_from_slice(&wrapped[..8]);
    let mut r = Zeroizing::new(wrapped[8..].to_vec());
    let mut block = Block::default();

    for j in (0..6).rev() {
        for i in (0..n).rev() {
            let ri = &mut r[i * 8..i * 8 + 8];
            xor_counter(&mut a, (n * j + i + 1) as u64);
            block[..8].copy_from_slice(&a);
            block[8..].copy_from_slice(ri);
            cipher.decrypt(&mut block);
            a.copy_from_slice(&block[..8]);
            ri.copy_from_slice(&block[8..]);
        }
    }

    if !constant_time_eq(&a, &DEFAULT_IV) {
        return Err(JoseError::DecryptionFailed);
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // RFC 3394 §4.1
    #[test]
    fn wrap_128_bit_key_with_128_bit_kek() {
        let kek = hex!("000102030405060708090A0B0C0D0E0F");
        let key = hex!("00112233445566778899AABBCCDDEEFF");
        let expected = hex!("1FA68B0A8112B447 AEF34BD8FB5A7B82 9D3E862371D2CFE5");

        let wrapped = wrap(&kek, &key).unwrap_or_default();
        assert_eq!(wrapped, expected);
        let unwrapped = unwrap(&kek, &wrapped).map(|k| k.to_vec()).unwrap_or_default();
        assert_eq!(unwrapped, key);
    }

    // RFC 3394 §4.6
    #[test]
    fn wrap_256_bit_key_with_256_bit_kek() {
        let kek = hex!("000102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F");
        let key = hex!("00112233445566778899AABBCCDDEEFF000102030405060708090A0B0C0D0E0F");
        let expected = hex!(
            "28C9F404C4B810F4 CBCCB35CFB87F826 3F5786E2D80ED326 CBC7F0E71A99F43B FB988B9B7A02DD21"
        );

        let wrapped = wrap(&kek, &key).unwrap_or_default();
        assert_eq!(wrapped, expected);
    }

    #[test]
    fn corrupted_wrap_fails_integrity_check() {
        let kek = [1u8; 16];
        let mut wrapped = wrap(&kek, &[2u8; 32]).unwrap_or_default();
        wrapped[5] ^= 0x01;
        assert!(matches!(unwrap(&kek, &wrapped), Err(JoseError::DecryptionFailed)));
    }

    #[test]
    fn rejects_odd_key_data() {
        assert!(matches!(wrap(&[0u8; 16], &[0u8; 12]), Err(JoseError::InvalidKey(_))));
    }
}
