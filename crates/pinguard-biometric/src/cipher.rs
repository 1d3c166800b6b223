//! Crypto object handed to the biometric prompt
//!
//! The cipher is initialized from the biometric key before the prompt starts.
//! It only becomes usable once the prompt reports a successful match, and then
//! for a single operation, mirroring a key that requires authentication per use.
//!
//! # Ciphertext Format
//!
//! - 12-byte nonce
//! - ChaCha20-Poly1305 ciphertext with the 16-byte tag appended

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;

use crate::error::{CipherError, KeyStoreError};
use crate::keystore::SecretKey;

/// Size of the nonce for ChaCha20-Poly1305
const NONCE_SIZE: usize = 12;

/// Cipher bound to the biometric key
pub struct CryptoObject {
    alias: String,
    cipher: ChaCha20Poly1305,
    authorized: bool,
}

impl CryptoObject {
    /// Initialize an encrypt-mode cipher from `key`
    pub fn init_encrypt(key: &SecretKey) -> Result<Self, KeyStoreError> {
        if !key.spec().encrypt {
            return Err(KeyStoreError::InvalidKey(format!(
                "{} is not an encryption key",
                key.alias()
            )));
        }

        let cipher = ChaCha20Poly1305::new_from_slice(key.material())
            .map_err(|e| KeyStoreError::InvalidKey(e.to_string()))?;

        Ok(Self {
            alias: key.alias().to_string(),
            cipher,
            authorized: false,
        })
    }

    /// Alias of the key behind this cipher
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Whether the next operation is authorized
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Grant one operation; called when the prompt reports a match
    pub fn authorize(&mut self) {
        self.authorized = true;
    }

    /// Encrypt `plaintext`, returning nonce || ciphertext
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.consume_authorization()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CipherError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt data produced by [`encrypt`](Self::encrypt)
    pub fn decrypt(&mut self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.len() < NONCE_SIZE {
            return Err(CipherError::TooShort);
        }
        self.consume_authorization()?;

        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        self.cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|_| CipherError::Decryption)
    }

    fn consume_authorization(&mut self) -> Result<(), CipherError> {
        if !self.authorized {
            return Err(CipherError::NotAuthorized);
        }
        self.authorized = false;
        Ok(())
    }
}

impl fmt::Debug for CryptoObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoObject")
            .field("alias", &self.alias)
            .field("authorized", &self.authorized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::{KeySpec, KEY_SIZE};

    fn crypto() -> CryptoObject {
        let key = SecretKey::new(KeySpec::biometric("my_key"), [0x42; KEY_SIZE]);
        CryptoObject::init_encrypt(&key).unwrap()
    }

    #[test]
    fn test_unauthorized_use_rejected() {
        let mut crypto = crypto();
        assert_eq!(crypto.encrypt(b"secret"), Err(CipherError::NotAuthorized));
    }

    #[test]
    fn test_authorization_is_single_use() {
        let mut crypto = crypto();
        crypto.authorize();
        let sealed = crypto.encrypt(b"secret").unwrap();
        assert!(!crypto.is_authorized());
        assert_eq!(crypto.decrypt(&sealed), Err(CipherError::NotAuthorized));

        crypto.authorize();
        assert_eq!(crypto.decrypt(&sealed).unwrap(), b"secret");
    }

    #[test]
    fn test_tampered_ciphertext() {
        let mut crypto = crypto();
        crypto.authorize();
        let mut sealed = crypto.encrypt(b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xff;

        crypto.authorize();
        assert_eq!(crypto.decrypt(&sealed), Err(CipherError::Decryption));
    }

    #[test]
    fn test_short_input_does_not_consume_authorization() {
        let mut crypto = crypto();
        crypto.authorize();
        assert_eq!(crypto.decrypt(&[0u8; 4]), Err(CipherError::TooShort));
        assert!(crypto.is_authorized());
    }

    #[test]
    fn test_non_encryption_key_rejected() {
        let mut spec = KeySpec::biometric("my_key");
        spec.encrypt = false;
        let key = SecretKey::new(spec, [0x42; KEY_SIZE]);
        assert!(matches!(
            CryptoObject::init_encrypt(&key),
            Err(KeyStoreError::InvalidKey(_))
        ));
    }
}
