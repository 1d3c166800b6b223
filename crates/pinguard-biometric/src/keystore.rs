//! Secure key store contract and a software implementation
//!
//! The fingerprint helper keeps a single named symmetric key in a platform
//! store. The key is created with "authenticate every use" semantics, so the
//! store refuses to hand it out once the device's credentials change (a new
//! fingerprint enrolled, the lock screen disabled).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{KeyGenerationError, KeyStoreError};

/// Key size in bytes
pub const KEY_SIZE: usize = 32;

/// Parameters for the biometric key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    /// Alias the key is stored under
    pub alias: String,
    /// Key usable for encryption
    pub encrypt: bool,
    /// Key usable for decryption
    pub decrypt: bool,
    /// Every use requires a fresh biometric authentication
    pub user_authentication_required: bool,
    /// Key size in bits
    pub key_bits: u32,
}

impl KeySpec {
    /// Encrypt/decrypt key gated by biometric authentication
    pub fn biometric(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            encrypt: true,
            decrypt: true,
            user_authentication_required: true,
            key_bits: (KEY_SIZE * 8) as u32,
        }
    }
}

/// Handle to key material fetched from a store
#[derive(Clone)]
pub struct SecretKey {
    alias: String,
    spec: KeySpec,
    material: Zeroizing<[u8; KEY_SIZE]>,
}

impl SecretKey {
    /// Build a key handle from raw material
    pub fn new(spec: KeySpec, material: [u8; KEY_SIZE]) -> Self {
        Self {
            alias: spec.alias.clone(),
            spec,
            material: Zeroizing::new(material),
        }
    }

    /// Alias the key was stored under
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Spec the key was generated with
    pub fn spec(&self) -> &KeySpec {
        &self.spec
    }

    pub(crate) fn material(&self) -> &[u8; KEY_SIZE] {
        &self.material
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}

/// Platform key store holding authentication-gated keys
pub trait SecureKeyStore {
    /// Load the store contents
    fn load(&mut self) -> Result<(), KeyStoreError>;

    /// Fetch the key stored under `alias`
    fn get_key(&self, alias: &str) -> Result<SecretKey, KeyStoreError>;
}

/// Generator writing new keys into the platform store
pub trait KeyGenerator {
    /// Generate a key per `spec`, replacing any key under the same alias
    fn generate_key(&mut self, spec: &KeySpec) -> Result<(), KeyGenerationError>;
}

/// Source of store and generator handles
pub trait KeyStoreProvider {
    /// Open a handle on the key store
    fn open(&self) -> Result<Box<dyn SecureKeyStore>, KeyStoreError>;

    /// Obtain a key generator bound to the store
    fn key_generator(&self) -> Result<Box<dyn KeyGenerator>, KeyGenerationError>;
}

struct StoredKey {
    spec: KeySpec,
    material: Zeroizing<[u8; KEY_SIZE]>,
}

#[derive(Default)]
struct SoftwareState {
    keys: HashMap<String, StoredKey>,
    lock_screen_disabled: bool,
    fail_next_open: Option<KeyStoreError>,
    fail_next_load: Option<KeyStoreError>,
    generation_failure: Option<KeyGenerationError>,
}

/// In-memory key store
///
/// Keys outlive individual handles, the way platform keys outlive process
/// restarts. Also used to inject store failures in tests.
#[derive(Clone, Default)]
pub struct SoftwareKeyStore {
    state: Rc<RefCell<SoftwareState>>,
}

impl SoftwareKeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a key exists under `alias`
    pub fn contains(&self, alias: &str) -> bool {
        self.state.borrow().keys.contains_key(alias)
    }

    /// Simulate the device lock screen being disabled or reset
    ///
    /// Authentication-gated keys become unrecoverable until it is re-enabled.
    pub fn set_lock_screen_disabled(&self, disabled: bool) {
        self.state.borrow_mut().lock_screen_disabled = disabled;
    }

    /// Fail the next [`KeyStoreProvider::open`] with `err`
    pub fn fail_next_open(&self, err: KeyStoreError) {
        self.state.borrow_mut().fail_next_open = Some(err);
    }

    /// Fail the next [`SecureKeyStore::load`] with `err`
    pub fn fail_next_load(&self, err: KeyStoreError) {
        self.state.borrow_mut().fail_next_load = Some(err);
    }

    /// Make every key generation fail with `err` (or succeed again with `None`)
    pub fn set_generation_failure(&self, err: Option<KeyGenerationError>) {
        self.state.borrow_mut().generation_failure = err;
    }
}

impl SecureKeyStore for SoftwareKeyStore {
    fn load(&mut self) -> Result<(), KeyStoreError> {
        match self.state.borrow_mut().fail_next_load.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn get_key(&self, alias: &str) -> Result<SecretKey, KeyStoreError> {
        let state = self.state.borrow();
        let stored = state
            .keys
            .get(alias)
            .ok_or_else(|| KeyStoreError::KeyNotFound(alias.to_string()))?;

        if stored.spec.user_authentication_required && state.lock_screen_disabled {
            return Err(KeyStoreError::UnrecoverableKey(format!(
                "{}: secure lock screen disabled",
                alias
            )));
        }

        Ok(SecretKey::new(stored.spec.clone(), *stored.material))
    }
}

impl KeyGenerator for SoftwareKeyStore {
    fn generate_key(&mut self, spec: &KeySpec) -> Result<(), KeyGenerationError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.generation_failure.clone() {
            return Err(err);
        }
        if spec.key_bits as usize != KEY_SIZE * 8 {
            return Err(KeyGenerationError::InvalidAlgorithmParameter(format!(
                "unsupported key size {}",
                spec.key_bits
            )));
        }

        let mut material = Zeroizing::new([0u8; KEY_SIZE]);
        rand::rngs::OsRng.fill_bytes(&mut material[..]);
        state.keys.insert(
            spec.alias.clone(),
            StoredKey {
                spec: spec.clone(),
                material,
            },
        );

        debug!("Generated key '{}'", spec.alias);
        Ok(())
    }
}

impl KeyStoreProvider for SoftwareKeyStore {
    fn open(&self) -> Result<Box<dyn SecureKeyStore>, KeyStoreError> {
        if let Some(err) = self.state.borrow_mut().fail_next_open.take() {
            return Err(err);
        }
        Ok(Box::new(self.clone()))
    }

    fn key_generator(&self) -> Result<Box<dyn KeyGenerator>, KeyGenerationError> {
        Ok(Box::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biometric_spec() {
        let spec = KeySpec::biometric("my_key");
        assert!(spec.encrypt && spec.decrypt);
        assert!(spec.user_authentication_required);
        assert_eq!(spec.key_bits, 256);
    }

    #[test]
    fn test_generate_replaces_key() {
        let store = SoftwareKeyStore::new();
        let mut generator = store.key_generator().unwrap();
        let spec = KeySpec::biometric("my_key");

        generator.generate_key(&spec).unwrap();
        let first = *store.get_key("my_key").unwrap().material();
        generator.generate_key(&spec).unwrap();
        let second = *store.get_key("my_key").unwrap().material();

        assert_ne!(first, second);
    }

    #[test]
    fn test_keys_survive_handles() {
        let store = SoftwareKeyStore::new();
        store
            .key_generator()
            .unwrap()
            .generate_key(&KeySpec::biometric("my_key"))
            .unwrap();

        let reopened = store.open().unwrap();
        assert_eq!(reopened.get_key("my_key").unwrap().alias(), "my_key");
    }

    #[test]
    fn test_missing_key() {
        let store = SoftwareKeyStore::new();
        assert!(matches!(
            store.get_key("nope"),
            Err(KeyStoreError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_lock_screen_disabled_makes_key_unrecoverable() {
        let mut store = SoftwareKeyStore::new();
        store.generate_key(&KeySpec::biometric("my_key")).unwrap();
        store.set_lock_screen_disabled(true);

        assert!(matches!(
            store.get_key("my_key"),
            Err(KeyStoreError::UnrecoverableKey(_))
        ));

        store.set_lock_screen_disabled(false);
        assert!(store.get_key("my_key").is_ok());
    }

    #[test]
    fn test_injected_failures_fire_once() {
        let mut store = SoftwareKeyStore::new();
        store.fail_next_load(KeyStoreError::Io("disk".into()));
        assert!(store.load().is_err());
        assert!(store.load().is_ok());

        store.fail_next_open(KeyStoreError::KeyStore("busy".into()));
        assert!(store.open().is_err());
        assert!(store.open().is_ok());
    }

    #[test]
    fn test_invalid_key_size() {
        let mut store = SoftwareKeyStore::new();
        let mut spec = KeySpec::biometric("my_key");
        spec.key_bits = 128;
        assert!(matches!(
            store.generate_key(&spec),
            Err(KeyGenerationError::InvalidAlgorithmParameter(_))
        ));
    }

    #[test]
    fn test_debug_hides_material() {
        let key = SecretKey::new(KeySpec::biometric("my_key"), [7u8; KEY_SIZE]);
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("my_key"));
        assert!(!rendered.contains('7'));
    }
}
