use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::secp256k1::Secp256k1;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KeysError;
use crate::keypair::TradeKeypair;
use crate::mnemonic::{generate_mnemonic, parse_mnemonic};

/// BIP-32 path prefix mandated by the protocol. The final path component
/// (appended per call) selects the identity key (0) or a trade key (>=1).
const DERIVATION_PREFIX: &str = "44'/1237'/38383'/0";

const SEED_FILE: &str = "seed";
const STATE_FILE: &str = "keys-state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeysState {
    #[serde(default = "default_next_index")]
    next_trade_index: u32,
    #[serde(default)]
    order_index: HashMap<Uuid, u32>,
}

fn default_next_index() -> u32 {
    1
}

/// Owns the mnemonic seed and the trade-index bookkeeping (§4.A). Identity
/// and trade keys are derived on demand from the cached seed and are never
/// persisted outside the seed file itself.
pub struct KeyHierarchy {
    seed: [u8; 64],
    state: Mutex<KeysState>,
    state_path: PathBuf,
}

impl KeyHierarchy {
    /// Load the seed and cursor from `data_dir`, creating both with a fresh
    /// mnemonic if this is the first run. Returns whether a new identity was
    /// created.
    pub fn load_or_create(data_dir: &Path) -> Result<(Self, bool), KeysError> {
        std::fs::create_dir_all(data_dir)?;
        let seed_path = data_dir.join(SEED_FILE);

        let (phrase, was_new) = if seed_path.exists() {
            (std::fs::read_to_string(&seed_path)?.trim().to_string(), false)
        } else {
            let phrase = generate_mnemonic();
            write_owner_only(&seed_path, phrase.as_bytes())?;
            (phrase, true)
        };

        let mnemonic = parse_mnemonic(&phrase)?;
        let state_path = data_dir.join(STATE_FILE);
        let state = load_state(&state_path)?;

        tracing::debug!(new_identity = was_new, "key hierarchy loaded");

        Ok((
            Self {
                seed: mnemonic.to_seed(""),
                state: Mutex::new(state),
                state_path,
            },
            was_new,
        ))
    }

    /// Replace the identity under `data_dir` with the one encoded by
    /// `phrase`, resetting the trade-index cursor and order map.
    pub fn import(data_dir: &Path, phrase: &str) -> Result<Self, KeysError> {
        let mnemonic = parse_mnemonic(phrase)?;
        std::fs::create_dir_all(data_dir)?;
        write_owner_only(&data_dir.join(SEED_FILE), mnemonic.to_string().as_bytes())?;

        let state_path = data_dir.join(STATE_FILE);
        let state = KeysState::default();
        persist_state(&state_path, &state)?;

        Ok(Self {
            seed: mnemonic.to_seed(""),
            state: Mutex::new(state),
            state_path,
        })
    }

    pub fn identity_keypair(&self) -> TradeKeypair {
        self.derive(0).expect("identity index is always valid")
    }

    pub fn trade_keypair(&self, index: u32) -> Result<TradeKeypair, KeysError> {
        if index < 1 {
            return Err(KeysError::InvalidIndex(index));
        }
        self.derive(index)
    }

    /// Allocate and derive the next unused trade key, atomically advancing
    /// the cursor.
    pub fn next_trade_keypair(&self) -> Result<(TradeKeypair, u32), KeysError> {
        let index = {
            let mut state = self.state.lock().expect("lock poisoned");
            let index = state.next_trade_index.max(1);
            state.next_trade_index = index + 1;
            persist_state(&self.state_path, &state)?;
            index
        };
        let keypair = self.derive(index)?;
        Ok((keypair, index))
    }

    pub fn set_trade_index(&self, next: u32) -> Result<(), KeysError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.next_trade_index = next.max(1);
        persist_state(&self.state_path, &state)
    }

    pub fn current_trade_index(&self) -> u32 {
        self.state.lock().expect("lock poisoned").next_trade_index
    }

    pub fn record_order_index(&self, order_id: Uuid, index: u32) -> Result<(), KeysError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.order_index.insert(order_id, index);
        persist_state(&self.state_path, &state)
    }

    pub fn trade_index_for_order(&self, order_id: &Uuid) -> Option<u32> {
        self.state
            .lock()
            .expect("lock poisoned")
            .order_index
            .get(order_id)
            .copied()
    }

    fn derive(&self, index: u32) -> Result<TradeKeypair, KeysError> {
        let secp = Secp256k1::new();
        let master = Xpriv::new_master(bitcoin::Network::Bitcoin, &self.seed)?;
        let path = DerivationPath::from_str(&format!("{DERIVATION_PREFIX}/{index}"))?;
        let derived = master.derive_priv(&secp, &path)?;
        TradeKeypair::from_private_bytes(index, derived.private_key.secret_bytes())
    }
}

fn load_state(path: &Path) -> Result<KeysState, KeysError> {
    if !path.exists() {
        return Ok(KeysState::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn persist_state(path: &Path, state: &KeysState) -> Result<(), KeysError> {
    let json = serde_json::to_string_pretty(state)?;
    write_owner_only(path, json.as_bytes())
}

fn write_owner_only(path: &Path, contents: &[u8]) -> Result<(), KeysError> {
    std::fs::write(path, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_index_zero_and_trade_index_one_differ() {
        let dir = tempfile::tempdir().unwrap();
        let (hierarchy, was_new) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        assert!(was_new);
        let identity = hierarchy.identity_keypair();
        let trade = hierarchy.trade_keypair(1).unwrap();
        assert_ne!(identity.public, trade.public);
    }

    #[test]
    fn trade_index_zero_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (hierarchy, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        assert!(matches!(
            hierarchy.trade_keypair(0),
            Err(KeysError::InvalidIndex(0))
        ));
    }

    #[test]
    fn derivation_is_deterministic_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let (first, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        let id_a = first.identity_keypair().public;
        let trade_a = first.trade_keypair(1).unwrap().public;
        drop(first);

        let (second, was_new) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        assert!(!was_new);
        assert_eq!(id_a, second.identity_keypair().public);
        assert_eq!(trade_a, second.trade_keypair(1).unwrap().public);
    }

    #[test]
    fn next_trade_keypair_advances_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let (hierarchy, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        assert_eq!(hierarchy.current_trade_index(), 1);
        let (_, idx1) = hierarchy.next_trade_keypair().unwrap();
        let (_, idx2) = hierarchy.next_trade_keypair().unwrap();
        assert_eq!(idx1, 1);
        assert_eq!(idx2, 2);
        assert_eq!(hierarchy.current_trade_index(), 3);
    }

    #[test]
    fn order_index_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let (hierarchy, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        let order_id = Uuid::new_v4();
        assert!(hierarchy.trade_index_for_order(&order_id).is_none());
        hierarchy.record_order_index(order_id, 5).unwrap();
        assert_eq!(hierarchy.trade_index_for_order(&order_id), Some(5));
    }

    #[test]
    fn import_resets_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let (hierarchy, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        hierarchy.next_trade_keypair().unwrap();
        hierarchy.next_trade_keypair().unwrap();
        assert_eq!(hierarchy.current_trade_index(), 3);

        let phrase = generate_mnemonic();
        let reimported = KeyHierarchy::import(dir.path(), &phrase).unwrap();
        assert_eq!(reimported.current_trade_index(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn seed_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let (_hierarchy, _) = KeyHierarchy::load_or_create(dir.path()).unwrap();
        let meta = std::fs::metadata(dir.path().join(SEED_FILE)).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }
}
