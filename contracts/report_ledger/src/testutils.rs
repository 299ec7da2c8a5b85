//! Test doubles: an in-process decryption oracle and a small Paillier keypair.
//!
//! The mock oracle does not decrypt anything. It hands out sequential request
//! ids, remembers what was asked, and accepts a callback proof only when it
//! equals `sha256(secret || request_id_be || cleartexts)`. Tests play the
//! relayer: they read the request back, produce cleartexts, sign them with
//! [`sign_cleartexts`] and call the ledger's callback entry point.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Bytes, BytesN, Env,
    Symbol, Vec,
};

use crate::ciphertext::{PaillierPrivateKey, PaillierPublicKey};

const SECRET: Symbol = symbol_short!("SECRET");
const NEXT_ID: Symbol = symbol_short!("NEXT_ID");
const REFUSE: Symbol = symbol_short!("REFUSE");

fn request_key(request_id: u64) -> (Symbol, u64) {
    (symbol_short!("ORQ"), request_id)
}

/// p = 293, q = 433. Small enough to factor by hand; see [`crate::ciphertext::MAX_MODULUS`].
pub fn counter_keypair() -> (PaillierPublicKey, PaillierPrivateKey) {
    let n = 126_869i128;
    (
        PaillierPublicKey {
            n,
            nn: n * n,
            g: n + 1,
        },
        PaillierPrivateKey {
            lambda: 126_144,
            mu: 105_695,
        },
    )
}

pub fn sign_cleartexts(env: &Env, secret: &BytesN<32>, request_id: u64, cleartexts: &Bytes) -> Bytes {
    let mut message = Bytes::from_array(env, &secret.to_array());
    message.extend_from_array(&request_id.to_be_bytes());
    message.append(cleartexts);
    let digest: BytesN<32> = env.crypto().sha256(&message).into();
    Bytes::from_array(env, &digest.to_array())
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OracleRequest {
    pub handles: Vec<Bytes>,
    pub callback: Address,
    pub callback_fn: Symbol,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockOracleError {
    Refused = 1,
}

#[contract]
pub struct MockDecryptionOracle;

#[contractimpl]
impl MockDecryptionOracle {
    pub fn init(env: Env, secret: BytesN<32>) {
        env.storage().instance().set(&SECRET, &secret);
    }

    pub fn request_decryption(
        env: Env,
        handles: Vec<Bytes>,
        callback: Address,
        callback_fn: Symbol,
    ) -> Result<u64, MockOracleError> {
        if env.storage().instance().get(&REFUSE).unwrap_or(false) {
            return Err(MockOracleError::Refused);
        }

        let request_id: u64 = env.storage().instance().get(&NEXT_ID).unwrap_or(1);
        env.storage().instance().set(&NEXT_ID, &(request_id + 1));
        env.storage().instance().set(
            &request_key(request_id),
            &OracleRequest {
                handles,
                callback,
                callback_fn,
            },
        );
        Ok(request_id)
    }

    pub fn verify_decryption(env: Env, request_id: u64, cleartexts: Bytes, proof: Bytes) -> bool {
        let secret: Option<BytesN<32>> = env.storage().instance().get(&SECRET);
        match secret {
            Some(secret) => proof == sign_cleartexts(&env, &secret, request_id, &cleartexts),
            None => false,
        }
    }

    pub fn get_request(env: Env, request_id: u64) -> Option<OracleRequest> {
        env.storage().instance().get(&request_key(request_id))
    }

    /// Force the id handed out by the next request.
    pub fn set_next_id(env: Env, request_id: u64) {
        env.storage().instance().set(&NEXT_ID, &request_id);
    }

    pub fn set_refuse(env: Env, refuse: bool) {
        env.storage().instance().set(&REFUSE, &refuse);
    }
}
