//! Encrypted per-category counters.
//!
//! Counters are keyed by `sha256(category)` and updated in the ciphertext
//! domain only: a reveal multiplies in a fresh `Enc(1)`. Reading a count in
//! the clear goes through the same oracle request/callback path as reports.

use soroban_sdk::{symbol_short, Address, Bytes, BytesN, Env, String, Symbol, Vec};

use crate::ciphertext::{HomomorphicEngine, PaillierPublicKey};
use crate::coordinator::{self, COUNT_CALLBACK};
use crate::registry::{TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::{codec, events, DecryptionTarget, EncryptedCounter, LedgerError};

const COUNTER_KEY: Symbol = symbol_short!("CNT_KEY");
const CATEGORY_COUNT: Symbol = symbol_short!("CAT_CNT");

/// One persistent entry per category, indexed in first-seen order.
fn category_key(index: u32) -> (Symbol, u32) {
    (symbol_short!("CATS"), index)
}

fn counter_key(category_hash: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (symbol_short!("COUNTER"), category_hash.clone())
}

pub fn category_hash(env: &Env, category: &String) -> BytesN<32> {
    env.crypto().sha256(&category.to_bytes()).into()
}

pub(crate) fn set_counter_key(env: &Env, key: &PaillierPublicKey) {
    env.storage().instance().set(&COUNTER_KEY, key);
}

pub fn get_counter_key(env: &Env) -> Option<PaillierPublicKey> {
    env.storage().instance().get(&COUNTER_KEY)
}

fn load_counter(env: &Env, category_hash: &BytesN<32>) -> Option<EncryptedCounter> {
    env.storage().persistent().get(&counter_key(category_hash))
}

fn store_counter(env: &Env, category_hash: &BytesN<32>, counter: &EncryptedCounter) {
    let key = counter_key(category_hash);
    env.storage().persistent().set(&key, counter);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Count one more revealed report under `category`, creating its counter on
/// first sight.
pub(crate) fn on_category_revealed(env: &Env, key: &PaillierPublicKey, category: &String) {
    let hash = category_hash(env, category);

    let counter = match load_counter(env, &hash) {
        Some(counter) => counter,
        None => {
            append_category(env, category);

            events::publish_counter_initialized(env, category.clone(), hash.clone());

            EncryptedCounter {
                ciphertext: HomomorphicEngine::encrypt_zero(env, key),
                initialized: true,
            }
        }
    };

    let one = HomomorphicEngine::encrypt_one(env, key);
    store_counter(
        env,
        &hash,
        &EncryptedCounter {
            ciphertext: HomomorphicEngine::add_ciphertexts(key, counter.ciphertext, one),
            initialized: true,
        },
    );
}

/// Encrypted count for `category`; `initialized` is false if the category
/// has never been revealed.
pub fn get_encrypted_count(env: &Env, category: &String) -> EncryptedCounter {
    load_counter(env, &category_hash(env, category)).unwrap_or(EncryptedCounter {
        ciphertext: 0,
        initialized: false,
    })
}

pub fn request_count_decryption(
    env: &Env,
    caller: &Address,
    category: &String,
) -> Result<u64, LedgerError> {
    let hash = category_hash(env, category);
    let counter = load_counter(env, &hash).ok_or(LedgerError::UnknownCategory)?;

    let mut handles: Vec<Bytes> = Vec::new(env);
    handles.push_back(HomomorphicEngine::to_transport(env, counter.ciphertext));

    let request_id = coordinator::dispatch(
        env,
        handles,
        COUNT_CALLBACK,
        DecryptionTarget::Category(hash.clone()),
        caller,
    )?;

    events::publish_count_requested(env, hash, request_id, caller.clone());

    Ok(request_id)
}

pub fn handle_count_decryption_callback(
    env: &Env,
    request_id: u64,
    cleartexts: Bytes,
    proof: Bytes,
) -> Result<u64, LedgerError> {
    let pending = coordinator::open_request(env, request_id)?;
    let hash = match &pending.target {
        DecryptionTarget::Category(hash) => hash.clone(),
        DecryptionTarget::Report(_) => return Err(LedgerError::InvalidRequest),
    };

    coordinator::verify_proof(env, request_id, &cleartexts, &proof)?;

    let count = codec::decode_count(&cleartexts)?;
    let category = category_from_hash(env, &hash)?;

    coordinator::consume(env, request_id, pending);
    events::publish_count_decrypted(env, category, hash, request_id, count);

    Ok(count)
}

/// Reverse lookup over known categories. Linear, which is fine for the tens
/// of categories a ledger is expected to hold.
pub fn category_from_hash(env: &Env, target: &BytesN<32>) -> Result<String, LedgerError> {
    (0..category_count(env))
        .filter_map(|index| load_category(env, index))
        .find(|category| category_hash(env, category) == *target)
        .ok_or(LedgerError::NotFound)
}

/// Known categories in the order they were first revealed.
pub fn list_categories(env: &Env) -> Vec<String> {
    let mut categories = Vec::new(env);
    for index in 0..category_count(env) {
        if let Some(category) = load_category(env, index) {
            categories.push_back(category);
        }
    }
    categories
}

fn category_count(env: &Env) -> u32 {
    env.storage().instance().get(&CATEGORY_COUNT).unwrap_or(0)
}

fn load_category(env: &Env, index: u32) -> Option<String> {
    env.storage().persistent().get(&category_key(index))
}

#[allow(clippy::arithmetic_side_effects)]
fn append_category(env: &Env, category: &String) {
    let index = category_count(env);
    let key = category_key(index);
    env.storage().persistent().set(&key, category);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage().instance().set(&CATEGORY_COUNT, &(index + 1));
}
