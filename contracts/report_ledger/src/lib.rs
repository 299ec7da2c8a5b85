//! Encrypted report ledger.
//!
//! Reports are stored as opaque ciphertext handles. A report's plaintext only
//! appears after a two-phase exchange with an external decryption oracle:
//! the ledger forwards the handles, and the oracle later calls back with the
//! cleartext and a proof that the ledger checks before writing anything.
//! Each reveal bumps an encrypted per-category counter which can itself be
//! decrypted through the same protocol.
//!
//! Error codes follow the range convention used across the contract suite:
//!
//! | Range   | Purpose                        |
//! |---------|--------------------------------|
//! | 1 – 9   | Lifecycle / initialisation     |
//! | 10 – 19 | Authorisation                  |
//! | 20 – 29 | Lookup misses                  |
//! | 30 – 39 | Validation / decoding          |
//! | 40 – 49 | Report / oracle state          |

#![no_std]

pub mod access;
pub mod aggregator;
pub mod ciphertext;
pub mod codec;
pub mod coordinator;
pub mod events;
pub mod registry;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;


use soroban_sdk::{contract, contractimpl, contracttype, Address, Bytes, BytesN, Env, String, Vec};

pub use ciphertext::PaillierPublicKey;

/// Encrypted half of a report. Immutable once stored.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedRecord {
    pub id: u64,
    pub title: BytesN<32>,
    pub body: BytesN<32>,
    pub category: BytesN<32>,
    pub submitter: Address,
    pub created_at: u64,
}

/// Plaintext shell of a report. Empty until the oracle reveals it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlainRecord {
    pub title: String,
    pub body: String,
    pub category: String,
    pub revealed: bool,
}

impl PlainRecord {
    pub fn empty(env: &Env) -> Self {
        Self {
            title: String::from_str(env, ""),
            body: String::from_str(env, ""),
            category: String::from_str(env, ""),
            revealed: false,
        }
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ReportStatus {
    Submitted = 0,
    DecryptionRequested = 1,
    Revealed = 2,
}

/// What an outstanding oracle request will reveal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecryptionTarget {
    Report(u64),
    Category(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingRequest {
    pub target: DecryptionTarget,
    pub requester: Address,
    pub requested_at: u64,
    pub consumed: bool,
}

/// Running count for one category, encrypted under the ledger's counter key.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedCounter {
    pub ciphertext: i128,
    pub initialized: bool,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum LedgerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    /// Operator rotation to the null account.
    ZeroAddress = 11,
    ReportNotFound = 20,
    /// No known category hashes to the requested value.
    NotFound = 21,
    UnknownCategory = 22,
    /// Unknown, consumed or mistyped request id, or a proof the oracle rejected.
    InvalidRequest = 30,
    DecodeError = 31,
    LengthMismatch = 32,
    InvalidKey = 33,
    AlreadyRevealed = 40,
    OracleRequestFailed = 41,
}

#[contract]
pub struct ReportLedgerContract;

#[contractimpl]
impl ReportLedgerContract {
    /// Initialize the ledger with its operator, decryption oracle and the
    /// public key used for category counters.
    pub fn initialize(
        env: Env,
        operator: Address,
        oracle: Address,
        counter_key: PaillierPublicKey,
    ) -> Result<(), LedgerError> {
        if access::get_operator(&env).is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }
        if !ciphertext::HomomorphicEngine::is_valid_key(&counter_key) {
            return Err(LedgerError::InvalidKey);
        }

        access::set_initial_operator(&env, &operator);
        coordinator::set_oracle(&env, &oracle);
        aggregator::set_counter_key(&env, &counter_key);

        events::publish_initialized(&env, operator, oracle);

        Ok(())
    }

    pub fn is_initialized(env: Env) -> bool {
        access::get_operator(&env).is_some()
    }

    pub fn get_operator(env: Env) -> Result<Address, LedgerError> {
        access::get_operator(&env).ok_or(LedgerError::NotInitialized)
    }

    pub fn get_oracle(env: Env) -> Result<Address, LedgerError> {
        coordinator::get_oracle(&env).ok_or(LedgerError::NotInitialized)
    }

    pub fn get_counter_key(env: Env) -> Result<PaillierPublicKey, LedgerError> {
        aggregator::get_counter_key(&env).ok_or(LedgerError::NotInitialized)
    }

    pub fn set_operator(
        env: Env,
        caller: Address,
        new_operator: Address,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        access::set_operator(&env, &caller, new_operator)
    }

    // ── Registry ─────────────────────────────────────────────────────────────

    /// Store an encrypted report and return its id.
    pub fn submit(
        env: Env,
        submitter: Address,
        title: BytesN<32>,
        body: BytesN<32>,
        category: BytesN<32>,
    ) -> Result<u64, LedgerError> {
        Self::require_initialized(&env)?;
        submitter.require_auth();
        Ok(registry::submit(&env, &submitter, title, body, category))
    }

    /// Store several reports in input order. Nothing is stored when the
    /// three vectors differ in length.
    pub fn submit_batch(
        env: Env,
        submitter: Address,
        titles: Vec<BytesN<32>>,
        bodies: Vec<BytesN<32>>,
        categories: Vec<BytesN<32>>,
    ) -> Result<Vec<u64>, LedgerError> {
        Self::require_initialized(&env)?;
        submitter.require_auth();
        registry::submit_batch(&env, &submitter, titles, bodies, categories)
    }

    pub fn view_plain(env: Env, report_id: u64) -> PlainRecord {
        registry::view_plain(&env, report_id)
    }

    pub fn get_encrypted_record(env: Env, report_id: u64) -> Result<EncryptedRecord, LedgerError> {
        registry::get_encrypted(&env, report_id).ok_or(LedgerError::ReportNotFound)
    }

    pub fn get_report_status(env: Env, report_id: u64) -> Result<ReportStatus, LedgerError> {
        registry::get_status(&env, report_id).ok_or(LedgerError::ReportNotFound)
    }

    pub fn report_count(env: Env) -> u64 {
        registry::report_count(&env)
    }

    // ── Decryption ───────────────────────────────────────────────────────────

    /// Ask the oracle to decrypt a report. Returns the oracle's request id.
    pub fn request_decryption(
        env: Env,
        caller: Address,
        report_id: u64,
    ) -> Result<u64, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        coordinator::request_decryption(&env, &caller, report_id)
    }

    /// Oracle callback for report decryption.
    pub fn handle_decryption_callback(
        env: Env,
        request_id: u64,
        cleartexts: Bytes,
        proof: Bytes,
    ) -> Result<(), LedgerError> {
        Self::require_initialized(&env)?;
        coordinator::handle_decryption_callback(&env, request_id, cleartexts, proof)
    }

    pub fn get_pending_request(env: Env, request_id: u64) -> Option<PendingRequest> {
        coordinator::get_pending(&env, request_id)
    }

    // ── Category counters ────────────────────────────────────────────────────

    pub fn get_encrypted_count(env: Env, category: String) -> EncryptedCounter {
        aggregator::get_encrypted_count(&env, &category)
    }

    pub fn request_count_decryption(
        env: Env,
        caller: Address,
        category: String,
    ) -> Result<u64, LedgerError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        aggregator::request_count_decryption(&env, &caller, &category)
    }

    /// Oracle callback for counter decryption. Returns the decrypted count.
    pub fn handle_count_decryption_callback(
        env: Env,
        request_id: u64,
        cleartexts: Bytes,
        proof: Bytes,
    ) -> Result<u64, LedgerError> {
        Self::require_initialized(&env)?;
        aggregator::handle_count_decryption_callback(&env, request_id, cleartexts, proof)
    }

    pub fn category_from_hash(env: Env, category_hash: BytesN<32>) -> Result<String, LedgerError> {
        aggregator::category_from_hash(&env, &category_hash)
    }

    pub fn list_categories(env: Env) -> Vec<String> {
        aggregator::list_categories(&env)
    }

    pub fn category_hash(env: Env, category: String) -> BytesN<32> {
        aggregator::category_hash(&env, &category)
    }

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if access::get_operator(env).is_none() {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }
}
