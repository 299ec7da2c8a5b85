//! Request/callback bookkeeping for the external decryption oracle.
//!
//! A request forwards ciphertext handles to the oracle and records the
//! request id it hands back. The oracle answers later, in any order or not
//! at all, by invoking a callback entry point with the cleartexts and a
//! proof. Every callback is checked against the pending table and verified
//! by the oracle before anything is written, and each request id can be
//! applied once.

use soroban_sdk::{contractclient, symbol_short, Address, Bytes, Env, Symbol, Vec};

use crate::registry::{TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::{
    aggregator, ciphertext, codec, events, registry, DecryptionTarget, LedgerError, PendingRequest,
    PlainRecord, ReportStatus,
};

const ORACLE: Symbol = symbol_short!("ORACLE");

pub const REVEAL_CALLBACK: &str = "handle_decryption_callback";
pub const COUNT_CALLBACK: &str = "handle_count_decryption_callback";

/// Interface the decryption oracle contract exposes to the ledger.
#[contractclient(name = "DecryptionOracleClient")]
pub trait DecryptionOracle {
    /// Queue `handles` for decryption. The oracle later invokes
    /// `callback_fn` on `callback` with `(request_id, cleartexts, proof)`.
    fn request_decryption(env: Env, handles: Vec<Bytes>, callback: Address, callback_fn: Symbol) -> u64;

    /// True when `proof` binds `cleartexts` to `request_id`.
    fn verify_decryption(env: Env, request_id: u64, cleartexts: Bytes, proof: Bytes) -> bool;
}

fn pending_key(request_id: u64) -> (Symbol, u64) {
    (symbol_short!("PENDING"), request_id)
}

pub(crate) fn set_oracle(env: &Env, oracle: &Address) {
    env.storage().instance().set(&ORACLE, oracle);
}

pub fn get_oracle(env: &Env) -> Option<Address> {
    env.storage().instance().get(&ORACLE)
}

pub fn get_pending(env: &Env, request_id: u64) -> Option<PendingRequest> {
    env.storage().persistent().get(&pending_key(request_id))
}

fn put_pending(env: &Env, request_id: u64, pending: &PendingRequest) {
    let key = pending_key(request_id);
    env.storage().persistent().set(&key, pending);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Send `handles` to the oracle and record the request it issues.
pub(crate) fn dispatch(
    env: &Env,
    handles: Vec<Bytes>,
    callback_fn: &str,
    target: DecryptionTarget,
    requester: &Address,
) -> Result<u64, LedgerError> {
    let oracle = get_oracle(env).ok_or(LedgerError::NotInitialized)?;
    let client = DecryptionOracleClient::new(env, &oracle);

    let request_id = match client.try_request_decryption(
        &handles,
        &env.current_contract_address(),
        &Symbol::new(env, callback_fn),
    ) {
        Ok(Ok(id)) => id,
        _ => return Err(LedgerError::OracleRequestFailed),
    };

    // An id the oracle has issued before can never be registered again.
    if get_pending(env, request_id).is_some() {
        return Err(LedgerError::InvalidRequest);
    }

    put_pending(
        env,
        request_id,
        &PendingRequest {
            target,
            requester: requester.clone(),
            requested_at: env.ledger().timestamp(),
            consumed: false,
        },
    );

    Ok(request_id)
}

/// Load an unconsumed pending request.
pub(crate) fn open_request(env: &Env, request_id: u64) -> Result<PendingRequest, LedgerError> {
    match get_pending(env, request_id) {
        Some(pending) if !pending.consumed => Ok(pending),
        _ => Err(LedgerError::InvalidRequest),
    }
}

/// Ask the oracle whether `proof` binds `cleartexts` to `request_id`.
pub(crate) fn verify_proof(
    env: &Env,
    request_id: u64,
    cleartexts: &Bytes,
    proof: &Bytes,
) -> Result<(), LedgerError> {
    let oracle = get_oracle(env).ok_or(LedgerError::NotInitialized)?;
    let client = DecryptionOracleClient::new(env, &oracle);

    match client.try_verify_decryption(&request_id, cleartexts, proof) {
        Ok(Ok(true)) => Ok(()),
        _ => Err(LedgerError::InvalidRequest), // rejected proofs consume nothing
    }
}

pub(crate) fn consume(env: &Env, request_id: u64, mut pending: PendingRequest) {
    pending.consumed = true;
    put_pending(env, request_id, &pending);
}

pub fn request_decryption(env: &Env, caller: &Address, report_id: u64) -> Result<u64, LedgerError> {
    let record = registry::get_encrypted(env, report_id).ok_or(LedgerError::ReportNotFound)?;
    if registry::view_plain(env, report_id).revealed {
        return Err(LedgerError::AlreadyRevealed);
    }

    let mut handles = Vec::new(env);
    handles.push_back(ciphertext::handle_to_transport(env, &record.title));
    handles.push_back(ciphertext::handle_to_transport(env, &record.body));
    handles.push_back(ciphertext::handle_to_transport(env, &record.category));

    let request_id = dispatch(
        env,
        handles,
        REVEAL_CALLBACK,
        DecryptionTarget::Report(report_id),
        caller,
    )?;
    registry::set_status(env, report_id, ReportStatus::DecryptionRequested);

    events::publish_decryption_requested(env, report_id, request_id, caller.clone());

    Ok(request_id)
}

pub fn handle_decryption_callback(
    env: &Env,
    request_id: u64,
    cleartexts: Bytes,
    proof: Bytes,
) -> Result<(), LedgerError> {
    let pending = open_request(env, request_id)?;
    let report_id = match &pending.target {
        DecryptionTarget::Report(id) => *id,
        DecryptionTarget::Category(_) => return Err(LedgerError::InvalidRequest),
    };

    verify_proof(env, request_id, &cleartexts, &proof)?;

    // A second request for the same report may still be pending after the
    // first one revealed it.
    if registry::view_plain(env, report_id).revealed {
        return Err(LedgerError::AlreadyRevealed);
    }

    let fields = codec::decode_report(env, &cleartexts)?;
    let counter_key = aggregator::get_counter_key(env).ok_or(LedgerError::NotInitialized)?;

    registry::write_plain(
        env,
        report_id,
        &PlainRecord {
            title: fields.title,
            body: fields.body,
            category: fields.category.clone(),
            revealed: true,
        },
    );
    registry::set_status(env, report_id, ReportStatus::Revealed);
    consume(env, request_id, pending);

    aggregator::on_category_revealed(env, &counter_key, &fields.category);

    events::publish_report_revealed(env, report_id, request_id, fields.category);

    Ok(())
}
