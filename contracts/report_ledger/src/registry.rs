use soroban_sdk::{symbol_short, Address, BytesN, Env, Symbol, Vec};

use crate::{events, EncryptedRecord, LedgerError, PlainRecord, ReportStatus};

const REPORT_CTR: Symbol = symbol_short!("RPT_CTR");

pub(crate) const TTL_THRESHOLD: u32 = 17_280;
pub(crate) const TTL_EXTEND_TO: u32 = 518_400;

fn encrypted_key(report_id: u64) -> (Symbol, u64) {
    (symbol_short!("ENC_RPT"), report_id)
}

fn plain_key(report_id: u64) -> (Symbol, u64) {
    (symbol_short!("PLN_RPT"), report_id)
}

fn status_key(report_id: u64) -> (Symbol, u64) {
    (symbol_short!("RPT_STAT"), report_id)
}

/// Highest id handed out so far; ids run 1..=report_count with no gaps.
pub fn report_count(env: &Env) -> u64 {
    env.storage().instance().get(&REPORT_CTR).unwrap_or(0)
}

#[allow(clippy::arithmetic_side_effects)]
pub fn submit(
    env: &Env,
    submitter: &Address,
    title: BytesN<32>,
    body: BytesN<32>,
    category: BytesN<32>,
) -> u64 {
    let report_id = report_count(env) + 1;
    env.storage().instance().set(&REPORT_CTR, &report_id);

    let record = EncryptedRecord {
        id: report_id,
        title,
        body,
        category,
        submitter: submitter.clone(),
        created_at: env.ledger().timestamp(),
    };

    let key = encrypted_key(report_id);
    env.storage().persistent().set(&key, &record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    write_plain(env, report_id, &PlainRecord::empty(env));
    set_status(env, report_id, ReportStatus::Submitted);

    events::publish_report_submitted(env, report_id, submitter.clone());

    report_id
}

pub fn submit_batch(
    env: &Env,
    submitter: &Address,
    titles: Vec<BytesN<32>>,
    bodies: Vec<BytesN<32>>,
    categories: Vec<BytesN<32>>,
) -> Result<Vec<u64>, LedgerError> {
    if titles.len() != bodies.len() || titles.len() != categories.len() {
        return Err(LedgerError::LengthMismatch);
    }

    let mut ids = Vec::new(env);
    for ((title, body), category) in titles.iter().zip(bodies.iter()).zip(categories.iter()) {
        ids.push_back(submit(env, submitter, title, body, category));
    }
    Ok(ids)
}

pub fn get_encrypted(env: &Env, report_id: u64) -> Option<EncryptedRecord> {
    env.storage().persistent().get(&encrypted_key(report_id))
}

/// Plaintext view of a report. Unknown ids read as an empty, unrevealed shell.
pub fn view_plain(env: &Env, report_id: u64) -> PlainRecord {
    env.storage()
        .persistent()
        .get(&plain_key(report_id))
        .unwrap_or_else(|| PlainRecord::empty(env))
}

pub(crate) fn write_plain(env: &Env, report_id: u64, record: &PlainRecord) {
    let key = plain_key(report_id);
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_status(env: &Env, report_id: u64) -> Option<ReportStatus> {
    env.storage().persistent().get(&status_key(report_id))
}

pub(crate) fn set_status(env: &Env, report_id: u64, status: ReportStatus) {
    let key = status_key(report_id);
    env.storage().persistent().set(&key, &status);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}
