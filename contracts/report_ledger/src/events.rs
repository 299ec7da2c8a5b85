#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env, String};

/// Event published when the ledger is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub operator: Address,
    pub oracle: Address,
    pub timestamp: u64,
}

/// Event published when an encrypted report is stored.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportSubmittedEvent {
    pub report_id: u64,
    pub submitter: Address,
    pub timestamp: u64,
}

/// Event published when a report's handles are sent to the oracle.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionRequestedEvent {
    pub report_id: u64,
    pub request_id: u64,
    pub requester: Address,
    pub timestamp: u64,
}

/// Event published when a verified callback reveals a report.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportRevealedEvent {
    pub report_id: u64,
    pub request_id: u64,
    pub category: String,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CounterInitializedEvent {
    pub category: String,
    pub category_hash: BytesN<32>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CountDecryptionRequestedEvent {
    pub category_hash: BytesN<32>,
    pub request_id: u64,
    pub requester: Address,
    pub timestamp: u64,
}

/// Event carrying a decrypted category count. The ledger does not keep the
/// value; subscribers decide what to do with it.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CountDecryptedEvent {
    pub category: String,
    pub category_hash: BytesN<32>,
    pub request_id: u64,
    pub count: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperatorChangedEvent {
    pub previous: Address,
    pub operator: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, operator: Address, oracle: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        operator,
        oracle,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_report_submitted(env: &Env, report_id: u64, submitter: Address) {
    let topics = (symbol_short!("SUBMIT"), report_id);
    let data = ReportSubmittedEvent {
        report_id,
        submitter,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_decryption_requested(
    env: &Env,
    report_id: u64,
    request_id: u64,
    requester: Address,
) {
    let topics = (symbol_short!("DEC_REQ"), report_id);
    let data = DecryptionRequestedEvent {
        report_id,
        request_id,
        requester,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_report_revealed(env: &Env, report_id: u64, request_id: u64, category: String) {
    let topics = (symbol_short!("REVEALED"), report_id);
    let data = ReportRevealedEvent {
        report_id,
        request_id,
        category,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_counter_initialized(env: &Env, category: String, category_hash: BytesN<32>) {
    let topics = (symbol_short!("CNT_INIT"),);
    let data = CounterInitializedEvent {
        category,
        category_hash,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_count_requested(
    env: &Env,
    category_hash: BytesN<32>,
    request_id: u64,
    requester: Address,
) {
    let topics = (symbol_short!("CNT_REQ"),);
    let data = CountDecryptionRequestedEvent {
        category_hash,
        request_id,
        requester,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_count_decrypted(
    env: &Env,
    category: String,
    category_hash: BytesN<32>,
    request_id: u64,
    count: u64,
) {
    let topics = (symbol_short!("CNT_DEC"),);
    let data = CountDecryptedEvent {
        category,
        category_hash,
        request_id,
        count,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_operator_changed(env: &Env, previous: Address, operator: Address) {
    let topics = (symbol_short!("OP_SET"),);
    let data = OperatorChangedEvent {
        previous,
        operator,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}
