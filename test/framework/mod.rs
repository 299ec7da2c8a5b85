//! # Report Ledger Testing Framework
//!
//! A reusable harness for the report ledger contract supporting
//! property-based testing, invariant checking and state exploration.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs             : Core TestEnv, ledger harness, snapshots
//! ├── generators.rs      : Property-based test value generators
//! ├── invariants.rs      : State invariant definitions & verification
//! └── state_explorer.rs  : Action-sequence exploration
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_framework::{TestEnv, LedgerTestHarness};
//!
//! let mut env = TestEnv::new();
//! let harness = LedgerTestHarness::new(&mut env);
//!
//! let id = harness.submit(1);
//! harness.reveal(id, "Vaccine").unwrap();
//! assert_eq!(harness.decrypt_count("Vaccine"), 1);
//! ```

extern crate std;


use core::fmt::Debug;

use report_ledger::ciphertext::{HomomorphicEngine, PaillierPrivateKey, PaillierPublicKey};
use report_ledger::codec::{encode_count, encode_strings};
use report_ledger::testutils::{
    counter_keypair, sign_cleartexts, MockDecryptionOracle, MockDecryptionOracleClient,
};
use report_ledger::{LedgerError, ReportLedgerContract, ReportLedgerContractClient, ReportStatus};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Bytes, BytesN, Env, String,
};

// ── Core Test Environment ────────────────────────────────────────────────────

/// A high-level test environment that wraps the Soroban `Env` and provides
/// time control and address management.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    /// Generate a fresh Soroban address (cached for re-use).
    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Set the ledger timestamp.
    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    /// Current ledger timestamp.
    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse a generated `try_*` result into the ledger's own error space.
///
/// Host-level failures (auth, traps, conversion) are never expected by the
/// ledger tests and abort the test with the underlying error.
pub fn ledger_result<T, C: Debug, I: Debug>(
    result: Result<Result<T, C>, Result<LedgerError, I>>,
) -> Result<T, LedgerError> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(err)) => Err(err),
        Ok(Err(conversion)) => panic!("return value conversion failed: {:?}", conversion),
        Err(Err(host)) => panic!("host error: {:?}", host),
    }
}

/// Copy a Soroban string into a host string.
pub fn to_std_string(value: &String) -> std::string::String {
    let mut buf = std::vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    std::string::String::from_utf8(buf).expect("ledger strings are UTF-8")
}

// ── Ledger-Specific Harness ──────────────────────────────────────────────────

/// Pre-wired ledger + mock oracle fixture.
///
/// The harness plays the off-chain relayer: it holds the oracle's signing
/// secret and the counter private key, so it can turn any pending request
/// into a correctly signed callback.
pub struct LedgerTestHarness<'a> {
    pub env: &'a mut TestEnv,
    pub client: ReportLedgerContractClient<'static>,
    pub oracle: MockDecryptionOracleClient<'static>,
    pub contract_id: Address,
    pub operator: Address,
    pub reporter: Address,
    secret: BytesN<32>,
    counter_key: PaillierPublicKey,
    counter_secret: PaillierPrivateKey,
}

impl<'a> LedgerTestHarness<'a> {
    /// Deploy the mock oracle and an initialized ledger wired to it.
    pub fn new(env: &'a mut TestEnv) -> Self {
        env.set_timestamp(1_700_000_000);

        let oracle_id = env.env.register(MockDecryptionOracle, ());
        let oracle = MockDecryptionOracleClient::new(&env.env, &oracle_id);
        let secret = BytesN::from_array(&env.env, &[0x5au8; 32]);
        oracle.init(&secret);

        let contract_id = env.env.register(ReportLedgerContract, ());
        let client = ReportLedgerContractClient::new(&env.env, &contract_id);
        let operator = env.generate_address();
        let reporter = env.generate_address();

        let (counter_key, counter_secret) = counter_keypair();
        client.initialize(&operator, &oracle_id, &counter_key);

        Self {
            env,
            client,
            oracle,
            contract_id,
            operator,
            reporter,
            secret,
            counter_key,
            counter_secret,
        }
    }

    /// Deterministic 32-byte handle derived from `seed`.
    pub fn handle(&self, seed: u8) -> BytesN<32> {
        BytesN::from_array(&self.env.env, &[seed; 32])
    }

    /// Submit a report whose handles are derived from `seed`.
    pub fn submit(&self, seed: u8) -> u64 {
        self.client.submit(
            &self.reporter,
            &self.handle(seed),
            &self.handle(seed.wrapping_add(1)),
            &self.handle(seed.wrapping_add(2)),
        )
    }

    pub fn request_reveal(&self, report_id: u64) -> Result<u64, LedgerError> {
        ledger_result(self.client.try_request_decryption(&self.reporter, &report_id))
    }

    pub fn sign(&self, request_id: u64, cleartexts: &Bytes) -> Bytes {
        sign_cleartexts(&self.env.env, &self.secret, request_id, cleartexts)
    }

    pub fn report_cleartexts(&self, title: &str, body: &str, category: &str) -> Bytes {
        encode_strings(&self.env.env, &[title, body, category])
    }

    /// Deliver a correctly signed report callback.
    pub fn deliver_reveal(
        &self,
        request_id: u64,
        title: &str,
        body: &str,
        category: &str,
    ) -> Result<(), LedgerError> {
        let cleartexts = self.report_cleartexts(title, body, category);
        let proof = self.sign(request_id, &cleartexts);
        self.deliver_raw(request_id, &cleartexts, &proof)
    }

    /// Deliver a report callback with caller-chosen payload and proof.
    pub fn deliver_raw(&self, request_id: u64, cleartexts: &Bytes, proof: &Bytes) -> Result<(), LedgerError> {
        ledger_result(
            self.client
                .try_handle_decryption_callback(&request_id, cleartexts, proof),
        )
    }

    /// Request and deliver a reveal with a fixed title and body.
    pub fn reveal(&self, report_id: u64, category: &str) -> Result<(), LedgerError> {
        let request_id = self.request_reveal(report_id)?;
        self.deliver_reveal(request_id, "Report", "Details", category)
    }

    /// Decrypt a counter locally with the oracle's private key.
    pub fn peek_count(&self, category: &str) -> Option<u64> {
        let counter = self
            .client
            .get_encrypted_count(&String::from_str(&self.env.env, category));
        if !counter.initialized {
            return None;
        }
        let count =
            HomomorphicEngine::decrypt(&self.counter_key, &self.counter_secret, counter.ciphertext);
        Some(count as u64)
    }

    /// Full count round trip: request, act as the oracle, call back.
    pub fn try_decrypt_count(&self, category: &str) -> Result<u64, LedgerError> {
        let request_id = ledger_result(self.client.try_request_count_decryption(
            &self.reporter,
            &String::from_str(&self.env.env, category),
        ))?;
        let request = self
            .oracle
            .get_request(&request_id)
            .expect("oracle saw the request");
        let handle = request.handles.get(0).expect("one counter handle");
        let ciphertext = HomomorphicEngine::from_transport(&handle).expect("16-byte counter");
        let count = HomomorphicEngine::decrypt(&self.counter_key, &self.counter_secret, ciphertext);

        let cleartexts = encode_count(&self.env.env, count as u64);
        let proof = self.sign(request_id, &cleartexts);
        ledger_result(
            self.client
                .try_handle_count_decryption_callback(&request_id, &cleartexts, &proof),
        )
    }

    pub fn decrypt_count(&self, category: &str) -> u64 {
        self.try_decrypt_count(category)
            .expect("count decryption succeeds")
    }

    /// Snapshot of all observable ledger state for invariant checking.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let report_count = self.client.report_count();

        let reports = (1..=report_count)
            .map(|id| {
                let plain = self.client.view_plain(&id);
                let record = self
                    .client
                    .try_get_encrypted_record(&id)
                    .ok()
                    .and_then(|r| r.ok());
                ReportView {
                    id,
                    exists: record.is_some(),
                    title_handle: record.map(|r| r.title.to_array()),
                    status: self.client.try_get_report_status(&id).ok().and_then(|s| s.ok()),
                    revealed: plain.revealed,
                    title: to_std_string(&plain.title),
                    category: to_std_string(&plain.category),
                }
            })
            .collect();

        let categories: std::vec::Vec<std::string::String> = self
            .client
            .list_categories()
            .iter()
            .map(|c| to_std_string(&c))
            .collect();

        let counts = categories
            .iter()
            .map(|c| (c.clone(), self.peek_count(c)))
            .collect();

        LedgerSnapshot {
            timestamp: self.env.timestamp(),
            report_count,
            reports,
            categories,
            counts,
        }
    }
}

/// One report as seen from outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub id: u64,
    pub exists: bool,
    pub title_handle: Option<[u8; 32]>,
    pub status: Option<ReportStatus>,
    pub revealed: bool,
    pub title: std::string::String,
    pub category: std::string::String,
}

/// Immutable snapshot of ledger state at a point in time.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    pub timestamp: u64,
    pub report_count: u64,
    pub reports: std::vec::Vec<ReportView>,
    pub categories: std::vec::Vec<std::string::String>,
    /// Decrypted counter per known category (`None` if uninitialized).
    pub counts: std::vec::Vec<(std::string::String, Option<u64>)>,
}

impl LedgerSnapshot {
    /// Number of revealed reports whose plaintext category is `category`.
    pub fn revealed_in(&self, category: &str) -> u64 {
        self.reports
            .iter()
            .filter(|r| r.revealed && r.category == category)
            .count() as u64
    }

    pub fn report(&self, id: u64) -> Option<&ReportView> {
        self.reports.iter().find(|r| r.id == id)
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single test action, used by the state explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action succeeded.
    Ok,
    /// The ledger rejected the action with one of its own errors.
    ExpectedError(u32),
    /// The action failed outside the ledger's error space.
    UnexpectedError(std::string::String),
    /// The action had nothing to act on (e.g. no pending request yet).
    Skipped,
}

/// Summary of a test run with coverage metrics.
#[derive(Debug, Clone)]
pub struct TestRunSummary {
    pub actions_executed: usize,
    pub invariant_checks: usize,
    pub invariant_violations: std::vec::Vec<std::string::String>,
    pub entry_points_hit: std::collections::HashSet<std::string::String>,
    pub transitions_observed: usize,
}

impl TestRunSummary {
    pub fn new() -> Self {
        Self {
            actions_executed: 0,
            invariant_checks: 0,
            invariant_violations: std::vec::Vec::new(),
            entry_points_hit: std::collections::HashSet::new(),
            transitions_observed: 0,
        }
    }

    /// True when no invariant violations were detected.
    pub fn passed(&self) -> bool {
        self.invariant_violations.is_empty()
    }

    /// Coverage ratio: entry points hit / total known entry points.
    pub fn entry_point_coverage(&self, total_entry_points: usize) -> f64 {
        if total_entry_points == 0 {
            return 0.0;
        }
        self.entry_points_hit.len() as f64 / total_entry_points as f64
    }
}

impl Default for TestRunSummary {
    fn default() -> Self {
        Self::new()
    }
}
