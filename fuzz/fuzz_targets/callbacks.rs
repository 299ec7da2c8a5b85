#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use report_ledger::codec::encode_strings;
use report_ledger::testutils::{
    counter_keypair, sign_cleartexts, MockDecryptionOracle, MockDecryptionOracleClient,
};
use report_ledger::{ReportLedgerContract, ReportLedgerContractClient, ReportStatus};
use soroban_sdk::{testutils::Address as _, Address, Bytes, BytesN, Env};

const CATEGORIES: [&str; 3] = ["Vaccine", "Device", "Other"];

/// Relayer behaviour, honest and otherwise. Request and report selectors are
/// reduced modulo what exists so most actions reach the ledger's checks.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Submit { seed: u8 },
    Request { report: u8 },
    Deliver { request: u8, category: u8 },
    DeliverRaw { request: u8, payload: Vec<u8>, signed: bool },
    Replay { request: u8 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let secret = BytesN::from_array(&env, &[7u8; 32]);
    let oracle_id = env.register(MockDecryptionOracle, ());
    MockDecryptionOracleClient::new(&env, &oracle_id).init(&secret);

    let contract_id = env.register(ReportLedgerContract, ());
    let client = ReportLedgerContractClient::new(&env, &contract_id);
    let operator = Address::generate(&env);
    let reporter = Address::generate(&env);
    let (key, _) = counter_keypair();
    client.initialize(&operator, &oracle_id, &key);

    let mut requests: Vec<u64> = Vec::new();
    let mut accepted: Vec<(u64, Bytes, Bytes)> = Vec::new();

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::Submit { seed } => {
                let h = BytesN::from_array(&env, &[seed; 32]);
                client.submit(&reporter, &h, &h, &h);
            }
            FuzzAction::Request { report } => {
                let count = client.report_count();
                if count == 0 {
                    continue;
                }
                let id = report as u64 % count + 1;
                if let Ok(Ok(request_id)) = client.try_request_decryption(&reporter, &id) {
                    requests.push(request_id);
                }
            }
            FuzzAction::Deliver { request, category } => {
                if requests.is_empty() {
                    continue;
                }
                let request_id = requests[request as usize % requests.len()];
                let slot = category as usize % CATEGORIES.len();
                let cleartexts = encode_strings(&env, &["t", "b", CATEGORIES[slot]]);
                let proof = sign_cleartexts(&env, &secret, request_id, &cleartexts);
                if client
                    .try_handle_decryption_callback(&request_id, &cleartexts, &proof)
                    .is_ok()
                {
                    accepted.push((request_id, cleartexts, proof));
                }
            }
            FuzzAction::DeliverRaw {
                request,
                payload,
                signed,
            } => {
                let request_id = requests
                    .get(request as usize % requests.len().max(1))
                    .copied()
                    .unwrap_or(request as u64);
                let cleartexts = Bytes::from_slice(&env, &payload);
                let proof = if signed {
                    sign_cleartexts(&env, &secret, request_id, &cleartexts)
                } else {
                    Bytes::from_slice(&env, &payload)
                };
                let before = client.report_count();
                if client
                    .try_handle_decryption_callback(&request_id, &cleartexts, &proof)
                    .is_ok()
                {
                    assert!(signed, "unsigned callback accepted");
                    let pending = client
                        .get_pending_request(&request_id)
                        .expect("accepted request is recorded");
                    assert!(pending.consumed);
                    accepted.push((request_id, cleartexts, proof));
                }
                assert_eq!(client.report_count(), before);
            }
            FuzzAction::Replay { request } => {
                if accepted.is_empty() {
                    continue;
                }
                let (request_id, cleartexts, proof) = &accepted[request as usize % accepted.len()];
                assert!(
                    client
                        .try_handle_decryption_callback(request_id, cleartexts, proof)
                        .is_err(),
                    "INVARIANT VIOLATION: replayed callback accepted"
                );
            }
        }

        // ── Post-action invariant checks ──
        let mut revealed = 0u64;
        for id in 1..=client.report_count() {
            let plain = client.view_plain(&id);
            let status = client.get_report_status(&id);
            assert_eq!(
                plain.revealed,
                status == ReportStatus::Revealed,
                "INVARIANT VIOLATION: revealed flag and status disagree"
            );
            if plain.revealed {
                revealed += 1;
            }
        }
        // Every accepted callback reveals exactly one report.
        assert_eq!(
            revealed,
            accepted.len() as u64,
            "INVARIANT VIOLATION: reveal count drifted"
        );
    }
});
