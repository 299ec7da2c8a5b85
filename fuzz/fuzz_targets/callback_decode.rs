#![no_main]

use libfuzzer_sys::fuzz_target;
use report_ledger::codec::{decode_count, decode_report, MAX_CATEGORY_LEN, MAX_FIELD_LEN};
use soroban_sdk::{Bytes, Env};

// Arbitrary oracle payloads must decode or fail with an error, never trap.
fuzz_target!(|data: &[u8]| {
    let env = Env::default();
    let cleartexts = Bytes::from_slice(&env, data);

    if let Ok(fields) = decode_report(&env, &cleartexts) {
        assert!(fields.title.len() <= MAX_FIELD_LEN);
        assert!(fields.body.len() <= MAX_FIELD_LEN);
        assert!(fields.category.len() <= MAX_CATEGORY_LEN);
        // Three headers plus three bodies must fit in the input.
        let framed = 12 + fields.title.len() + fields.body.len() + fields.category.len();
        assert!(framed as usize <= data.len());
    }

    if let Ok(count) = decode_count(&cleartexts) {
        assert!(data.len() >= 12);
        assert_eq!(&data[4..12], &count.to_be_bytes());
    }
});
