#![no_main]

use libfuzzer_sys::fuzz_target;
use treasury_indexer::models::{parse_amount, SignedAmount};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    if let Ok(amount) = parse_amount(&input) {
        // Parsed amounts must render back to their canonical decimal form
        let rendered = amount.to_string();
        assert_eq!(parse_amount(&rendered).ok(), Some(amount));
        let zero = SignedAmount::difference(amount, amount);
        assert!(zero.is_zero());
    }
});
