#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    // Whatever parses must print back to something that parses to the same value
    if let Ok(expressions) = slink::parse_all(source) {
        for expression in expressions {
            let printed = expression.to_string();
            let reparsed = slink::parse_str(&printed);
            assert!(matches!(reparsed, Ok(ref value) if *value == expression), "{} reparsed as {:?}", printed, reparsed);
        }
    }
});
