#![no_main]
extern crate libfuzzer_sys;
extern crate registry_retention;

use libfuzzer_sys::fuzz_target;
use registry_retention::matchers::Matchers;

fuzz_target!(|data: &[u8]| {
    // Every line but the last is a filter, the last is a repository or tag name
    if let Ok(filters_and_value) = std::str::from_utf8(data) {
        let parts: Vec<&str> = filters_and_value.split('\n').collect();
        if parts.len() > 1 {
            let filters: Vec<String> = parts[..parts.len() - 1].iter().map(|s| s.to_string()).collect();
            let value = parts[parts.len() - 1];
            let matchers = Matchers::from(&filters);
            if matchers.negative_match(value) {
                assert!(!matchers.includes(value));
            }
        }
    }
});
