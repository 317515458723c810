#![no_main]
extern crate libfuzzer_sys;
extern crate registry_retention;

use libfuzzer_sys::fuzz_target;
use registry_retention::matchers::Matchers;

fuzz_target!(|data: &[u8]| {
    // Filters are separated by null bytes
    let filters: Vec<String> = data
        .split(|&b| b == 0)
        .map(|slice| String::from_utf8_lossy(slice).to_string())
        .collect();

    let matchers = Matchers::from(&filters);
    let _ = matchers.is_empty();
});
