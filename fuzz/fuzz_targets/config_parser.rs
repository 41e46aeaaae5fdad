#![no_main]

use catstat::config::AnalysisConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any accepted config must carry rules that never map a label onto itself
        if let Ok(config) = AnalysisConfig::from_toml_str(input) {
            for (from, to) in config.normalization.iter() {
                assert_ne!(from, to);
            }
        }
    }
});
