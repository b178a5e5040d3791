#![no_main]

use forest_stand_simulator::SimulationConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = SimulationConfig::from_toml_str(text);
    }
});
