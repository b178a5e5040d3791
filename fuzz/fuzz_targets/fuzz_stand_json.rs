#![no_main]

use forest_stand_simulator::{io::read_stand_json_from_bytes, DensityProfile, ModelVariant};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(stand) = read_stand_json_from_bytes(data) {
        for variant in ModelVariant::ALL {
            if variant.validate_stand(&stand).is_ok() {
                let _ = DensityProfile::from_stand(&stand, variant);
            }
        }
    }
});
