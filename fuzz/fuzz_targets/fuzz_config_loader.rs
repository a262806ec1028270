#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Arbitrary TOML must either parse or fail cleanly; validate() may
    // reject, but neither stage is allowed to panic.
    let parsed = toml::from_str::<brewscale_config::Config>(data);
    match parsed {
        Ok(cfg) => {
            let _ = cfg.validate();
        }
        Err(_e) => {
            // parse error is acceptable
        }
    }
});
