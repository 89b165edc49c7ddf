use regex::Regex;
use std::fs;
use std::path::Path;

/// Fail CI if committed config files contain 64-hex private keys.
#[test]
fn no_committed_hex_keys_in_configs() {
    let re = Regex::new(r"0x?[a-fA-F0-9]{64}").unwrap();
    let candidates = [
        "config.toml",
        "config.example.toml",
        ".env.example",
        "data/pools.json",
        "data/blacklist.json",
    ];
    for file in candidates {
        if !Path::new(file).exists() {
            continue;
        }
        let body = fs::read_to_string(file).expect("read config");
        for (idx, line) in body.lines().enumerate() {
            if re.is_match(line) {
                panic!("Secret-looking hex in {} at line {}", file, idx + 1);
            }
        }
    }
}

#[test]
fn sample_pool_list_parses() {
    let path = "data/pools.json";
    if !Path::new(path).exists() {
        return;
    }
    let registry = harvest_keeper::data::registry::PoolRegistry::load_from_file(path)
        .expect("sample pool list");
    assert!(!registry.is_empty());
}
