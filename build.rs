// ttlguess build script

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // The signature table is embedded with include_str!
    println!("cargo:rerun-if-changed=data/osinfo.json");

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TTLGUESS_TARGET={}", target);

    if target.contains("windows") {
        println!("cargo:warning=Windows tracert/ping output differs from the unix tools; hop and ttl parsing may not apply");
    }
}
