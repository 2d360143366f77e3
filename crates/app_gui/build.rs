use std::env;

/// Build-time defaults, overridable again at runtime through the same variables.
const FORWARDED: &[(&str, &str)] = &[
    ("CAULI_BACKEND_URL", "http://127.0.0.1:8000"),
    ("CAULI_TIMEOUT_SECS", "120"),
    ("CAULI_PROGRESS", "simulated"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CAULI_VERSION");
    let version = env::var("CAULI_VERSION")
        .or_else(|_| env::var("CARGO_PKG_VERSION"))
        .unwrap_or_default();
    println!("cargo:rustc-env=CAULI_VERSION={version}");

    for (key, fallback) in FORWARDED {
        println!("cargo:rerun-if-env-changed={key}");
        let value = env::var(key).unwrap_or_else(|_| fallback.to_string());
        println!("cargo:rustc-env=CAULI_BUILD_{}={value}", &key["CAULI_".len()..]);
    }
}
