//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `scolarite_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // Why: keep a tiny probe to validate core crate wiring independently
    // from the desktop host setup.
    println!("scolarite_core version={}", scolarite_core::core_version());
    println!(
        "scolarite_core default_log_level={}",
        scolarite_core::default_log_level()
    );
}
