//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `lineage_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("lineage_core ping={}", lineage_core::ping());
    println!("lineage_core version={}", lineage_core::core_version());
}
