//! Linker setup for the firmware binary
//! Host builds (unit tests) skip it entirely.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
  println!("cargo:rerun-if-changed=memory.x");
  println!("cargo:rerun-if-changed=build.rs");

  // Only the rp2040 target needs the memory layout
  let target = env::var("TARGET").unwrap_or_default();
  if !target.starts_with("thumbv6m") {
    return;
  }

  // Put memory.x where the linker can find it
  let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
  fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).unwrap();
  println!("cargo:rustc-link-search={}", out_dir.display());

  println!("cargo:rustc-link-arg-bins=--nmagic");
  println!("cargo:rustc-link-arg-bins=-Tlink.x");

  if env::var("CARGO_FEATURE_DEFMT").is_ok() {
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
  }
}
