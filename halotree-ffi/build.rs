use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let include_dir = PathBuf::from(&crate_dir).join("include");
    let config_file = PathBuf::from(&crate_dir).join("cbindgen.toml");

    std::fs::create_dir_all(&include_dir).expect("Failed to create include directory");

    let config = cbindgen::Config::from_file(&config_file).expect("Failed to read cbindgen.toml");

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
        .expect("Unable to generate C bindings")
        .write_to_file(include_dir.join("halotree.h"));

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");
}
