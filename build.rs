use std::{env, path::Path};

const LIB_DIRS: [&str; 3] = [
    "/usr/local/lib",
    "/usr/lib",
    "/data/data/com.termux/files/usr/lib",
];

fn main() {
    println!("cargo:rerun-if-env-changed=PIPER_LIB_DIR");

    if env::var_os("CARGO_FEATURE_LIBPIPER").is_none() {
        return;
    }
    println!("cargo:rustc-link-lib=piper");

    if let Some(dir) = env::var_os("PIPER_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", Path::new(&dir).display());
        return;
    }

    match LIB_DIRS.iter().find(|dir| Path::new(dir).join("libpiper.so").exists()) {
        Some(dir) => println!("cargo:rustc-link-search=native={}", dir),
        None => println!("cargo:warning=libpiper.so not found; set PIPER_LIB_DIR"),
    }
}
