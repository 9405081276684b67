use std::env;
use std::path::PathBuf;

use clap::{CommandFactory, ValueEnum};
use clap_complete::Shell;

#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;


fn main() {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let outdir = env::var_os("CARGO_TARGET_DIR")
        .or_else(|| env::var_os("OUT_DIR"))
        .map(PathBuf::from)
        .unwrap()
        .join("completions");

    std::fs::create_dir_all(&outdir).unwrap();

    let name = env!("CARGO_PKG_NAME");
    let mut cmd = cli::Args::command().name(name);

    for &shell in Shell::value_variants() {
        clap_complete::generate_to(shell, &mut cmd, name, &outdir).unwrap();
    }
}
