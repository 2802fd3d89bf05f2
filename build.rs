#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    // Outside of a git checkout vergen emits placeholder values instead of failing.
    EmitBuilder::builder()
        .build_timestamp()
        .git_describe(true, true, None)
        .emit()?;

    return Ok(());
}
