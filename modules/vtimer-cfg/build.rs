use std::env;
use std::fs;
use std::path::PathBuf;

const DEFAULT_MAX_TIMERS: usize = 16;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=VTIMER_MAX_TIMERS");

    // the slot count of the timer arena; a slot index must fit in a u16
    let max_timers: usize = env::var("VTIMER_MAX_TIMERS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|&n| n > 0 && n <= u16::MAX as usize)
        .unwrap_or(DEFAULT_MAX_TIMERS);

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let generated = format!(
        "/// Number of timer slots a scheduler owns unless told otherwise.\n\
         ///\n\
         /// Set with the `VTIMER_MAX_TIMERS` environment variable at build time.\n\
         pub const MAX_TIMERS: usize = {max_timers};\n"
    );
    fs::write(out_dir.join("config.rs"), generated).expect("write config.rs");
}
