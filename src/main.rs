// ABOUTME: fdtdump command line tool
// ABOUTME: Prints a DTB file, an FDT embedded in an image, or a live tree as DTS

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use argh::FromArgs;
use fdt_dump::{DumpOptions, dump_path};

#[derive(FromArgs)]
/// print a flattened device tree blob, or a live tree directory, as device
/// tree source
struct Args {
    /// dump debug information while decoding the file
    #[argh(switch, short = 'd')]
    debug: bool,

    /// scan for an embedded fdt in file
    #[argh(switch, short = 's')]
    scan: bool,

    /// path to a DTB file, a firmware image (with --scan) or a live tree
    /// directory
    #[argh(positional)]
    file: PathBuf,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let options = DumpOptions {
        debug: args.debug,
        scan: args.scan,
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let result = dump_path(&args.file, options, &mut out);
    // Whatever was decoded before a failure is still printed
    out.flush().context("failed to flush output")?;

    result.with_context(|| args.file.display().to_string())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fdtdump: {e:#}");
            ExitCode::FAILURE
        }
    }
}
