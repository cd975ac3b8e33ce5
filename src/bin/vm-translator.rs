use std::path::PathBuf;
use std::process;

use clap::Parser;

use hackc::pipeline;

#[derive(Parser)]
#[command(
    name = "vm-translator",
    version,
    about = "VM translator — stack-VM bytecode to Hack assembly"
)]
struct Cli {
    /// Input .vm file (no bootstrap) or directory of .vm files (bootstrap)
    input: PathBuf,
    /// Output .asm file (default: <basename>.asm, or <dir>/<dir>.asm)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match pipeline::translate_path(&cli.input, cli.output.as_deref()) {
        Ok(path) => eprintln!("Translated -> {}", path.display()),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
