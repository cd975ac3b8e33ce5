use std::path::PathBuf;
use std::process;

use clap::Parser;

use hackc::pipeline;

#[derive(Parser)]
#[command(
    name = "jack-compiler",
    version,
    about = "Jack compiler — .jack sources to stack-VM bytecode"
)]
struct Cli {
    /// Input .jack file or directory of .jack files
    input: PathBuf,
    /// Output .vm file (single-file mode only; default: <input>.vm)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match pipeline::compile_path(&cli.input, cli.output.as_deref()) {
        Ok(outputs) => {
            for path in outputs {
                eprintln!("Compiled -> {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
