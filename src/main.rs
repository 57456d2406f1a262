use anyhow::{Result, bail};
use camino::Utf8PathBuf;
use clap::{CommandFactory, Parser};
use simflow::{Toolchain, Workflow};

#[derive(Parser)]
#[command(name = "simflow")]
#[command(about = "Icarus Verilog simulation workflow runner")]
#[command(version)]
struct Args {
    /// Module to simulate
    #[arg(short, long)]
    module: Option<String>,

    /// Open the waveform in the viewer after a successful run
    #[arg(short, long)]
    view: bool,

    /// Delete generated simulation artifacts and exit
    #[arg(short, long)]
    clean: bool,

    /// Directory holding per-module RTL sources
    #[arg(long, default_value = "../rtl")]
    rtl_dir: Utf8PathBuf,

    /// List modules available under the RTL directory and exit
    #[arg(long)]
    list_modules: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let workflow = Workflow::new(args.rtl_dir, Utf8PathBuf::from("."), Toolchain::detect());

    if args.clean {
        return workflow.clean();
    }

    if args.list_modules {
        let modules = workflow.list_modules()?;
        if modules.is_empty() {
            println!("No modules found under {}", workflow.rtl_dir());
        } else {
            println!("Available modules:");
            for module in modules {
                println!("  - {module}");
            }
        }
        return Ok(());
    }

    let module = match args.module {
        Some(module) => module,
        None => {
            Args::command().print_help()?;
            bail!("no module specified, pass -m/--module or -c/--clean");
        }
    };

    let paths = workflow.run(&module)?;
    if args.view {
        workflow.view_waveform(&paths.waveform)?;
    }

    Ok(())
}
