use std::process::{Command, ExitStatus};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use xshell::{Shell, cmd};

use crate::tools::Toolchain;

/// Extensions of files left behind by compile and simulate runs.
pub const GENERATED_EXTENSIONS: [&str; 4] = ["vvp", "vcd", "lst", "log"];

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("testbench source not found: {0}")]
    MissingTestbench(Utf8PathBuf),
    #[error("module source not found: {0}")]
    MissingModule(Utf8PathBuf),
    #[error("{tool} failed ({status}):\n{stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("waveform file not found: {0}")]
    MissingWaveform(Utf8PathBuf),
    #[error("failed to launch {tool}")]
    ViewerLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Shell(#[from] xshell::Error),
}

/// The four conventional paths a module name expands to.
#[derive(Debug, Clone)]
pub struct ModulePaths {
    /// Testbench source under the RTL root.
    pub testbench: Utf8PathBuf,
    /// Module source under the RTL root.
    pub module: Utf8PathBuf,
    /// Compiled simulation image in the working directory.
    pub image: Utf8PathBuf,
    /// Waveform trace the runner writes.
    pub waveform: Utf8PathBuf,
    /// Module the compiler elaborates as the design root, `tb_<name>`.
    pub top_module: String,
}

/// Drives the compile / simulate / view sequence for one module at a time.
///
/// Compile and simulate block until the tool exits and capture its output in
/// full; only the waveform viewer is spawned detached, since it is an
/// interactive GUI the user dismisses manually.
pub struct Workflow {
    rtl_dir: Utf8PathBuf,
    sim_dir: Utf8PathBuf,
    tools: Toolchain,
}

impl Workflow {
    pub fn new(rtl_dir: Utf8PathBuf, sim_dir: Utf8PathBuf, tools: Toolchain) -> Self {
        Workflow {
            rtl_dir,
            sim_dir,
            tools,
        }
    }

    pub fn rtl_dir(&self) -> &Utf8Path {
        &self.rtl_dir
    }

    /// Expand `name` into the conventional file layout.
    pub fn module_paths(&self, name: &str) -> ModulePaths {
        let top_module = format!("tb_{name}");
        let module_dir = self.rtl_dir.join(name);
        ModulePaths {
            testbench: module_dir.join(format!("{top_module}.v")),
            module: module_dir.join(format!("{name}.v")),
            image: self.sim_dir.join(format!("{top_module}.vvp")),
            waveform: self.sim_dir.join(format!("{name}.vcd")),
            top_module,
        }
    }

    /// Compile `sources` into `<output_name>.vvp`, elaborating `top_module`
    /// as the design root. Returns the path of the image it produced.
    pub fn compile(
        &self,
        top_module: &str,
        sources: &[Utf8PathBuf],
        output_name: &str,
    ) -> Result<Utf8PathBuf, WorkflowError> {
        println!("Compiling {top_module}...");
        let image = self.sim_dir.join(format!("{output_name}.vvp"));

        let sh = Shell::new()?;
        let compiler = &self.tools.compiler;
        let output = cmd!(sh, "{compiler} -o {image} -s {top_module} {sources...}")
            .ignore_status()
            .output()?;
        if !output.status.success() {
            return Err(WorkflowError::ToolFailed {
                tool: compiler.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            });
        }

        println!("Compilation successful: {image}");
        Ok(image)
    }

    /// Run the compiled image in non-interactive batch mode. The waveform
    /// destination travels in the `dumpfile` variable of the child's
    /// environment only; the parent environment is never touched.
    pub fn simulate(&self, image: &Utf8Path, waveform: &Utf8Path) -> Result<(), WorkflowError> {
        println!("Simulating {image}...");

        let sh = Shell::new()?;
        let runner = &self.tools.runner;
        let output = cmd!(sh, "{runner} -n {image}")
            .env("dumpfile", waveform)
            .ignore_status()
            .output()?;
        if !output.status.success() {
            return Err(WorkflowError::ToolFailed {
                tool: runner.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            });
        }

        println!("Simulation complete, waveform written: {waveform}");
        Ok(())
    }

    /// Open `waveform` in the viewer, spawned detached and never awaited.
    /// Fails without launching anything if the file is absent.
    pub fn view_waveform(&self, waveform: &Utf8Path) -> Result<(), WorkflowError> {
        if !waveform.exists() {
            return Err(WorkflowError::MissingWaveform(waveform.to_owned()));
        }

        println!("Opening waveform: {waveform}");
        Command::new(&self.tools.viewer)
            .arg(waveform)
            .spawn()
            .map_err(|source| WorkflowError::ViewerLaunch {
                tool: self.tools.viewer.clone(),
                source,
            })?;
        Ok(())
    }

    /// Delete every generated artifact in the working directory, reporting
    /// each file as it goes. Matches by extension, independent of module.
    pub fn clean(&self) -> anyhow::Result<()> {
        println!("Cleaning generated files...");
        let mut removed = 0usize;
        for ext in GENERATED_EXTENSIONS {
            let pattern = self.sim_dir.join(format!("*.{ext}"));
            for entry in glob::glob(pattern.as_str())? {
                let path = entry?;
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
                println!("Removed: {}", path.display());
                removed += 1;
            }
        }
        println!("Clean complete, {removed} file(s) removed");
        Ok(())
    }

    /// The composite operation: check both sources exist, compile, simulate.
    /// Short-circuits on the first missing file or failing tool. Returns the
    /// derived paths so the caller can hand the waveform to the viewer.
    pub fn run(&self, name: &str) -> Result<ModulePaths, WorkflowError> {
        let paths = self.module_paths(name);
        if !paths.testbench.exists() {
            return Err(WorkflowError::MissingTestbench(paths.testbench));
        }
        if !paths.module.exists() {
            return Err(WorkflowError::MissingModule(paths.module));
        }

        let sources = [paths.testbench.clone(), paths.module.clone()];
        self.compile(&paths.top_module, &sources, &paths.top_module)?;
        self.simulate(&paths.image, &paths.waveform)?;
        Ok(paths)
    }

    /// Modules under the RTL root that carry both conventional sources.
    pub fn list_modules(&self) -> anyhow::Result<Vec<String>> {
        let mut modules = Vec::new();
        if !self.rtl_dir.exists() {
            return Ok(modules);
        }

        for entry in self.rtl_dir.read_dir_utf8()? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_owned();
            let paths = self.module_paths(&name);
            if paths.testbench.exists() && paths.module.exists() {
                modules.push(name);
            }
        }

        modules.sort();
        Ok(modules)
    }
}
