mod tools;
mod workflow;

pub use tools::{Platform, Toolchain};
pub use workflow::{GENERATED_EXTENSIONS, ModulePaths, Workflow, WorkflowError};
