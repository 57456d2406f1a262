/// Platform family the binary was built for, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Unix => "",
        }
    }
}

/// Executable names for the three workflow stages. Callers may substitute
/// individual entries to point a stage at a different binary.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub compiler: String,
    pub runner: String,
    pub viewer: String,
}

impl Toolchain {
    pub fn for_platform(platform: Platform) -> Self {
        let suffix = platform.exe_suffix();
        Toolchain {
            compiler: format!("iverilog{suffix}"),
            runner: format!("vvp{suffix}"),
            viewer: format!("gtkwave{suffix}"),
        }
    }

    pub fn detect() -> Self {
        Self::for_platform(Platform::detect())
    }
}
