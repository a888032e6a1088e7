pub mod boot;
pub mod config;
pub mod shell;

pub use boot::{boot, BootReport, INIT_DIR, STARTUP_KEY};
pub use config::ShellConfig;
pub use shell::Shell;
