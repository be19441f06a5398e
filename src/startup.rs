use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

const SHIM_NAME: &str = "binance_ticker_startup.bat";

/// "Run at login" toggle. The shim file's existence in the autostart
/// folder is the entire state; nothing else is recorded, and callers
/// re-read it from disk whenever they need the current truth.
pub struct StartupShim {
    folder: PathBuf,
}

impl StartupShim {
    pub fn from_env() -> anyhow::Result<Self> {
        let appdata = env::var("APPDATA").context("APPDATA must be set")?;
        let folder = PathBuf::from(appdata)
            .join("Microsoft")
            .join("Windows")
            .join("Start Menu")
            .join("Programs")
            .join("Startup");
        Ok(Self { folder })
    }

    pub fn with_folder(folder: PathBuf) -> Self {
        Self { folder }
    }

    fn shim_path(&self) -> PathBuf {
        self.folder.join(SHIM_NAME)
    }

    pub fn is_enabled(&self) -> bool {
        self.shim_path().exists()
    }

    pub fn enable(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.folder).context("Failed to create autostart folder")?;
        let exe = env::current_exe().context("Could not resolve own executable path")?;
        let shim = format!("start \"\" \"{}\"\r\n", exe.display());
        fs::write(self.shim_path(), shim).context("Failed to write launch shim")?;
        Ok(())
    }

    pub fn disable(&self) -> anyhow::Result<()> {
        let path = self.shim_path();
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove launch shim")?;
        }
        Ok(())
    }
}
