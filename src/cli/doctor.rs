//! Environment readiness check.

use crate::browser::chromium::find_chromium;
use anyhow::{bail, Result};

/// Check that a Chromium binary can be located.
pub async fn run() -> Result<()> {
    println!("Ferreprecio Doctor");
    println!("==================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match find_chromium() {
        Some(path) => {
            println!("[OK] Chromium found: {}", path.display());
            println!();
            println!("Status: READY");
            Ok(())
        }
        None => {
            println!("[!!] Chromium NOT found.");
            println!("     Install google-chrome/chromium or set FERREPRECIO_CHROMIUM_PATH.");
            println!();
            println!("Status: NOT READY");
            bail!("Chromium not found")
        }
    }
}
