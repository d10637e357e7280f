//! Validate command handler

use anyhow::Result;
use colored::*;

use super::read_script;

/// Run the safety validator on a script file
pub fn validate_file(path: &str) -> Result<()> {
    let code = read_script(path)?;

    match scenecraft_python::validate(&code) {
        Ok(()) => {
            println!("{}", "✓ Script passed validation".green().bold());
            if let Some(scene) = scenecraft_python::extract_scene_name(&code) {
                println!("  Scene: {}", scene.cyan());
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ Script rejected".red().bold());
            println!("  {}", e.to_string().red());
            anyhow::bail!("validation failed for {}", path)
        }
    }
}
