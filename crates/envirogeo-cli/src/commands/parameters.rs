//! Parameter catalog command

use anyhow::Result;

use envirogeo_core::parameters;

pub fn cmd_parameters() -> Result<()> {
    println!();
    println!("🌍 Environmental Parameters");
    println!("   ─────────────────────────────");

    for def in parameters::all() {
        println!(
            "   {:<14} {} [{} to {}] {}",
            def.id.as_str(),
            def.name,
            def.min,
            def.max,
            def.unit
        );
    }

    Ok(())
}
