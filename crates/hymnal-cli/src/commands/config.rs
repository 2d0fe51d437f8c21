use anyhow::Result;
use hymnal_catalog::{config, Config};

/// Show the effective configuration, after CLI overrides.
pub fn show_config(config: &Config) -> Result<()> {
    println!("Current Configuration");
    println!("=====================\n");

    let config_path = config::config_file_path();
    println!("Config file: {}", config_path.display());
    let exists = config_path.exists();
    println!(
        "File exists: {}\n",
        if exists { "yes" } else { "no (using defaults)" }
    );

    println!("Settings:");
    println!("  database_path: {}", config.database_path.display());
    println!(
        "  legacy_path: {}",
        config
            .legacy_path
            .as_ref()
            .map_or_else(|| String::from("<not set>"), |p| p.display().to_string())
    );
    println!("  legacy_hymn_book: {}", config.legacy_hymn_book);
    println!("  bare_v_marker: {:?}", config.bare_v_marker);
    println!("  log_level: {}", config.log_level);

    println!("\nPriority: CLI args > ENV vars (HYMNAL_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() -> Result<()> {
    println!("{}", config::config_file_path().display());
    Ok(())
}

/// Show example configuration.
pub fn show_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure hymnal.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}
