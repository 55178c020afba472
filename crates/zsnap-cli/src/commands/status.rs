//! Status command handler

use anyhow::Result;

use zsnap_core::Config;

use super::open_settings;
use crate::output::{Output, OutputFormat};

/// Run the startup sequence and report what it resolved
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let (storage, loaded) = open_settings(config)?;
    let settings = &loaded.settings;
    let update_interval = settings.update_check_schedule();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "settings_path": storage.path(),
                    "first_run": loaded.first_run,
                    "defaults_added": loaded.keys_added,
                    "namespaces": storage.namespace_names().collect::<Vec<_>>(),
                    "settings": {
                        "store_backups": settings.store_backups(),
                        "log_uploads": settings.log_uploads(),
                        "load_externals": settings.load_externals(),
                        "check_updates": settings.check_updates(),
                        "capture_mode": settings.capture_mode(),
                        "hosting_service": settings.hosting_service(),
                    },
                    "update_check_interval_secs": update_interval.map(|d| d.as_secs()),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", storage.path().display());
        }
        OutputFormat::Human => {
            println!("zSnap Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Settings file: {}", storage.path().display());
            println!("  Namespaces:    {}", storage.len());
            if loaded.first_run {
                println!("  First run:     default settings written");
            } else if loaded.keys_added > 0 {
                println!("  Defaults:      {} missing setting(s) filled in", loaded.keys_added);
            }
            println!();
            println!("Settings:");
            println!("  Store backups:   {}", yes_no(settings.store_backups()));
            println!("  Log uploads:     {}", yes_no(settings.log_uploads()));
            println!("  Load externals:  {}", yes_no(settings.load_externals()));
            println!(
                "  Capture mode:    {}",
                settings.capture_mode().as_deref().unwrap_or("(not set)")
            );
            println!(
                "  Hosting service: {}",
                settings.hosting_service().as_deref().unwrap_or("(not set)")
            );
            println!();
            println!("Updates:");
            match update_interval {
                Some(interval) => {
                    println!("  Checks every {} minutes", interval.as_secs() / 60)
                }
                None => println!("  Update checks disabled"),
            }
        }
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
