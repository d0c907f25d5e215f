use anyhow::Context;
use procdash_core::{config::Config, io, paths, store::Store};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "procdash".to_string());

    println!("Initializing procdash in: {}", root.display());

    for dir in [paths::PROCDASH_DIR, paths::VIEWS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if !paths::config_path(root).exists() {
        Config::new(&project_name)
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    if !paths::store_path(root).exists() {
        Store::new(root).save().context("failed to write store.yaml")?;
        println!("  created: {}", paths::STORE_FILE);
    } else {
        println!("  exists:  {}", paths::STORE_FILE);
    }

    tracing::debug!(root = %root.display(), "initialized");
    println!("\nNext: procdash bq add <id> --title \"...\"");
    Ok(())
}
