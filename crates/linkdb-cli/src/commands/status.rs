//! Status command handler

use anyhow::Result;

use linkdb_core::LinkStore;

use crate::output::{Output, OutputFormat};

/// Show datastore location and counts
pub fn show(store: &LinkStore, output: &Output) -> Result<()> {
    let access = store.access();
    let path = store.file().path();
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let private = store.iter().filter(|l| l.private).count();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "datastore": path,
                    "datastore_size": size,
                    "logged_in": access.logged_in,
                    "hide_public_links": access.hide_public_links,
                    "counts": {
                        "links": store.len(),
                        "private": private,
                        "tags": store.all_tags().len(),
                        "days": store.all_days().len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("Datastore:  {} ({} bytes)", path.display(), size);
            println!("Logged in:  {}", access.logged_in);
            println!("Links:      {} ({} private)", store.len(), private);
            println!("Tags:       {}", store.all_tags().len());
            println!("Days:       {}", store.all_days().len());
        }
    }

    Ok(())
}
