//! Link command handlers

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};

use linkdb_core::models::{linkdate_from, LINKDATE_FORMAT};
use linkdb_core::sanitize::escape_html;
use linkdb_core::{Link, LinkStore};

use crate::output::Output;

/// Fields for a new link
pub struct NewLink {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// `None` keeps an existing link's privacy; new links default to public
    pub private: Option<bool>,
}

/// Create a new link and save the datastore
///
/// A URL that is already saved updates that link instead. Stored URLs are
/// escaped on load, so the lookup uses the escaped form.
pub fn add(store: &mut LinkStore, new: NewLink, output: &Output) -> Result<()> {
    let url = escape_html(&new.url);

    let mut link = match store.find_by_url(&url) {
        Some(existing) => {
            output.message(&format!(
                "{} is already saved as {}; updating it.",
                new.url, existing.linkdate
            ));
            existing.clone()
        }
        None => {
            let mut link = Link::new(&url);
            link.linkdate = free_key(store, &link.linkdate);
            link
        }
    };

    let title = match new.title {
        Some(title) => title,
        None if link.title.is_empty() => new.url,
        None => link.title.clone(),
    };
    link.set_title(title);
    if let Some(description) = new.description {
        link.set_description(description);
    }
    if !new.tags.is_empty() {
        link.set_tags(normalize_tags(&new.tags));
    }
    if let Some(private) = new.private {
        link.set_private(private);
    }

    let key = link.linkdate.clone();
    store.set(&key, link).context("Failed to add link")?;
    store.save().context("Failed to save datastore")?;

    output.success(&format!("Saved link: {}", key));
    if let Some(saved) = store.get(&key) {
        output.print_link(saved);
    }
    Ok(())
}

/// List all links, newest first
pub fn list(store: &LinkStore, output: &Output) -> Result<()> {
    let links: Vec<&Link> = store.iter().collect();
    output.print_links(&links);
    Ok(())
}

/// Show a single link by key
pub fn show(store: &LinkStore, key: &str, output: &Output) -> Result<()> {
    let link = store
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", key))?;

    output.print_link(link);
    Ok(())
}

/// Delete a link by key and save the datastore
pub fn delete(store: &mut LinkStore, key: &str, output: &Output) -> Result<()> {
    if !store.contains(key) {
        anyhow::bail!("Link not found: {}", key);
    }

    store.delete(key).context("Failed to delete link")?;
    store.save().context("Failed to save datastore")?;

    output.success(&format!("Deleted link: {}", key));
    Ok(())
}

/// First key at or after `key` not already taken
///
/// Keys have one-second resolution, so links added in quick succession
/// are pushed forward a second at a time.
fn free_key(store: &LinkStore, key: &str) -> String {
    let Ok(mut date) = NaiveDateTime::parse_from_str(key, LINKDATE_FORMAT) else {
        return key.to_string();
    };

    let mut candidate = key.to_string();
    while store.contains(&candidate) {
        date += Duration::seconds(1);
        candidate = linkdate_from(date);
    }
    candidate
}

/// Join tag arguments into the stored space-separated form
///
/// Each argument may itself hold several tags separated by spaces or commas.
fn normalize_tags(tags: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for tag in tags.iter().flat_map(|t| t.split([' ', ','])) {
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen.join(" ")
}
