//! Search and filter command handlers

use anyhow::Result;

use linkdb_core::{LinkFilter, LinkStore};

use crate::output::Output;

/// Print links matching `filter`
pub fn filter(store: &LinkStore, filter: LinkFilter, output: &Output) -> Result<()> {
    let links = store.filter(&filter);

    if let LinkFilter::Hash(ref hash) = filter {
        let link = links
            .first()
            .ok_or_else(|| anyhow::anyhow!("No link with permalink {}", hash))?;
        output.print_link(link);
        return Ok(());
    }

    output.print_links(&links);
    Ok(())
}

/// List all tags with usage counts
pub fn tags(store: &LinkStore, output: &Output) -> Result<()> {
    output.print_tags(&store.all_tags());
    Ok(())
}

/// List the days that have links
pub fn days(store: &LinkStore, output: &Output) -> Result<()> {
    output.print_days(&store.all_days());
    Ok(())
}
