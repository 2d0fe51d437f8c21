use anyhow::{Context, Result};
use hymnal_catalog::Config;
use hymnal_core::{Category, HymnFilter, HymnId};

use super::{open_catalog, print_hymn, print_hymns};

pub fn list(
    config: &Config,
    category: Option<Category>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let catalog = open_catalog(config)?;
    let hymns = catalog.list_hymns(&HymnFilter::new(category, search))?;
    print_hymns(&hymns, json)
}

pub fn show(config: &Config, id: Option<i64>, number: Option<&str>, json: bool) -> Result<()> {
    let catalog = open_catalog(config)?;

    let hymn = match (id, number) {
        (_, Some(number)) => catalog
            .get_hymn_by_number(number)
            .with_context(|| format!("No hymn with number {number}"))?,
        (Some(id), None) => catalog
            .get_hymn(HymnId::from_external(id))
            .with_context(|| format!("No hymn with id {id}"))?,
        (None, None) => anyhow::bail!("Give a hymn id or --number"),
    };

    print_hymn(&hymn, json)
}

pub fn search(config: &Config, term: &str, json: bool) -> Result<()> {
    let catalog = open_catalog(config)?;
    let hymns = catalog.search_hymns(term)?;
    print_hymns(&hymns, json)
}
