use std::collections::HashSet;

use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMatch {
    pub name: String,
    pub url: String,
}

/// "Steve Smith" -> "steve-smith". Nothing else is normalized.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// For each name (roster order) pick the first URL whose lowercased form contains the
/// name's slug. Unmatched names are left out. A URL may be picked by several names, and a
/// short slug can hit a longer name's URL; no attempt is made to disambiguate.
pub fn match_entities(urls: &[String], names: &[String]) -> Vec<EntityMatch> {
    let lowered: Vec<String> = urls.iter().map(|u| u.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let slug = slugify(name);
        match lowered.iter().position(|u| u.contains(&slug)) {
            Some(i) => matches.push(EntityMatch {
                name: name.clone(),
                url: urls[i].clone(),
            }),
            None => debug!("No URL for {} (slug {})", name, slug),
        }
    }

    info!("Matched {} of {} names", matches.len(), seen.len());
    matches
}
