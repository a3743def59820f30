use std::path::Path;

use anyhow::Context;

/// Print the configured categories and the effective search options.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub(crate) fn run_categories(path: &Path) -> anyhow::Result<()> {
    let file = rentscout_core::load_categories(path)
        .with_context(|| format!("failed to load categories from {}", path.display()))?;

    println!("{} categories in {}", file.categories.len(), path.display());
    for category in &file.categories {
        let flags = match (category.enabled, category.visible) {
            (true, true) => "",
            (true, false) => " (hidden)",
            (false, _) => " (disabled)",
        };
        println!(
            "  {:<14} {} {:?}{flags}",
            category.id, category.color, category.query
        );
    }

    let search = &file.search;
    println!(
        "search: radius {}m, circles {}m, {} page(s), debounce {}ms, {}",
        search.search_radius_meters,
        search.circle_radius_meters,
        search.max_result_pages,
        search.debounce_ms,
        if search.parallel_search {
            "parallel"
        } else {
            "sequential"
        }
    );
    Ok(())
}
