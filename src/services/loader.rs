use std::path::Path;

use crate::core::{Catalog, CatalogError};

/// Read a catalog file from disk
///
/// `.toml` files are read as TOML with `[[festivals]]` tables; anything else
/// is read as JSON. Malformed records inside the file are skipped, but an
/// unreadable file or document is an error.
pub async fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let source = tokio::fs::read_to_string(path).await?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));

    let catalog = if is_toml {
        Catalog::from_toml_str(&source)?
    } else {
        Catalog::from_json_str(&source)?
    };

    tracing::info!(
        "Loaded catalog from {} ({} festivals, {} rejected)",
        path.display(),
        catalog.len(),
        catalog.rejected()
    );

    Ok(catalog)
}
