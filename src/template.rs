//! Tile-request URL template construction.
//!
//! Templates are WMS GetMap requests with `$`-placeholders that the external
//! tile-serving path substitutes per request. Placeholders and values pass
//! through literally; the consuming provider expects them unencoded.

/// Bounding-box placeholder substituted per tile request.
pub const BBOX_PLACEHOLDER: &str = "$xmin,$ymin,$xmax,$ymax";

/// Spatial-reference placeholder substituted per tile request.
pub const SRS_PLACEHOLDER: &str = "$srs";

/// Output width placeholder.
pub const WIDTH_PLACEHOLDER: &str = "$width";

/// Output height placeholder.
pub const HEIGHT_PLACEHOLDER: &str = "$height";

/// Build the WMS GetMap query string for a layer.
///
/// Field order is fixed; the tile provider's template parser relies on it
/// only for readability, but tests pin it to catch accidental reordering.
pub fn wms_query(layer_name: &str) -> String {
    let pairs: [(&str, &str); 10] = [
        ("SERVICE", "WMS"),
        ("VERSION", "1.1.1"),
        ("REQUEST", "GetMap"),
        ("BBOX", BBOX_PLACEHOLDER),
        ("SRS", SRS_PLACEHOLDER),
        ("FORMAT", "image/png"),
        ("TRANSPARENT", "true"),
        ("LAYERS", layer_name),
        ("WIDTH", WIDTH_PLACEHOLDER),
        ("HEIGHT", HEIGHT_PLACEHOLDER),
    ];

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compose the full tile-request template `<host><route>?<query>`.
pub fn tile_template(host: &str, ows_route: &str, layer_name: &str) -> String {
    format!("{}{}?{}", host, ows_route, wms_query(layer_name))
}

/// Projection specification naming the custom grid projection for a layer.
///
/// Parameterized by the authoritative spatial-reference code of the layer's
/// project group.
pub fn projection_spec(srid: u32) -> String {
    format!("EPSG:{}", srid)
}
