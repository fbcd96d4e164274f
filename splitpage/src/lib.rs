pub mod handlers;

// Re-export the pieces a host embedding splitpage needs
pub use handlers::{
    ServeOptions, build_app, build_variant_router, cookie_header, fetch_catalog_json,
    into_http_response, preview_file, serve,
};
pub use splitpage_core::{RewriteOptions, RewriteRules, VariantRouter};
