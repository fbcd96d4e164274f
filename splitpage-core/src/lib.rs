pub mod cookie;
pub mod error;
pub mod response;
pub mod rewrite;
pub mod router;
pub mod select;
pub mod stream;

pub use cookie::{VARIANT_COOKIE, attach_variant_cookie, parse_cookies};
pub use error::{CoreError, Result, TransformError};
pub use response::{BodyStream, INTERNAL_ERROR_BODY, VariantResponse};
pub use rewrite::{RewriteOptions, RewriteRules, TextBuffer, TextRule};
pub use router::VariantRouter;
pub use select::{choose_random, resolve_variant};
