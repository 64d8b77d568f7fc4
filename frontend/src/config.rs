//! Where the admin finds its backend.
//!
//! The endpoint comes from `<meta name="cms-endpoint" content="...">` in the
//! host page, so one build can be pointed at different deployments. A build
//! can also bake one in through the `SITE_CMS_ENDPOINT` environment variable.
//! With neither, the admin shows a configuration banner and makes no calls.

use wasm_bindgen::JsCast;
use web_sys::HtmlMetaElement;

const META_NAME: &str = "cms-endpoint";

pub fn endpoint() -> Option<String> {
    meta_endpoint()
        .or_else(|| option_env!("SITE_CMS_ENDPOINT").map(str::to_string))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

fn meta_endpoint() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let meta = document
        .query_selector(&format!("meta[name=\"{META_NAME}\"]"))
        .ok()??
        .dyn_into::<HtmlMetaElement>()
        .ok()?;
    Some(meta.content())
}
