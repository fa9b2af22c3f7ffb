use axum::response::Html;
use minijinja::context;

use crate::core::error::AppError;
use crate::shared::constants::PAGE_TITLE;
use crate::shared::templates::render_template;

/// Serve the upload page
pub async fn index_page() -> Result<Html<String>, AppError> {
    let html = render_template(
        "index.html.jinja",
        context! {
            title => PAGE_TITLE,
            upload_url => "/upload",
            files_url => "/files",
        },
    )?;

    Ok(Html(html))
}
