//! Resolver: page id to a freshly constructed page object.

use crate::application::Application;
use crate::context::TestContext;
use crate::page_object::{PageArgs, PageObject};
use crate::result::{HeofonError, HeofonResult};
use crate::routing::AuthMode;
use crate::tab::SharedTab;
use std::sync::Arc;

/// Look up `page_id` in the table selected by `current` and
/// `cross_auth_boundary`, then construct the page on the shared tab
///
/// The returned page's auth mode is the mode of the table it came from.
///
/// # Errors
///
/// - [`HeofonError::UnknownPage`] when the id is not in the selected table
/// - [`HeofonError::Configuration`] when the factory's page name differs from
///   its routing key
/// - any error of the factory or of construction
pub async fn resolve(
    app: &Arc<Application>,
    ctx: &Arc<TestContext>,
    current: AuthMode,
    page_id: &str,
    cross_auth_boundary: bool,
    tab: &SharedTab,
    args: Option<&PageArgs>,
) -> HeofonResult<PageObject> {
    let (table, entry) = app.routing().lookup(current, page_id, cross_auth_boundary)?;
    tracing::info!(
        "resolving '{page_id}' from the {} table: {}::{}",
        table.auth_mode(),
        entry.module_path(table.base_path()),
        entry.object
    );

    let empty = PageArgs::new();
    let blueprint = (entry.factory)(app.as_ref(), args.unwrap_or(&empty))?;
    if blueprint.name != page_id {
        return Err(HeofonError::config(format!(
            "routing key '{page_id}' builds a page named '{}'",
            blueprint.name
        )));
    }

    PageObject::construct(
        blueprint,
        table.auth_mode(),
        Arc::clone(tab),
        Arc::clone(app),
        Arc::clone(ctx),
    )
    .await
}
