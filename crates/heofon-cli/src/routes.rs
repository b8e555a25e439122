//! `routes`: print routing tables and top menus

use crate::error::CliResult;
use heofon::{Application, AuthMode};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;

const MODES: [AuthMode; 2] = [AuthMode::NoAuth, AuthMode::Auth];

/// Human-readable listing of an application's tables and menus
#[must_use]
pub fn render_text(app: &Application) -> String {
    let mut out = format!("{} @ {}\n", app.name(), app.domain());

    for mode in MODES {
        let table = app.routing().table(mode);
        let _ = writeln!(out, "\n{mode} table ({} pages)", table.len());
        for id in table.page_ids() {
            if let Some(entry) = table.get(id) {
                let _ = writeln!(
                    out,
                    "  {id:<28} {}{} -> {}",
                    table.base_path(),
                    entry.module,
                    entry.object
                );
            }
        }
    }

    for mode in MODES {
        let Some(menu) = app.navigation().menu(mode) else {
            continue;
        };
        let _ = writeln!(out, "\n{mode} menu");
        for label in menu.labels() {
            if let Some(stage) = menu.stage_for(label) {
                let crossing = if stage.cross_auth_boundary {
                    format!(" [crosses to {}]", mode.opposite())
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "  {label:<10} {} ({}){crossing}",
                    stage.target, stage.url
                );
            }
        }
    }
    out
}

/// JSON listing of an application's tables and menus
///
/// # Errors
///
/// Returns a JSON error if a selector cannot be serialized.
pub fn render_json(app: &Application) -> CliResult<String> {
    let mut tables = Map::new();
    let mut menus = Map::new();

    for mode in MODES {
        let table = app.routing().table(mode);
        let pages: Map<String, Value> = table
            .page_ids()
            .into_iter()
            .filter_map(|id| {
                table.get(id).map(|entry| {
                    let module = entry.module_path(table.base_path());
                    (
                        id.to_string(),
                        json!({ "module": module, "object": entry.object }),
                    )
                })
            })
            .collect();
        let _ = tables.insert(mode.to_string(), Value::Object(pages));

        if let Some(menu) = app.navigation().menu(mode) {
            let mut stages = Map::new();
            for label in menu.labels() {
                if let Some(stage) = menu.stage_for(label) {
                    let _ = stages.insert(label.to_string(), serde_json::to_value(stage)?);
                }
            }
            let _ = menus.insert(mode.to_string(), Value::Object(stages));
        }
    }

    let doc = json!({
        "application": app.name(),
        "domain": app.domain(),
        "tables": tables,
        "menus": menus,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heofon::apps::sweetshop;
    use heofon::Tier;

    #[test]
    fn test_text_lists_tables_and_menus() {
        let app = sweetshop::application(Tier::Stage).unwrap();
        let text = render_text(&app);
        assert!(text.starts_with("sweetshop @ sweetshop.vivrichards.co.uk"));
        assert!(text.contains("noauth table (5 pages)"));
        assert!(text.contains("auth table (1 pages)"));
        assert!(text.contains("heofon::apps::sweetshop::noauth::pages -> SweetsPage"));
        assert!(text.contains("[crosses to noauth]"));
    }

    #[test]
    fn test_json_structure() {
        let app = sweetshop::application(Tier::Qa).unwrap();
        let doc: Value = serde_json::from_str(&render_json(&app).unwrap()).unwrap();
        assert_eq!(doc["application"], "sweetshop");
        assert_eq!(
            doc["tables"]["auth"]["sweetshop account page"]["object"],
            "AccountPage"
        );
        assert_eq!(doc["menus"]["auth"]["Logout"]["cross_auth_boundary"], true);
        assert_eq!(doc["menus"]["noauth"]["Sweets"]["url"], "/sweets");
    }
}
