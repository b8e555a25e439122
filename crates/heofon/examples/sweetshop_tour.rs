//! Example: Sweet Shop tour on the scripted site
//!
//! Demonstrates: starting an application, top-menu transitions, crossing the
//! auth boundary by logging in and out, and the captures each step produces.
//!
//! Run with: `cargo run --example sweetshop_tour`

use heofon::apps::sweetshop::{self, pages};
use heofon::mock::{Capture, RecordingSink};
use heofon::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> HeofonResult<()> {
    let _ = heofon::init_run_logging(None, true)?;
    println!("=== Sweet Shop Tour ===\n");

    // 1. Application and scripted tab
    let app = sweetshop::application(Tier::Stage)?;
    let tab: SharedTab = Arc::new(sweetshop::mock_site(&app));
    let sink = Arc::new(RecordingSink::new());
    let ctx = Arc::new(TestContext::new(RunConfig::default(), sink.clone()));
    println!("1. {} at {}", app.name(), app.domain());

    // 2. Walk the public menu
    println!("\n2. Public pages...");
    let mut page = app.start_with(&ctx, &tab, sweetshop::HOME_PAGE).await?;
    for label in ["Sweets", "About", "Login"] {
        page = page.top_menu_goto(label).await?;
        println!("   {label:<8} -> {} ({})", page.name(), page.auth_mode());
    }

    // 3. Log in: crosses into the auth table
    println!("\n3. Logging in...");
    let mut account = pages::log_in(&mut page, "demo@example.com", "secret").await?;
    println!("   now on {} ({})", account.name(), account.auth_mode());

    // 4. Log out: crosses back
    println!("\n4. Logging out...");
    let login = account.top_menu_goto("Logout").await?;
    println!("   back on {} ({})", login.name(), login.auth_mode());

    // 5. What was captured
    println!("\n5. Captures...");
    for capture in sink.captures() {
        match capture {
            Capture::Cookies { label, .. } => println!("   cookies     {label}"),
            Capture::ConsoleLog { label, .. } => println!("   console     {label}"),
            Capture::WebStorage { event, .. } => println!("   web storage {event}"),
            Capture::Screenshot { label } => println!("   screenshot  {label}"),
        }
    }

    println!("\n=== Tour Complete ===");
    Ok(())
}
