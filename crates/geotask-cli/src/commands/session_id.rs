use super::App;
use anyhow::Result;
use geotask_core::session::{SessionContext, SessionIdentityProvider};

pub async fn run(app: &App, reset: bool) -> Result<()> {
    if reset {
        app.identity.reset().await?;
        println!("Session id cleared; the next run starts a new session.");
        return Ok(());
    }

    let context = SessionContext::resolve(&app.identity).await?;
    println!("{}", context.session_id());
    Ok(())
}
