use anyhow::{anyhow, Result};

use crate::argsets::LoginArgs;
use crate::auth::AccessToken;
use crate::client::SessionStore;
use crate::interfaces::kvpath;

pub fn login(args: LoginArgs) -> Result<()> {
    let token =
        AccessToken::new(&args.token).ok_or_else(|| anyhow!("Access token must not be empty"))?;
    let mut store = SessionStore::persistent(kvpath::SESSION_STORE.as_path())?;
    store.save(&token)?;
    log::info!("Session token stored");
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut store = SessionStore::persistent(kvpath::SESSION_STORE.as_path())?;
    let route = store.clear()?;
    println!("Logged out. Sign in again at {route}");
    Ok(())
}
