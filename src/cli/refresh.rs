use reqwest::Client;

use crate::{config, error, spotify::auth::refresh_token, success};

pub async fn refresh(token: String) {
    let settings = match config::oauth_settings() {
        Ok(s) => s,
        Err(e) => error!("{}", e),
    };

    match refresh_token(&Client::new(), &settings, &token).await {
        Ok(fresh) => {
            success!("Token valid for {} seconds", fresh.expires_in);
            println!("{}", fresh.access_token);
        }
        Err(e) => error!("Cannot refresh token. Err: {}", e),
    }
}
