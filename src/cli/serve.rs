use crate::{config, error, server, warning};

pub async fn serve() {
    let context = match config::scrape_context().await {
        Ok(c) => c,
        Err(e) => error!("Cannot prepare scraping. Err: {}", e),
    };

    let oauth = match config::oauth_settings() {
        Ok(settings) => Some(settings),
        Err(e) => {
            warning!("Login disabled: {}", e);
            None
        }
    };

    let addr = config::server_addr();
    let state = server::AppState::new(context, oauth);
    if let Err(e) = server::start_api_server(state, &addr).await {
        error!("Server on {} stopped. Err: {}", addr, e);
    }
}
