use crate::{
    config::Config,
    error,
    server::{AppState, start_api_server},
};

pub async fn serve() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(e) => error!("Cannot prepare server state: {}", e),
    };

    if let Err(e) = start_api_server(state).await {
        error!("Server stopped unexpectedly: {}", e);
    }
}
