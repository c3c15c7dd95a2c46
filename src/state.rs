use crate::api::HttpApi;
use crate::config::Config;
use crate::coordinator::Coordinator;

#[derive(Clone)]
pub struct AppState {
    pub desk: Coordinator<HttpApi>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let api = HttpApi::new(config.api_base_url.clone(), config.session_path.clone());
        Self {
            desk: Coordinator::new(api, config),
        }
    }
}
