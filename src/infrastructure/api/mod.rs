pub mod http;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ChatApiBox;

pub struct ApiManager {}

impl ApiManager {
    pub fn get() -> Result<ChatApiBox> {
        let timeout = Duration::from_millis(Config::get(ConfigKey::ApiTimeout).parse::<u64>()?);
        let api = http::HttpChatApi::new(&Config::get(ConfigKey::ApiURL), timeout)?;

        return Ok(Arc::new(api));
    }
}
