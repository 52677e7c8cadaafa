// State shared by every command and event handler.

use crate::core::dispatch::reply::DEFAULT_COLOR;
use crate::core::dispatch::{BotData, CommandContext};
use crate::core::economy::EconomyService;
use crate::core::leveling::{XpConfig, XpManager};
use crate::core::lifestyle::{WeatherProvider, WikiProvider};
use crate::core::profiles::UserStore;
use crate::core::social::SocialService;
use std::sync::Arc;

/// Context every command handler receives.
pub type Context<'a> = CommandContext<'a, Data>;

#[derive(Debug, Clone)]
pub struct Settings {
    pub embed_color: u32,
    /// Members must outrank this role to use `clear`. Unset denies it.
    pub moderator_role: Option<u64>,
    pub exempt_user: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            embed_color: DEFAULT_COLOR,
            moderator_role: None,
            exempt_user: None,
        }
    }
}

pub struct Data {
    pub store: Arc<dyn UserStore>,
    pub xp: Arc<XpManager>,
    pub economy: EconomyService,
    pub social: SocialService,
    pub weather: Arc<dyn WeatherProvider>,
    pub wiki: Arc<dyn WikiProvider>,
    pub settings: Settings,
}

impl Data {
    pub fn new(
        store: Arc<dyn UserStore>,
        xp_config: XpConfig,
        weather: Arc<dyn WeatherProvider>,
        wiki: Arc<dyn WikiProvider>,
        settings: Settings,
    ) -> Self {
        Self {
            xp: Arc::new(XpManager::new(Arc::clone(&store), xp_config)),
            economy: EconomyService::new(Arc::clone(&store), settings.exempt_user),
            social: SocialService::new(Arc::clone(&store), settings.exempt_user),
            store,
            weather,
            wiki,
            settings,
        }
    }
}

impl BotData for Data {
    fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    fn xp(&self) -> &Arc<XpManager> {
        &self.xp
    }
}
