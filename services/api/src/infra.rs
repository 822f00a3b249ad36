use dari::marketplace::accounts::AccountService;
use dari::marketplace::ads::AdService;
use dari::marketplace::assistant::{AssistantService, CompletionClient};
use dari::marketplace::listings::ListingService;
use dari::marketplace::media::{ImageStore, MediaService, VideoArchive};
use dari::marketplace::moderation::{AppealCooldown, ModerationService};
use dari::marketplace::{Clock, MarketplaceStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Outside collaborators the marketplace services are wired to.
pub(crate) struct Backends {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) images: Arc<dyn ImageStore>,
    pub(crate) videos: Arc<dyn VideoArchive>,
    pub(crate) completions: Arc<dyn CompletionClient>,
    pub(crate) appeal_cooldown: AppealCooldown,
}

/// Every service the HTTP surface exposes, sharing one store.
pub(crate) struct Services<S> {
    pub(crate) accounts: Arc<AccountService<S>>,
    pub(crate) listings: Arc<ListingService<S>>,
    pub(crate) moderation: Arc<ModerationService<S>>,
    pub(crate) ads: Arc<AdService<S>>,
    pub(crate) media: Arc<MediaService<S>>,
    pub(crate) assistant: Arc<AssistantService<S>>,
}

impl<S> Services<S>
where
    S: MarketplaceStore + 'static,
{
    pub(crate) fn new(store: Arc<S>, backends: Backends) -> Self {
        let Backends {
            clock,
            images,
            videos,
            completions,
            appeal_cooldown,
        } = backends;

        Self {
            accounts: Arc::new(AccountService::new(store.clone(), clock.clone())),
            listings: Arc::new(ListingService::new(store.clone(), clock.clone())),
            moderation: Arc::new(ModerationService::new(
                store.clone(),
                clock.clone(),
                appeal_cooldown,
            )),
            ads: Arc::new(AdService::new(store.clone(), clock.clone())),
            media: Arc::new(MediaService::new(
                store.clone(),
                clock.clone(),
                images,
                videos,
            )),
            assistant: Arc::new(AssistantService::new(store, clock, completions)),
        }
    }
}
