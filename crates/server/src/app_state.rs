use server_api::ApiContext;

use crate::locale::LocaleConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) locales: LocaleConfig,
    pub(crate) max_body_bytes: usize,
}
