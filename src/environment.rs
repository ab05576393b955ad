use std::sync::Arc;

use log::Logger;

use crate::config::Config;
use crate::rkg::RecordDate;
use crate::store::Store;
use crate::table::Table;
use crate::urls::ViewerLinks;

pub type Decoder = dyn Fn(&[u8]) -> Option<RecordDate> + Send + Sync;

/// Everything a request needs, shared read-only between requests.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: Arc<dyn Store>,
    pub table: Arc<dyn Table>,
    pub decoder: Arc<Decoder>,
    pub links: Arc<ViewerLinks>,
    pub config: Arc<Config>,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        store: Arc<dyn Store>,
        table: Arc<dyn Table>,
        links: Arc<ViewerLinks>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            logger,
            store,
            table,
            decoder: Arc::new(crate::rkg::decode),
            links,
            config,
        }
    }

    /// Replaces the record decoder.
    pub fn with_decoder(self, decoder: Arc<Decoder>) -> Self {
        Self { decoder, ..self }
    }
}
