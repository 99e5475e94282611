//! Wires the coordinator, tabs and UI surfaces onto one fabric.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use serde_json::Value;
use tracing::info;

use pagehands_config::Config;
use pagehands_core::Fabric;
use pagehands_dom::Document;
use pagehands_page_host::{share, PageHost, SharedDocument};
use pagehands_protocols::{ContextAddress, DocumentParser, Notifier, SettingsStore};

use crate::coordinator::Coordinator;
use crate::error::RuntimeError;
use crate::mediator::Mediator;
use crate::options::Options;
use crate::popup::Popup;
use crate::tabs::TabRegistry;

/// One open document: its mediator and page host.
pub struct Tab {
    pub id: u32,
    pub document: SharedDocument,
    pub mediator: Mediator,
    pub host: PageHost,
}

impl Tab {
    fn unload(&self) {
        self.host.unload();
        self.mediator.unload();
    }
}

/// In-process extension host.
pub struct ExtensionHost {
    fabric: Fabric,
    config: Config,
    notifier: Arc<dyn Notifier>,
    coordinator: Coordinator,
    tabs: DashMap<u32, Arc<Tab>>,
}

impl ExtensionHost {
    /// Start the coordinator. Must run inside a tokio runtime.
    pub async fn start(
        config: Config,
        store: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, RuntimeError> {
        let fabric = Fabric::from_config(&config.router);
        let coordinator =
            Coordinator::start(&fabric, store, Arc::new(TabRegistry::new()), &config).await?;
        info!("Extension host started");
        Ok(Self {
            fabric,
            config,
            notifier,
            coordinator,
            tabs: DashMap::new(),
        })
    }

    pub fn fabric(&self) -> &Fabric {
        &self.fabric
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Attach a document as tab `id`: the mediator starts first, then the
    /// page host announces itself to it.
    pub async fn open_tab(&self, id: u32, document: Document) -> Result<Arc<Tab>, RuntimeError> {
        if self.tabs.contains_key(&id) {
            return Err(RuntimeError::TabExists(id));
        }
        let document = share(document);
        let mediator = Mediator::start(
            id,
            document.clone(),
            &self.fabric,
            &self.config,
            self.notifier.clone(),
        )
        .await?;
        let host = match PageHost::start(id, document.clone(), &self.fabric, &self.config).await {
            Ok(host) => host,
            Err(e) => {
                mediator.unload();
                return Err(e.into());
            }
        };

        let tab = Arc::new(Tab {
            id,
            document,
            mediator,
            host,
        });
        self.tabs.insert(id, tab.clone());
        Ok(tab)
    }

    pub fn tab(&self, id: u32) -> Option<Arc<Tab>> {
        self.tabs.get(&id).map(|entry| entry.clone())
    }

    pub fn tab_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.tabs.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Unload a tab's contexts and forget it.
    pub fn close_tab(&self, id: u32) -> Result<(), RuntimeError> {
        let (_, tab) = self.tabs.remove(&id).ok_or(RuntimeError::NoSuchTab(id))?;
        tab.unload();
        self.coordinator.tabs().remove(id);
        info!("Tab {} closed", id);
        Ok(())
    }

    pub fn open_popup(&self, parser: Arc<dyn DocumentParser>) -> Result<Popup, RuntimeError> {
        Popup::open(&self.fabric, &self.config, parser, self.notifier.clone())
    }

    pub async fn open_options(&self) -> Result<Options, RuntimeError> {
        Options::open(&self.fabric, &self.config, self.notifier.clone()).await
    }

    /// Ask every open tab for its page info concurrently.
    pub async fn page_infos(&self) -> Vec<Result<Value, RuntimeError>> {
        let coordinator = self.coordinator.router();
        let calls = self.tab_ids().into_iter().map(|id| async move {
            coordinator
                .call(ContextAddress::mediator(id), "pageInfo", Value::Null)
                .await
                .map_err(RuntimeError::from)
        });
        join_all(calls).await
    }

    /// Close every tab, then the coordinator.
    pub fn shutdown(&self) {
        for id in self.tab_ids() {
            let _ = self.close_tab(id);
        }
        self.coordinator.unload();
        info!("Extension host stopped");
    }
}
