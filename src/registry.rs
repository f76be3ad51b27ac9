use crate::container::{IListenerContainerFactory, MessageListenerContainer};
use crate::endpoint::ListenerEndpoint;
use crate::error::Error;
use log::info;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Owner of every running listener container.
///
/// Validates endpoints, launches containers through the factory supplied per
/// registration, and keeps them addressable by id until they are
/// deregistered or the registry is dropped. Registration is the only moment
/// configuration errors surface; from then on the containers run on their
/// own. Interior mutability makes the registry shareable across threads;
/// registration spawns listening tasks, so it must run inside a Tokio
/// runtime.
pub struct ListenerRegistry {
    containers: Mutex<HashMap<Uuid, MessageListenerContainer>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
        }
    }

    /// Validates `endpoint`, launches its container through `factory` and
    /// returns the endpoint id it is now addressable under.
    pub fn register_listener_container(
        &self,
        endpoint: ListenerEndpoint,
        factory: &dyn IListenerContainerFactory,
    ) -> Result<Uuid, Error> {
        validate(&endpoint)?;
        let invoker = endpoint.bind()?;
        let consumers = factory.create_consumers(&endpoint)?;
        let id = endpoint.id();
        let container = MessageListenerContainer::launch(endpoint, invoker, consumers)?;
        self.containers.lock().unwrap().insert(id, container);
        info!("Registered listener.(id={})", id);
        Ok(id)
    }

    /// Stops and discards the container registered under `id`. Returns false
    /// when no such listener exists.
    pub fn deregister(&self, id: Uuid) -> bool {
        let removed = self.containers.lock().unwrap().remove(&id);
        match removed {
            Some(container) => {
                container.stop();
                info!("Deregistered listener.(id={})", id);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, id: Uuid) -> bool {
        self.containers.lock().unwrap().contains_key(&id)
    }

    pub fn listener_ids(&self) -> Vec<Uuid> {
        self.containers.lock().unwrap().keys().copied().collect()
    }

    /// Stops and discards every running container.
    pub fn stop_all(&self) {
        let drained = {
            let mut containers = self.containers.lock().unwrap();
            std::mem::take(&mut *containers)
        };
        for (id, container) in drained {
            container.stop();
            info!("Deregistered listener.(id={})", id);
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(endpoint: &ListenerEndpoint) -> Result<(), Error> {
    if endpoint.group_id().trim().is_empty() {
        return Err(Error::EmptyGroupId);
    }
    if endpoint.topics().iter().any(|t| t.trim().is_empty()) {
        return Err(Error::EmptyTopic);
    }
    if endpoint.topics().is_empty() && endpoint.topic_pattern().is_none() {
        return Err(Error::EmptyTopic);
    }
    Ok(())
}
