use log::debug;
use schoolhealth_model::{HealthRecord, Session, Student};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    connection::Store,
    error::{Result, StoreError},
};

pub trait Identified: Clone + DeserializeOwned + Serialize {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Identified for Session {
    const KIND: &'static str = "session";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Student {
    const KIND: &'static str = "student";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for HealthRecord {
    const KIND: &'static str = "health record";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Array of entities stored under a single key, addressed by id.
#[derive(Clone, Debug)]
pub struct Collection {
    store: Store,
    key: &'static str,
}

impl Collection {
    pub fn new(store: Store, key: &'static str) -> Self {
        Self { store, key }
    }

    pub fn fetch_all<T: Identified>(&self) -> Result<Vec<T>> {
        self.store.load(self.key)
    }

    pub fn find<T: Identified>(&self, id: &str) -> Result<Option<T>> {
        Ok(self
            .fetch_all::<T>()?
            .into_iter()
            .find(|item| item.id() == id))
    }

    pub fn insert<T: Identified>(&self, item: T) -> Result<()> {
        self.insert_many(vec![item])
    }

    pub fn insert_many<T: Identified>(&self, new_items: Vec<T>) -> Result<()> {
        debug!("Storing {} {} entries", new_items.len(), T::KIND);
        self.store.modify(self.key, |items: &mut Vec<T>| {
            for new_item in &new_items {
                if items.iter().any(|item| item.id() == new_item.id()) {
                    return Err(StoreError::Duplicate {
                        kind: T::KIND,
                        id: new_item.id().to_owned(),
                    });
                }
            }
            items.extend(new_items);
            Ok(())
        })
    }

    pub fn update<T: Identified>(&self, updated: T) -> Result<()> {
        self.store.modify(self.key, |items: &mut Vec<T>| {
            let slot = items
                .iter_mut()
                .find(|item| item.id() == updated.id())
                .ok_or_else(|| StoreError::NotFound {
                    kind: T::KIND,
                    id: updated.id().to_owned(),
                })?;
            *slot = updated;
            Ok(())
        })
    }

    pub fn delete<T: Identified>(&self, id: &str) -> Result<()> {
        let removed = self.delete_where::<T, _>(|item| item.id() == id)?;
        if removed == 0 {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_owned(),
            });
        }
        Ok(())
    }

    /// Removes every entry matching `predicate`, returning how many went.
    pub fn delete_where<T, P>(&self, predicate: P) -> Result<usize>
    where
        T: Identified,
        P: Fn(&T) -> bool,
    {
        self.store.modify(self.key, |items: &mut Vec<T>| {
            let before = items.len();
            items.retain(|item| !predicate(item));
            Ok(before - items.len())
        })
    }
}
