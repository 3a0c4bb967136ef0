// bazaar/src/lifecycle/catalog.rs

//! Owner-side management of stores and their catalog, plus public reads.
//!
//! Ownership itself is settled by the access pipeline before these run. The
//! rules enforced here are field values and cross-entity references: a
//! product's category must live in the product's store, and an entity still
//! pointed at by another one cannot be deleted.

use super::{ensure_in_store, ensure_unreferenced};
use crate::error::BazaarResult;
use crate::model::{Entity, Store, StoreDraft, StoreFilter, StorePatch, StoreScoped};
use crate::repository::{Repositories, Stored};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Catalog {
  repos: Repositories,
}

impl Catalog {
  pub fn new(repos: Repositories) -> Self {
    Self { repos }
  }

  #[instrument(name = "Catalog::open_store", skip(self, draft), err(Display))]
  pub async fn open_store(&self, owner_user_id: Uuid, draft: StoreDraft) -> BazaarResult<Store> {
    self.repos.users.get_by_id(owner_user_id).await?;
    let store = self.repos.stores.create(Store::new(owner_user_id, draft)).await?;
    info!(store_id = %store.id, "Store opened.");
    Ok(store)
  }

  pub async fn stores(&self, owner_user_id: Option<Uuid>) -> BazaarResult<Vec<Store>> {
    self.repos.stores.find(&StoreFilter { id: None, owner_user_id }).await
  }

  pub async fn update_store(&self, store: &Store, patch: StorePatch) -> BazaarResult<Store> {
    self.repos.stores.update(store, patch).await
  }

  /// Creates a catalog entity inside `store_id`.
  #[instrument(name = "Catalog::create", skip(self, draft), fields(kind = %E::KIND), err(Display))]
  pub async fn create<E>(&self, store_id: Uuid, draft: E::Draft) -> BazaarResult<E>
  where
    E: StoreScoped + Stored,
  {
    self.repos.stores.get_by_id(store_id).await?;
    let entity = E::from_draft(store_id, draft);
    entity.validate()?;
    for (kind, id) in entity.references() {
      ensure_in_store(&self.repos, store_id, kind, id).await?;
    }
    let created = self.repos.of::<E>().create(entity).await?;
    info!(id = %created.id(), "Catalog entity created.");
    Ok(created)
  }

  pub async fn list<E>(&self, store_id: Option<Uuid>) -> BazaarResult<Vec<E>>
  where
    E: StoreScoped + Stored,
  {
    let filter = store_id.map(E::store_filter).unwrap_or_default();
    self.repos.of::<E>().find(&filter).await
  }

  pub async fn get<E: Stored>(&self, id: Uuid) -> BazaarResult<E> {
    self.repos.of::<E>().get_by_id(id).await
  }

  #[instrument(name = "Catalog::update", skip(self, entity, patch), fields(kind = %E::KIND, id = %entity.id()), err(Display))]
  pub async fn update<E>(&self, entity: &E, patch: E::Patch) -> BazaarResult<E>
  where
    E: StoreScoped + Stored,
  {
    let mut patched = entity.clone();
    patched.apply(patch.clone());
    patched.validate()?;
    for (kind, id) in E::patch_references(&patch) {
      ensure_in_store(&self.repos, entity.store_id(), kind, id).await?;
    }
    self.repos.of::<E>().update(entity, patch).await
  }

  #[instrument(name = "Catalog::delete", skip(self, entity), fields(kind = %E::KIND, id = %entity.id()), err(Display))]
  pub async fn delete<E>(&self, entity: &E) -> BazaarResult<()>
  where
    E: StoreScoped + Stored,
  {
    ensure_unreferenced(&self.repos, E::KIND, entity.id()).await?;
    self.repos.of::<E>().delete(entity).await?;
    info!("Catalog entity deleted.");
    Ok(())
  }
}
