// bazaar/src/model/store.rs

//! Stores and the catalog entities that hang off them.
//!
//! A store is owned by exactly one user. Its children (categories, products,
//! ads, coupons, shipping options and payment methods) carry an immutable
//! `store_id` and are owned transitively by the store's owner.

use super::{field_matches, Entity, OwnerRef, Resource, ResourceKind};
use crate::error::DomainViolation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Catalog entity that lives inside exactly one store.
pub trait StoreScoped: Entity {
  /// Creation payload without the store reference.
  type Draft: fmt::Debug + Send + Sync + 'static;

  fn store_id(&self) -> Uuid;

  fn store_filter(store_id: Uuid) -> Self::Filter;

  fn from_draft(store_id: Uuid, draft: Self::Draft) -> Self;

  /// Other catalog entities this one points at. They must live in the same store.
  fn references(&self) -> Vec<(ResourceKind, Uuid)> {
    Vec::new()
  }

  /// References a patch would introduce.
  fn patch_references(_patch: &Self::Patch) -> Vec<(ResourceKind, Uuid)> {
    Vec::new()
  }

  /// Field-level rules. Checked on the created entity and on the result of a patch.
  fn validate(&self) -> Result<(), DomainViolation> {
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
  pub id: Uuid,
  pub name: String,
  pub owner_user_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreDraft {
  pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
  pub id: Option<Uuid>,
  pub owner_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorePatch {
  pub name: Option<String>,
}

impl Store {
  pub fn new(owner_user_id: Uuid, draft: StoreDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: draft.name,
      owner_user_id,
      created_at: now,
      updated_at: now,
    }
  }
}

impl Entity for Store {
  const KIND: ResourceKind = ResourceKind::Store;
  type Filter = StoreFilter;
  type Patch = StorePatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> StoreFilter {
    StoreFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &StoreFilter) -> bool {
    field_matches(&filter.id, &self.id) && field_matches(&filter.owner_user_id, &self.owner_user_id)
  }

  fn apply(&mut self, patch: StorePatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::User(self.owner_user_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Store(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Store(e) => Some(e),
      _ => None,
    }
  }
}

// --- Category ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id: Uuid,
  pub store_id: Uuid,
  pub name: String,
  pub image_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDraft {
  pub name: String,
  #[serde(default)]
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
  pub name: Option<String>,
  pub image_url: Option<String>,
}

impl Entity for Category {
  const KIND: ResourceKind = ResourceKind::Category;
  type Filter = CategoryFilter;
  type Patch = CategoryPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> CategoryFilter {
    CategoryFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &CategoryFilter) -> bool {
    field_matches(&filter.id, &self.id) && field_matches(&filter.store_id, &self.store_id)
  }

  fn apply(&mut self, patch: CategoryPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(image_url) = patch.image_url {
      self.image_url = Some(image_url);
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Category(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Category(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for Category {
  type Draft = CategoryDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> CategoryFilter {
    CategoryFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: CategoryDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      name: draft.name,
      image_url: draft.image_url,
      created_at: now,
      updated_at: now,
    }
  }
}

// --- Product ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub store_id: Uuid,
  pub category_id: Uuid,
  pub title: String,
  pub image_url: Option<String>,
  pub price_cents: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
  pub category_id: Uuid,
  pub title: String,
  #[serde(default)]
  pub image_url: Option<String>,
  pub price_cents: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
  pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
  pub category_id: Option<Uuid>,
  pub title: Option<String>,
  pub image_url: Option<String>,
  pub price_cents: Option<i32>,
}

impl Entity for Product {
  const KIND: ResourceKind = ResourceKind::Product;
  type Filter = ProductFilter;
  type Patch = ProductPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> ProductFilter {
    ProductFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &ProductFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.store_id, &self.store_id)
      && field_matches(&filter.category_id, &self.category_id)
  }

  fn apply(&mut self, patch: ProductPatch) {
    if let Some(category_id) = patch.category_id {
      self.category_id = category_id;
    }
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(image_url) = patch.image_url {
      self.image_url = Some(image_url);
    }
    if let Some(price_cents) = patch.price_cents {
      self.price_cents = price_cents;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Product(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Product(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for Product {
  type Draft = ProductDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> ProductFilter {
    ProductFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: ProductDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      category_id: draft.category_id,
      title: draft.title,
      image_url: draft.image_url,
      price_cents: draft.price_cents,
      created_at: now,
      updated_at: now,
    }
  }

  fn references(&self) -> Vec<(ResourceKind, Uuid)> {
    vec![(ResourceKind::Category, self.category_id)]
  }

  fn patch_references(patch: &ProductPatch) -> Vec<(ResourceKind, Uuid)> {
    patch
      .category_id
      .map(|id| vec![(ResourceKind::Category, id)])
      .unwrap_or_default()
  }

  fn validate(&self) -> Result<(), DomainViolation> {
    if self.price_cents < 0 {
      return Err(DomainViolation::NegativePrice);
    }
    Ok(())
  }
}

// --- Ad ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
  pub id: Uuid,
  pub store_id: Uuid,
  pub product_id: Uuid,
  pub image_url: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdDraft {
  pub product_id: Uuid,
  pub image_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct AdFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
  pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdPatch {
  pub product_id: Option<Uuid>,
  pub image_url: Option<String>,
}

impl Entity for Ad {
  const KIND: ResourceKind = ResourceKind::Ad;
  type Filter = AdFilter;
  type Patch = AdPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> AdFilter {
    AdFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &AdFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.store_id, &self.store_id)
      && field_matches(&filter.product_id, &self.product_id)
  }

  fn apply(&mut self, patch: AdPatch) {
    if let Some(product_id) = patch.product_id {
      self.product_id = product_id;
    }
    if let Some(image_url) = patch.image_url {
      self.image_url = image_url;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Ad(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Ad(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for Ad {
  type Draft = AdDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> AdFilter {
    AdFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: AdDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      product_id: draft.product_id,
      image_url: draft.image_url,
      created_at: now,
      updated_at: now,
    }
  }

  fn references(&self) -> Vec<(ResourceKind, Uuid)> {
    vec![(ResourceKind::Product, self.product_id)]
  }

  fn patch_references(patch: &AdPatch) -> Vec<(ResourceKind, Uuid)> {
    patch
      .product_id
      .map(|id| vec![(ResourceKind::Product, id)])
      .unwrap_or_default()
  }
}

// --- Coupon ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
  pub id: Uuid,
  pub store_id: Uuid,
  pub code: String,
  /// Percentage off the cart total.
  pub discount: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CouponDraft {
  pub code: String,
  pub discount: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CouponFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
  pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponPatch {
  pub code: Option<String>,
  pub discount: Option<i32>,
}

impl Entity for Coupon {
  const KIND: ResourceKind = ResourceKind::Coupon;
  type Filter = CouponFilter;
  type Patch = CouponPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> CouponFilter {
    CouponFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &CouponFilter) -> bool {
    field_matches(&filter.id, &self.id)
      && field_matches(&filter.store_id, &self.store_id)
      && field_matches(&filter.code, &self.code)
  }

  fn apply(&mut self, patch: CouponPatch) {
    if let Some(code) = patch.code {
      self.code = code;
    }
    if let Some(discount) = patch.discount {
      self.discount = discount;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Coupon(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Coupon(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for Coupon {
  type Draft = CouponDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> CouponFilter {
    CouponFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: CouponDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      code: draft.code,
      discount: draft.discount,
      created_at: now,
      updated_at: now,
    }
  }

  fn validate(&self) -> Result<(), DomainViolation> {
    if !(0..=100).contains(&self.discount) {
      return Err(DomainViolation::DiscountOutOfRange);
    }
    Ok(())
  }
}

// --- Shipping ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipping {
  pub id: Uuid,
  pub store_id: Uuid,
  pub name: String,
  pub price_cents: i32,
  pub delivery_days: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingDraft {
  pub name: String,
  pub price_cents: i32,
  pub delivery_days: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ShippingFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingPatch {
  pub name: Option<String>,
  pub price_cents: Option<i32>,
  pub delivery_days: Option<i32>,
}

impl Entity for Shipping {
  const KIND: ResourceKind = ResourceKind::Shipping;
  type Filter = ShippingFilter;
  type Patch = ShippingPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> ShippingFilter {
    ShippingFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &ShippingFilter) -> bool {
    field_matches(&filter.id, &self.id) && field_matches(&filter.store_id, &self.store_id)
  }

  fn apply(&mut self, patch: ShippingPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(price_cents) = patch.price_cents {
      self.price_cents = price_cents;
    }
    if let Some(delivery_days) = patch.delivery_days {
      self.delivery_days = delivery_days;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::Shipping(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::Shipping(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for Shipping {
  type Draft = ShippingDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> ShippingFilter {
    ShippingFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: ShippingDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      name: draft.name,
      price_cents: draft.price_cents,
      delivery_days: draft.delivery_days,
      created_at: now,
      updated_at: now,
    }
  }

  fn validate(&self) -> Result<(), DomainViolation> {
    if self.price_cents < 0 {
      return Err(DomainViolation::NegativePrice);
    }
    if self.delivery_days < 0 {
      return Err(DomainViolation::NegativeDeliveryDays);
    }
    Ok(())
  }
}

// --- PaymentMethod ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
  pub id: Uuid,
  pub store_id: Uuid,
  pub name: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodDraft {
  pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentMethodFilter {
  pub id: Option<Uuid>,
  pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentMethodPatch {
  pub name: Option<String>,
}

impl Entity for PaymentMethod {
  const KIND: ResourceKind = ResourceKind::PaymentMethod;
  type Filter = PaymentMethodFilter;
  type Patch = PaymentMethodPatch;

  fn id(&self) -> Uuid {
    self.id
  }

  fn id_filter(id: Uuid) -> PaymentMethodFilter {
    PaymentMethodFilter {
      id: Some(id),
      ..Default::default()
    }
  }

  fn matches(&self, filter: &PaymentMethodFilter) -> bool {
    field_matches(&filter.id, &self.id) && field_matches(&filter.store_id, &self.store_id)
  }

  fn apply(&mut self, patch: PaymentMethodPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
  }

  fn touch(&mut self, at: DateTime<Utc>) {
    self.updated_at = at;
  }

  fn owner_ref(&self) -> OwnerRef {
    OwnerRef::Store(self.store_id)
  }

  fn into_resource(self) -> Resource {
    Resource::PaymentMethod(self)
  }

  fn from_resource(resource: &Resource) -> Option<&Self> {
    match resource {
      Resource::PaymentMethod(e) => Some(e),
      _ => None,
    }
  }
}

impl StoreScoped for PaymentMethod {
  type Draft = PaymentMethodDraft;

  fn store_id(&self) -> Uuid {
    self.store_id
  }

  fn store_filter(store_id: Uuid) -> PaymentMethodFilter {
    PaymentMethodFilter {
      store_id: Some(store_id),
      ..Default::default()
    }
  }

  fn from_draft(store_id: Uuid, draft: PaymentMethodDraft) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      name: draft.name,
      created_at: now,
      updated_at: now,
    }
  }
}
