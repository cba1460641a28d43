//! Typed data hooks over [`SwrCache`] for every proxy route.
//!
//! Reads go through the cache. Mutations patch the cached list first, send
//! the request, and roll the list back if the request fails.

use std::future::Future;

use serde_json::{json, Map, Value};

use super::cache::{ResourceState, SwrCache, SwrOptions};
use super::http::{ClientError, DashboardApi};
use crate::models::id_to_string;

pub const SESSION_KEY: &str = "/api/auth/session";
pub const PLANS_KEY: &str = "/api/subscription/plans";
pub const SUBSCRIPTIONS_KEY: &str = "/api/subscription/subscription";
pub const USERS_KEY: &str = "/api/users";
pub const COACHES_KEY: &str = "/api/coaches";

const PLAN_ID: &str = "plan_id";
const SUBSCRIPTION_ID: &str = "subscription_id";

/// Wrapper keys list endpoints have been seen to use.
const LIST_FIELDS: &[&str] = &["data", "subscriptions", "plans", "admins", "coaches"];

pub(crate) fn list_field(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    LIST_FIELDS.iter().find_map(|k| map.get(*k).and_then(Value::as_array))
}

fn list_items_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    if value.is_array() {
        return value.as_array_mut();
    }
    let map = value.as_object_mut()?;
    let field = LIST_FIELDS.iter().find(|k| map.get(**k).is_some_and(Value::is_array))?;
    map.get_mut(*field).and_then(Value::as_array_mut)
}

fn item_matches(item: &Value, id_field: &str, id: &str) -> bool {
    [id_field, "id", "_id"]
        .iter()
        .filter_map(|k| item.get(*k))
        .any(|v| id_to_string(v) == id)
}

fn append_item(data: Option<Value>, item: Value) -> Value {
    let mut data = data.unwrap_or_else(|| json!([]));
    if let Some(items) = list_items_mut(&mut data) {
        items.push(item);
    }
    data
}

fn patch_item(data: Option<Value>, id_field: &str, id: &str, patch: &Value) -> Value {
    let mut data = data.unwrap_or(Value::Null);
    if let (Some(items), Some(patch)) = (list_items_mut(&mut data), patch.as_object()) {
        for item in items.iter_mut().filter(|item| item_matches(item, id_field, id)) {
            if let Some(fields) = item.as_object_mut() {
                fields.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    data
}

fn remove_item(data: Option<Value>, id_field: &str, id: &str) -> Value {
    let mut data = data.unwrap_or(Value::Null);
    if let Some(items) = list_items_mut(&mut data) {
        items.retain(|item| !item_matches(item, id_field, id));
    }
    data
}

pub struct AdminHooks<A: DashboardApi> {
    api: A,
    cache: SwrCache,
}

impl<A: DashboardApi> AdminHooks<A> {
    pub fn new(api: A, options: SwrOptions) -> Self {
        Self {
            api,
            cache: SwrCache::new(options),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &SwrCache {
        &self.cache
    }

    async fn read(&self, key: &str) -> ResourceState {
        self.cache.load(key, || self.api.get(key)).await
    }

    /// Patch `key` locally, run `request`, roll back on failure.
    async fn optimistic<Fut>(
        &self,
        key: &str,
        update: impl FnOnce(Option<Value>) -> Value,
        request: Fut,
    ) -> Result<Value, ClientError>
    where
        Fut: Future<Output = Result<Value, ClientError>>,
    {
        let snapshot = self.cache.mutate(key, update);
        match request.await {
            Ok(value) => {
                self.cache.invalidate(key);
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("{} failed, rolling back optimistic update: {}", key, e);
                self.cache.restore(snapshot);
                Err(e)
            }
        }
    }

    pub async fn session(&self) -> Result<Value, ClientError> {
        self.api.get(SESSION_KEY).await
    }

    // Plans

    pub async fn plans(&self) -> ResourceState {
        self.read(PLANS_KEY).await
    }

    pub async fn plan(&self, id: &str) -> ResourceState {
        self.read(&format!("{}/{}", PLANS_KEY, id)).await
    }

    pub async fn create_plan(&self, plan: Value) -> Result<Value, ClientError> {
        let request = self.api.post(PLANS_KEY, plan.clone());
        self.optimistic(PLANS_KEY, |data| append_item(data, plan), request).await
    }

    pub async fn update_plan(&self, id: &str, plan: Value) -> Result<Value, ClientError> {
        let path = format!("{}/{}", PLANS_KEY, id);
        let request = self.api.put(&path, plan.clone());
        let result = self
            .optimistic(PLANS_KEY, |data| patch_item(data, PLAN_ID, id, &plan), request)
            .await;
        self.cache.invalidate(&path);
        result
    }

    pub async fn delete_plan(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("{}/{}", PLANS_KEY, id);
        let request = async { self.api.delete(&path).await.map(|_| Value::Null) };
        self.optimistic(PLANS_KEY, |data| remove_item(data, PLAN_ID, id), request)
            .await
            .map(|_| ())
    }

    // Subscriptions

    pub async fn subscriptions(&self) -> ResourceState {
        self.read(SUBSCRIPTIONS_KEY).await
    }

    pub async fn subscription(&self, id: &str) -> ResourceState {
        self.read(&format!("{}/{}", SUBSCRIPTIONS_KEY, id)).await
    }

    pub async fn create_subscription(&self, subscription: Value) -> Result<Value, ClientError> {
        let request = self.api.post(SUBSCRIPTIONS_KEY, subscription.clone());
        self.optimistic(SUBSCRIPTIONS_KEY, |data| append_item(data, subscription), request)
            .await
    }

    pub async fn update_subscription(&self, id: &str, subscription: Value) -> Result<Value, ClientError> {
        let path = format!("{}/{}", SUBSCRIPTIONS_KEY, id);
        let request = self.api.put(&path, subscription.clone());
        let result = self
            .optimistic(
                SUBSCRIPTIONS_KEY,
                |data| patch_item(data, SUBSCRIPTION_ID, id, &subscription),
                request,
            )
            .await;
        self.cache.invalidate(&path);
        result
    }

    pub async fn delete_subscription(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("{}/{}", SUBSCRIPTIONS_KEY, id);
        let request = async { self.api.delete(&path).await.map(|_| Value::Null) };
        self.optimistic(SUBSCRIPTIONS_KEY, |data| remove_item(data, SUBSCRIPTION_ID, id), request)
            .await
            .map(|_| ())
    }

    pub async fn cancel_subscription(&self, id: &str, reason: Option<&str>) -> Result<Value, ClientError> {
        let path = format!("{}/{}/cancel", SUBSCRIPTIONS_KEY, id);
        let body = json!({ "cancellation_reason": reason.unwrap_or_default() });
        let patch = json!({ "status": "cancelled", "cancellation_reason": reason.unwrap_or_default() });
        let request = self.api.post(&path, body);
        self.optimistic(
            SUBSCRIPTIONS_KEY,
            |data| patch_item(data, SUBSCRIPTION_ID, id, &patch),
            request,
        )
        .await
    }

    pub async fn renew_subscription(&self, id: &str, payment: Value) -> Result<Value, ClientError> {
        let path = format!("{}/{}/renew", SUBSCRIPTIONS_KEY, id);
        let patch = json!({ "status": "active" });
        let request = self.api.post(&path, payment);
        self.optimistic(
            SUBSCRIPTIONS_KEY,
            |data| patch_item(data, SUBSCRIPTION_ID, id, &patch),
            request,
        )
        .await
    }

    pub async fn expiring_subscriptions(&self, days: Option<u32>) -> ResourceState {
        let key = match days {
            Some(days) => format!("{}/expiring-soon?days={}", SUBSCRIPTIONS_KEY, days),
            None => format!("{}/expiring-soon", SUBSCRIPTIONS_KEY),
        };
        self.read(&key).await
    }

    pub async fn subscription_stats(&self) -> ResourceState {
        self.read(&format!("{}/stats", SUBSCRIPTIONS_KEY)).await
    }

    // Users and coaches

    pub async fn users(&self) -> ResourceState {
        self.read(USERS_KEY).await
    }

    pub async fn register_user(&self, admin: Value) -> Result<Value, ClientError> {
        let mut listed = admin.clone();
        if let Some(fields) = listed.as_object_mut() {
            fields.remove("password");
        }
        let path = format!("{}/register", USERS_KEY);
        let request = self.api.post(&path, admin);
        self.optimistic(USERS_KEY, |data| append_item(data, listed), request).await
    }

    pub async fn coaches(&self) -> ResourceState {
        self.read(COACHES_KEY).await
    }
}
