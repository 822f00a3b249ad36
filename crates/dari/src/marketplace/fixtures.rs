//! Shared builders for the in-crate test suites.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use super::accounts::{PlanId, Role, TrustLevel, UserAccount, UserId, FREE_PLAN};
use super::caller::CALLER_HEADER;
use super::clock::{Clock, ManualClock};
use super::listings::{
    Property, PropertyDraft, PropertyId, PropertyKind, PropertyStatus, TransactionKind,
};
use super::store::{AccountRepository, ListingRepository, MemoryStore};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 10, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub(crate) fn harness() -> Harness {
    Harness {
        store: Arc::new(MemoryStore::new()),
        clock: Arc::new(ManualClock::new(start())),
    }
}

impl Harness {
    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn user(&self, id: &str, trust_level: TrustLevel) -> UserId {
        self.insert_account(id, trust_level, false, Vec::new(), FREE_PLAN.plan_id())
    }

    pub fn user_on_plan(&self, id: &str, plan: &str) -> UserId {
        self.insert_account(
            id,
            TrustLevel::Normal,
            false,
            vec![Role::Advertiser],
            PlanId(plan.to_string()),
        )
    }

    pub fn advertiser(&self, id: &str) -> UserId {
        self.insert_account(
            id,
            TrustLevel::Normal,
            false,
            vec![Role::Advertiser],
            FREE_PLAN.plan_id(),
        )
    }

    pub fn admin(&self, id: &str) -> UserId {
        self.insert_account(id, TrustLevel::Normal, true, Vec::new(), FREE_PLAN.plan_id())
    }

    fn insert_account(
        &self,
        id: &str,
        trust_level: TrustLevel,
        is_admin: bool,
        roles: Vec<Role>,
        plan_id: PlanId,
    ) -> UserId {
        let account = UserAccount {
            id: UserId(id.to_string()),
            display_name: id.to_string(),
            email: format!("{id}@example.dz"),
            plan_id,
            is_admin,
            roles,
            trust_level,
            created_at: self.clock.now(),
        };
        self.store.insert_user(account).expect("insert user").id
    }

    pub fn trust_of(&self, id: &UserId) -> TrustLevel {
        self.store
            .fetch_user(id)
            .expect("fetch user")
            .expect("user present")
            .trust_level
    }

    /// Inserts a listing directly, bypassing creation rules.
    pub fn listing(&self, id: &str, owner: &UserId, status: PropertyStatus) -> PropertyId {
        let now = self.clock.now();
        let property = Property {
            id: PropertyId(id.to_string()),
            owner_id: owner.clone(),
            title: "F4 avec vue sur mer".to_string(),
            description: "Spacious apartment near the port".to_string(),
            wilaya: 31,
            commune: Some("Oran".to_string()),
            transaction: TransactionKind::Sale,
            kind: PropertyKind::Apartment,
            price: 18_000_000,
            surface_m2: Some(110),
            rooms: Some(4),
            image_urls: Vec::new(),
            video_url: None,
            status,
            archival_reason: (status == PropertyStatus::Archived)
                .then(|| "owner archived".to_string()),
            deletion_reason: (status == PropertyStatus::Deleted)
                .then(|| "owner deleted".to_string()),
            moderation_hold: status == PropertyStatus::Pending,
            view_count: 0,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_property(property)
            .expect("insert property")
            .id
    }

    pub fn property(&self, id: &PropertyId) -> Property {
        self.store
            .fetch_property(id)
            .expect("fetch property")
            .expect("property present")
    }
}

pub(crate) fn draft() -> PropertyDraft {
    PropertyDraft {
        title: "Villa R+2 Cheraga".to_string(),
        description: "Garden, garage, quiet street".to_string(),
        wilaya: 16,
        commune: Some("Cheraga".to_string()),
        transaction: TransactionKind::Sale,
        kind: PropertyKind::Villa,
        price: 65_000_000,
        surface_m2: Some(320),
        rooms: Some(7),
    }
}

pub(crate) fn json_request(
    method: &str,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
