//! Donation Records
//!
//! Donation, fundraiser and user records, and the storage port the
//! session and webhook flows persist through.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{DonationError, Result};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Donation primary key
    DonationId
);
record_id!(
    /// Fundraiser primary key
    FundraiserId
);
record_id!(
    /// User primary key
    UserId
);

impl FundraiserId {
    /// Read an id from a request body value (integer or numeric string)
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| Self(f as i64))
            }),
            serde_json::Value::String(s) => s.trim().parse().ok().map(Self),
            _ => None,
        }
    }
}

/// A registered user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// A fundraiser donations are credited to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fundraiser {
    pub id: FundraiserId,
    pub title: String,
}

/// A donation record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    /// Primary key
    pub id: DonationId,

    /// Amount in cents
    pub amount: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Fundraiser being credited
    pub fundraiser_id: FundraiserId,

    /// Donor
    pub user_id: UserId,

    /// Stripe Checkout session id, unique per donation
    pub stripe_session: String,

    /// Set once Stripe reports the checkout as paid
    pub payment_finalized: bool,
}

impl Donation {
    /// Mark the payment as received
    pub fn finalize(&mut self) {
        self.payment_finalized = true;
    }
}

/// A donation that has not been stored yet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDonation {
    pub amount: i64,
    pub fundraiser_id: FundraiserId,
    pub user_id: UserId,
    pub stripe_session: String,
}

impl NewDonation {
    /// Build the pending record, stamped with the current time
    pub fn into_donation(self, id: DonationId) -> Donation {
        Donation {
            id,
            amount: self.amount,
            created_at: Utc::now(),
            fundraiser_id: self.fundraiser_id,
            user_id: self.user_id,
            stripe_session: self.stripe_session,
            payment_finalized: false,
        }
    }
}

/// Donation storage trait
///
/// Each write is committed before the call returns.
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Get fundraiser by id
    async fn find_fundraiser(&self, id: FundraiserId) -> Result<Option<Fundraiser>>;

    /// Get user by the email their access token carries
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a pending donation
    ///
    /// Fails with [`DonationError::DuplicateSession`] if a donation already
    /// references the same Stripe session.
    async fn create_donation(&self, donation: NewDonation) -> Result<Donation>;

    /// Get donation by Stripe session id
    async fn find_by_session(&self, stripe_session: &str) -> Result<Option<Donation>>;

    /// Update an existing donation
    async fn save(&self, donation: &Donation) -> Result<()>;
}

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    fundraisers: HashMap<FundraiserId, Fundraiser>,
    donations: HashMap<DonationId, Donation>,
    by_session: HashMap<String, DonationId>,
    next_donation_id: i64,
}

/// In-memory donation store (for development)
#[derive(Default)]
pub struct MemoryDonationStore {
    tables: RwLock<Tables>,
}

impl MemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user
    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Register a fundraiser
    pub async fn add_fundraiser(&self, fundraiser: Fundraiser) {
        self.tables
            .write()
            .await
            .fundraisers
            .insert(fundraiser.id, fundraiser);
    }

    /// All stored donations, oldest first
    pub async fn donations(&self) -> Vec<Donation> {
        let tables = self.tables.read().await;
        let mut donations: Vec<_> = tables.donations.values().cloned().collect();
        donations.sort_by_key(|d| d.id);
        donations
    }
}

#[async_trait]
impl DonationStore for MemoryDonationStore {
    async fn find_fundraiser(&self, id: FundraiserId) -> Result<Option<Fundraiser>> {
        Ok(self.tables.read().await.fundraisers.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_donation(&self, donation: NewDonation) -> Result<Donation> {
        let mut tables = self.tables.write().await;

        if tables.by_session.contains_key(&donation.stripe_session) {
            return Err(DonationError::DuplicateSession(donation.stripe_session));
        }

        tables.next_donation_id += 1;
        let donation = donation.into_donation(DonationId(tables.next_donation_id));

        tables
            .by_session
            .insert(donation.stripe_session.clone(), donation.id);
        tables.donations.insert(donation.id, donation.clone());

        Ok(donation)
    }

    async fn find_by_session(&self, stripe_session: &str) -> Result<Option<Donation>> {
        let tables = self.tables.read().await;

        Ok(tables
            .by_session
            .get(stripe_session)
            .and_then(|id| tables.donations.get(id))
            .cloned())
    }

    async fn save(&self, donation: &Donation) -> Result<()> {
        let mut tables = self.tables.write().await;

        match tables.donations.get_mut(&donation.id) {
            Some(stored) if stored.stripe_session == donation.stripe_session => {
                *stored = donation.clone();
                Ok(())
            }
            Some(_) => Err(DonationError::Storage(format!(
                "donation {} cannot change its session",
                donation.id
            ))),
            None => Err(DonationError::Storage(format!(
                "donation {} does not exist",
                donation.id
            ))),
        }
    }
}
