use crate::infra::{
    InMemoryOrderRepository, InMemoryPreferenceRepository, InMemorySubmissionRepository,
};
use charity_market::email::EmailPreferences;
use charity_market::listing::SubmissionRecord;
use charity_market::payments::{OrderId, OrderRecord};
use chrono::Utc;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Startup rows for the in-memory stores, read from a JSON file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SeedData {
    #[serde(default)]
    pub(crate) submissions: Vec<SeedSubmission>,
    #[serde(default)]
    pub(crate) orders: Vec<SeedOrder>,
    #[serde(default)]
    pub(crate) preferences: Vec<SeedPreference>,
}

/// A submission as the listing form writes it; moderation fields start pending.
#[derive(Debug, Deserialize)]
pub(crate) struct SeedSubmission {
    pub(crate) id: String,
    pub(crate) submitter_id: String,
    #[serde(default)]
    pub(crate) submitter_email: Option<String>,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) images: Vec<String>,
    #[serde(default)]
    pub(crate) user_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeedOrder {
    pub(crate) id: String,
    pub(crate) buyer_id: String,
    pub(crate) buyer_name: String,
    pub(crate) buyer_email: String,
    pub(crate) seller_id: String,
    pub(crate) seller_name: String,
    pub(crate) seller_email: String,
    pub(crate) item_title: String,
    pub(crate) amount: f64,
    #[serde(default)]
    pub(crate) is_donation: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeedPreference {
    pub(crate) user_id: String,
    #[serde(default = "enabled")]
    pub(crate) order_updates: bool,
    #[serde(default = "enabled")]
    pub(crate) listing_updates: bool,
}

fn enabled() -> bool {
    true
}

impl SeedData {
    pub(crate) fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        let seed = serde_json::from_reader(BufReader::new(file))?;
        Ok(seed)
    }

    /// Reads `path` when one is configured; no path means empty stores.
    pub(crate) fn load(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.submissions.is_empty() && self.orders.is_empty() && self.preferences.is_empty()
    }

    pub(crate) fn apply(
        self,
        submissions: &InMemorySubmissionRepository,
        orders: &InMemoryOrderRepository,
        preferences: &InMemoryPreferenceRepository,
    ) {
        for row in self.submissions {
            let mut record = SubmissionRecord::pending(row.id, row.submitter_id, row.title);
            record.submitter_email = row.submitter_email;
            record.description = row.description;
            record.category = row.category;
            record.images = row.images;
            record.user_price = row.user_price;
            submissions.seed(record);
        }

        for row in self.orders {
            orders.seed(OrderRecord {
                id: OrderId(row.id),
                buyer_id: row.buyer_id,
                buyer_name: row.buyer_name,
                buyer_email: row.buyer_email,
                seller_id: row.seller_id,
                seller_name: row.seller_name,
                seller_email: row.seller_email,
                item_title: row.item_title,
                amount: row.amount,
                is_donation: row.is_donation,
                payment_intent_id: None,
                created_at: Utc::now(),
            });
        }

        for row in self.preferences {
            preferences.seed(
                row.user_id,
                EmailPreferences {
                    order_updates: row.order_updates,
                    listing_updates: row.listing_updates,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charity_market::email::PreferenceRepository;
    use charity_market::listing::{SubmissionId, SubmissionRepository, SubmissionStatus};
    use charity_market::payments::OrderRepository;

    fn fixture_path() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/seed.json")
    }

    #[test]
    fn fixture_rows_land_in_the_stores() {
        let seed = SeedData::from_path(fixture_path()).expect("fixture parses");
        assert!(!seed.is_empty());

        let submissions = InMemorySubmissionRepository::default();
        let orders = InMemoryOrderRepository::default();
        let preferences = InMemoryPreferenceRepository::default();
        seed.apply(&submissions, &orders, &preferences);

        let record = submissions
            .fetch(&SubmissionId("sub-2".to_string()))
            .expect("fetch")
            .expect("seeded");
        assert_eq!(record.status, SubmissionStatus::Pending);
        assert_eq!(record.user_price, Some(0.0));

        let order = orders
            .fetch(&OrderId("order-1".to_string()))
            .expect("fetch")
            .expect("seeded");
        assert_eq!(order.amount, 15.0);
        assert!(order.payment_intent_id.is_none());

        let stored = preferences.fetch("user-8").expect("fetch").expect("seeded");
        assert!(stored.order_updates);
        assert!(!stored.listing_updates);
    }

    #[test]
    fn no_path_means_empty_stores() {
        let seed = SeedData::load(None).expect("empty seed");
        assert!(seed.is_empty());
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let err = SeedData::from_path("./does-not-exist.json").expect_err("missing file");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn malformed_seed_is_reported_as_invalid_data() {
        let dir = std::env::temp_dir().join(format!("charity-seed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("broken.json");
        std::fs::write(&path, r#"{"submissions": [{"id": "sub-1"}]}"#).expect("write fixture");

        let err = SeedData::from_path(&path).expect_err("missing fields rejected");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
