//! Randomized customers and invoices for tests and demo data.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::contract::model::{Customer, Invoice, InvoiceStatus, NewCustomer, NewInvoice};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Ken", "Barbara", "Edsger", "Margaret", "Dennis", "Frances", "Niklaus",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Thompson", "Liskov", "Dijkstra", "Hamilton", "Ritchie",
    "Allen", "Wirth",
];
const COMPANY_WORDS: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Hooli", "Vandelay", "Wonka",
];
const COMPANY_SUFFIXES: &[&str] = &["LLC", "Inc", "Group", "Ltd"];
const STREETS: &[&str] = &["Main St", "Oak Ave", "Maple Dr", "Cedar Ln", "Pine Rd", "Elm St"];
const CITIES: &[(&str, &str)] = &[
    ("Springfield", "IL"),
    ("Portland", "OR"),
    ("Austin", "TX"),
    ("Madison", "WI"),
    ("Boulder", "CO"),
    ("Salem", "MA"),
];

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Start of the current decade (UTC) and now, truncated to whole seconds.
fn this_decade() -> (i64, i64) {
    let now = Utc::now();
    let year = now.year() - now.year().rem_euclid(10);
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start.timestamp(), now.timestamp())
}

fn instant_between<R: Rng>(rng: &mut R, from: i64, to: i64) -> DateTime<Utc> {
    let secs = if from < to { rng.gen_range(from..=to) } else { to };
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

pub struct CustomerFactory<R = StdRng> {
    rng: R,
}

impl CustomerFactory<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for CustomerFactory<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> CustomerFactory<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// One customer's attributes. `type` is `I` or `B`; businesses get a company name.
    pub fn definition(&mut self) -> NewCustomer {
        let rng = &mut self.rng;
        let kind = if rng.gen_bool(0.5) { "I" } else { "B" };
        let name = if kind == "I" {
            format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
        } else {
            format!("{} {}", pick(rng, COMPANY_WORDS), pick(rng, COMPANY_SUFFIXES))
        };
        let handle: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
            .collect::<String>()
            .to_ascii_lowercase()
            .replace(' ', ".");
        let (city, state) = CITIES.choose(rng).copied().unwrap_or(("Springfield", "IL"));

        NewCustomer {
            email: format!("{handle}{}@example.com", rng.gen_range(1..1000)),
            address: format!("{} {}", rng.gen_range(1..9999), pick(rng, STREETS)),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: format!("{:05}", rng.gen_range(10000..99999)),
            kind: kind.to_string(),
            name,
        }
    }

    pub fn make_many(&mut self, count: usize) -> Vec<NewCustomer> {
        (0..count).map(|_| self.definition()).collect()
    }

    pub async fn create(&mut self, svc: &Service) -> Result<Customer, DomainError> {
        let new = self.definition();
        svc.create_customer(new).await
    }

    pub async fn create_many(&mut self, svc: &Service, count: usize) -> Result<Vec<Customer>, DomainError> {
        let mut out = Vec::with_capacity(count);
        for new in self.make_many(count) {
            out.push(svc.create_customer(new).await?);
        }
        Ok(out)
    }
}

/// Builds invoices; each one gets a fresh parent customer unless `for_customer` is set.
pub struct InvoiceFactory<R = StdRng> {
    rng: R,
    customer_id: Option<i32>,
    status: Option<InvoiceStatus>,
}

impl InvoiceFactory<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for InvoiceFactory<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Send> InvoiceFactory<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            customer_id: None,
            status: None,
        }
    }

    pub fn for_customer(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Pin the status instead of drawing it.
    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// One invoice's attributes. `paid_date` is set only for paid invoices and never
    /// precedes `billed_date`.
    pub fn definition(&mut self, customer_id: i32) -> NewInvoice {
        let rng = &mut self.rng;
        let status = match self.status {
            Some(s) => s,
            None => InvoiceStatus::ALL
                .choose(rng)
                .copied()
                .unwrap_or(InvoiceStatus::Billed),
        };
        let (start, now) = this_decade();
        let billed_date = instant_between(rng, start, now);
        let paid_date = (status == InvoiceStatus::Paid)
            .then(|| instant_between(rng, billed_date.timestamp(), now));

        NewInvoice {
            customer_id,
            amount: rng.gen_range(100..=1000),
            status,
            billed_date,
            paid_date,
        }
    }

    pub fn make_many(&mut self, customer_id: i32, count: usize) -> Vec<NewInvoice> {
        (0..count).map(|_| self.definition(customer_id)).collect()
    }

    async fn parent(&mut self, svc: &Service) -> Result<i32, DomainError> {
        match self.customer_id {
            Some(id) => Ok(id),
            None => Ok(CustomerFactory::with_rng(&mut self.rng).create(svc).await?.id),
        }
    }

    pub async fn create(&mut self, svc: &Service) -> Result<Invoice, DomainError> {
        let customer_id = self.parent(svc).await?;
        let new = self.definition(customer_id);
        svc.create_invoice(new).await
    }

    /// With a fixed customer the batch goes through one bulk insert.
    pub async fn create_many(&mut self, svc: &Service, count: usize) -> Result<Vec<Invoice>, DomainError> {
        if let Some(customer_id) = self.customer_id {
            let batch = self.make_many(customer_id, count);
            return svc.bulk_create_invoices(batch).await;
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.create(svc).await?);
        }
        Ok(out)
    }
}

/// Rows written by [`seed`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub invoices: usize,
}

/// `(customers, invoices per customer)` for the demo data set.
pub const SEED_PLAN: &[(usize, usize)] = &[(25, 10), (100, 5), (100, 3), (5, 0)];

/// Populate the store with demo customers and their invoices.
pub async fn seed(svc: &Service, plan: &[(usize, usize)]) -> Result<SeedSummary, DomainError> {
    let mut rng = StdRng::from_entropy();
    let mut summary = SeedSummary::default();
    for &(customers, per_customer) in plan {
        let created = CustomerFactory::with_rng(&mut rng)
            .create_many(svc, customers)
            .await?;
        summary.customers += created.len();
        for customer in created {
            let invoices = InvoiceFactory::with_rng(&mut rng)
                .for_customer(customer.id)
                .create_many(svc, per_customer)
                .await?;
            summary.invoices += invoices.len();
        }
    }
    info!(
        customers = summary.customers,
        invoices = summary.invoices,
        "Seeded billing data"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_date_iff_paid() {
        let mut f = InvoiceFactory::seeded(7);
        for inv in f.make_many(1, 500) {
            assert_eq!(
                inv.paid_date.is_some(),
                inv.status == InvoiceStatus::Paid,
                "{inv:?}"
            );
            if let Some(paid) = inv.paid_date {
                assert!(paid >= inv.billed_date);
            }
        }
    }

    #[test]
    fn amounts_and_dates_in_range() {
        let (start, _) = this_decade();
        let mut f = InvoiceFactory::seeded(11);
        for inv in f.make_many(3, 300) {
            assert!((100..=1000).contains(&inv.amount));
            assert_eq!(inv.customer_id, 3);
            let ts = inv.billed_date.timestamp();
            assert!(ts >= start && ts <= Utc::now().timestamp());
        }
    }

    #[test]
    fn all_statuses_drawn() {
        let mut f = InvoiceFactory::seeded(3);
        let drawn: Vec<_> = f.make_many(1, 200).into_iter().map(|i| i.status).collect();
        for st in InvoiceStatus::ALL {
            assert!(drawn.contains(&st), "{st} never drawn");
        }
    }

    #[test]
    fn pinned_status_is_kept() {
        let mut f = InvoiceFactory::seeded(5).with_status(InvoiceStatus::Void);
        assert!(f
            .make_many(1, 50)
            .iter()
            .all(|i| i.status == InvoiceStatus::Void && i.paid_date.is_none()));
    }

    #[test]
    fn customer_kind_and_fields() {
        let mut f = CustomerFactory::seeded(1);
        for c in f.make_many(100) {
            assert!(c.kind == "I" || c.kind == "B");
            assert!(!c.name.is_empty());
            assert!(c.email.ends_with("@example.com"));
            assert_eq!(c.postal_code.len(), 5);
        }
    }
}
