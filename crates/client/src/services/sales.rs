//! Sales service and daily statistics.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use poscore_core::{PaymentMethod, Price, SaleId};

use super::Result;
use crate::api::ApiClient;
use crate::models::Sale;
use crate::storage::Storage;

/// Opening hour of the first hourly bucket.
pub const FIRST_HOUR: u32 = 8;
/// Opening hour of the last hourly bucket.
pub const LAST_HOUR: u32 = 19;

/// Revenue and transaction count for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySales {
    pub hour: u32,
    pub revenue: Price,
    pub transactions: usize,
}

impl HourlySales {
    /// `8:00`, `13:00`, ...
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}:00", self.hour)
    }
}

/// Aggregates over today's sales.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_sales: usize,
    pub total_revenue: Price,
    /// One bucket per hour from [`FIRST_HOUR`] to [`LAST_HOUR`] inclusive.
    pub hourly: Vec<HourlySales>,
    /// Sale count per payment method, only for methods that were used.
    pub payment_methods: Vec<(PaymentMethod, usize)>,
}

impl SalesStats {
    /// Compute statistics over a set of sales.
    #[must_use]
    pub fn from_sales(sales: &[Sale]) -> Self {
        let hourly = (FIRST_HOUR..=LAST_HOUR)
            .map(|hour| {
                let in_hour = sales.iter().filter(|sale| sale.date.hour() == hour);
                HourlySales {
                    hour,
                    revenue: in_hour.clone().map(|sale| sale.total).sum(),
                    transactions: in_hour.count(),
                }
            })
            .collect();

        let payment_methods = PaymentMethod::ALL
            .into_iter()
            .map(|method| {
                let count = sales
                    .iter()
                    .filter(|sale| sale.payment_method == method)
                    .count();
                (method, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        Self {
            total_sales: sales.len(),
            total_revenue: sales.iter().map(|sale| sale.total).sum(),
            hourly,
            payment_methods,
        }
    }
}

/// Access to `/sales`.
#[derive(Debug, Clone)]
pub struct SalesService<S> {
    api: ApiClient<S>,
}

impl<S: Storage> SalesService<S> {
    pub const fn new(api: ApiClient<S>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn get_sales(&self) -> Result<Vec<Sale>> {
        let sales: Option<Vec<Sale>> = self.api.get("/sales").await?;
        Ok(sales.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn get_sale(&self, id: &SaleId) -> Result<Sale> {
        Ok(self.api.get(&format!("/sales/{id}")).await?)
    }

    /// Validate and submit a sale.
    ///
    /// # Errors
    ///
    /// An empty sale fails validation without any request being made.
    #[instrument(skip(self, sale), fields(total = %sale.total, items = sale.items.len()))]
    pub async fn create_sale(&self, sale: &Sale) -> Result<Sale> {
        sale.validate()?;
        Ok(self.api.post("/sales", &sale.payload()).await?)
    }

    /// # Errors
    ///
    /// Propagates API failures.
    #[instrument(skip(self))]
    pub async fn get_sales_today(&self) -> Result<Vec<Sale>> {
        let sales: Option<Vec<Sale>> = self.api.get("/sales/today").await?;
        Ok(sales.unwrap_or_default())
    }

    /// Statistics over today's sales.
    ///
    /// # Errors
    ///
    /// Propagates API failures.
    pub async fn get_sales_stats(&self) -> Result<SalesStats> {
        let sales = self.get_sales_today().await?;
        Ok(SalesStats::from_sales(&sales))
    }
}
