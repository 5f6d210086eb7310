//! REST client for the hosted database/functions platform

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use crate::{
    config::BackendConfig,
    models::{
        BookingOutcome, BookingRequest, BookingType, ConflictCheck, ConflictQuery, DateRange,
        EnrollmentRow, SessionRow, VenueBookingRow, VenuePolicy,
    },
};

use super::{Backend, BackendError};

const SESSION_COLUMNS: &str = "id,course_id,start_date,start_time,duration_hours,status,course_name";
const BOOKING_COLUMNS: &str = "id,title,date,start_time,end_time,booking_type,status";
const SETTINGS_COLUMNS: &str =
    "closing_time,overtime_cutoff_time,extra_time_price_per_30min,overtime_price_per_30min";

/// PostgREST-style backend: `/rest/v1/<table>`, `/rest/v1/rpc/<fn>`, `/functions/v1/<fn>`
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn table(&self, name: &str) -> RequestBuilder {
        self.authorized(self.client.get(format!("{}/rest/v1/{}", self.base_url, name)))
    }

    fn rpc(&self, name: &str, args: Value) -> RequestBuilder {
        self.authorized(
            self.client
                .post(format!("{}/rest/v1/rpc/{}", self.base_url, name))
                .json(&args),
        )
    }

    async fn read<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, BackendError> {
        let response = Self::checked(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn checked(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Set-returning procedures answer with an array; scalar ones with an object
    fn single_row<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
        let row = match value {
            Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
            Value::Array(_) => return Err(BackendError::Decode("empty result set".to_string())),
            other => other,
        };
        serde_json::from_value(row).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn day(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl Backend for RestBackend {
    async fn fetch_sessions(&self, range: DateRange) -> Result<Vec<SessionRow>, BackendError> {
        let builder = self.table("sessions").query(&[
            ("select", SESSION_COLUMNS.to_string()),
            ("start_date", format!("gte.{}", day(range.start))),
            ("start_date", format!("lte.{}", day(range.end))),
            ("status", "neq.deleted".to_string()),
        ]);
        Self::read(builder).await
    }

    async fn fetch_approved_bookings(
        &self,
        range: DateRange,
    ) -> Result<Vec<VenueBookingRow>, BackendError> {
        let builder = self.table("venue_bookings").query(&[
            ("select", BOOKING_COLUMNS.to_string()),
            ("date", format!("gte.{}", day(range.start))),
            ("date", format!("lte.{}", day(range.end))),
            ("status", "eq.approved".to_string()),
        ]);
        Self::read(builder).await
    }

    async fn fetch_roster(&self, session_id: i64) -> Result<Vec<EnrollmentRow>, BackendError> {
        let builder = self.table("enrollments").query(&[
            ("select", "session_id,student_name".to_string()),
            ("session_id", format!("eq.{}", session_id)),
        ]);
        Self::read(builder).await
    }

    async fn fetch_venue_settings(&self) -> Result<VenuePolicy, BackendError> {
        let builder = self
            .table("venue_settings")
            .query(&[("select", SETTINGS_COLUMNS), ("limit", "1")]);
        let rows: Value = Self::read(builder).await?;
        Self::single_row(rows)
    }

    async fn calculate_booking_price(
        &self,
        booking_type: BookingType,
        quantity: i64,
    ) -> Result<Decimal, BackendError> {
        let builder = self.rpc(
            "calculate_booking_price",
            json!({ "booking_type": booking_type, "quantity": quantity }),
        );
        Self::read(builder).await
    }

    async fn check_booking_conflict(
        &self,
        query: &ConflictQuery,
    ) -> Result<ConflictCheck, BackendError> {
        let args = serde_json::to_value(query).map_err(|e| BackendError::Decode(e.to_string()))?;
        let value: Value = Self::read(self.rpc("check_booking_conflict", args)).await?;
        Self::single_row(value)
    }

    async fn create_booking_request(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingOutcome, BackendError> {
        let args = serde_json::to_value(request).map_err(|e| BackendError::Decode(e.to_string()))?;
        let value: Value = Self::read(self.rpc("create_booking_request", args)).await?;
        Self::single_row(value)
    }

    async fn generate_invoice(&self, invoice_id: &str) -> Result<(), BackendError> {
        let builder = self.authorized(
            self.client
                .post(format!("{}/functions/v1/generate-invoice", self.base_url))
                .json(&json!({ "invoice_id": invoice_id })),
        );
        Self::checked(builder.send().await?).await?;
        Ok(())
    }
}
