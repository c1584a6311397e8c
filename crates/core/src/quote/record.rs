//! Stored quote submissions

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{CoverageType, PricingResult, ValidatedQuote};

/// Days a quote stays open by default
pub const QUOTE_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

/// A priced quote as offered to a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: Uuid,
    pub partner_id: Option<String>,
    pub event_type: String,
    pub coverage_type: CoverageType,
    pub participants: u32,
    pub event_date: DateTime<Utc>,
    pub pricing: PricingResult,
    pub status: QuoteStatus,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl QuoteRecord {
    pub fn new(
        quote: &ValidatedQuote,
        pricing: PricingResult,
        partner_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::with_validity(quote, pricing, partner_id, now, Duration::days(QUOTE_VALIDITY_DAYS))
    }

    pub fn with_validity(
        quote: &ValidatedQuote,
        pricing: PricingResult,
        partner_id: Option<String>,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            partner_id,
            event_type: quote.event_type().to_string(),
            coverage_type: pricing.coverage_type,
            participants: quote.participants(),
            event_date: quote.event_date(),
            pricing,
            status: QuoteStatus::Pending,
            customer_email: quote.customer_email().map(str::to_string),
            customer_name: quote.customer_name().map(str::to_string),
            created_at: now,
            expires_at: now.checked_add_signed(validity).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{pricing_engine, quote_input, validator};
    use crate::quote::IssueCode;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn record(email: Option<&str>, name: Option<&str>) -> QuoteRecord {
        let mut input = quote_input(Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap());
        input.customer_email = email.map(str::to_string);
        input.customer_name = name.map(str::to_string);
        let quote = validator().validate(input, now()).unwrap();
        let pricing = pricing_engine().calculate_pricing(&quote);
        QuoteRecord::new(&quote, pricing, Some("partner-1".into()), now())
    }

    #[test]
    fn test_new_record_is_pending_for_thirty_days() {
        let record = record(Some("sam@example.com"), Some("Sam Lee"));

        assert_eq!(record.status, QuoteStatus::Pending);
        assert_eq!(record.expires_at - record.created_at, Duration::days(30));
        assert!(!record.is_expired(now() + Duration::days(29)));
        assert!(record.is_expired(now() + Duration::days(31)));
    }

    #[test]
    fn test_oversized_validity_saturates() {
        let input = quote_input(Utc.with_ymd_and_hms(2025, 3, 12, 10, 0, 0).unwrap());
        let quote = validator().validate(input, now()).unwrap();
        let pricing = pricing_engine().calculate_pricing(&quote);

        let record = QuoteRecord::with_validity(&quote, pricing, None, now(), Duration::days(100_000_000));

        assert_eq!(record.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!record.is_expired(now()));
    }

    #[test]
    fn test_policy_conversion_checks() {
        let v = validator();

        let ready = record(Some("sam@example.com"), Some("Sam Lee"));
        assert!(v.validate_quote_for_policy(&ready, now()).is_valid());

        let anonymous = record(None, None);
        let report = v.validate_quote_for_policy(&anonymous, now());
        assert!(report.has_error(IssueCode::CustomerEmailRequired));
        assert!(report.has_error(IssueCode::CustomerNameRequired));

        let mut declined = ready.clone();
        declined.status = QuoteStatus::Declined;
        let report = v.validate_quote_for_policy(&declined, now() + Duration::days(45));
        assert!(report.has_error(IssueCode::QuoteInvalidStatus));
        assert!(report.has_error(IssueCode::QuoteExpired));
    }
}
