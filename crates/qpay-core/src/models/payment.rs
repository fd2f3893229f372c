//! Payment check models.
//!
//! The gateway and its client libraries disagree on field casing, so every
//! row field accepts the snake_case, camelCase and `payment_*` spellings and
//! is normalized to one canonical name.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Kind of object a payment check is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Invoice,
    Qr,
    Item,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Invoice => "INVOICE",
            ObjectType::Qr => "QR",
            ObjectType::Item => "ITEM",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Paging window for payment checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Offset {
    pub page_number: u32,
    pub page_limit: u32,
}

impl Default for Offset {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_limit: 100,
        }
    }
}

/// Request body for `POST /v2/payment/check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCheckRequest {
    pub object_type: ObjectType,
    pub object_id: String,
    pub offset: Offset,
}

impl PaymentCheckRequest {
    /// Checks payments made against an invoice.
    pub fn invoice(invoice_id: impl Into<String>) -> Self {
        Self {
            object_type: ObjectType::Invoice,
            object_id: invoice_id.into(),
            offset: Offset::default(),
        }
    }
}

/// Response of `POST /v2/payment/check`.
///
/// Decoding only fails when the body is not an object. Counts, amounts and
/// rows that do not match the expected shape are normalized or dropped, so a
/// paid invoice is never reported as a failed check because of one odd field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentCheckResponse {
    pub count: Option<u64>,
    pub paid_amount: Option<f64>,
    pub rows: Vec<PaymentRow>,
}

impl PaymentCheckResponse {
    /// Whether the gateway reported at least one payment.
    pub fn is_paid(&self) -> bool {
        !self.rows.is_empty()
    }
}

impl<'de> Deserialize<'de> for PaymentCheckResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a payment check object, got {}",
                    other
                )));
            }
        };

        let rows = match take_first(&mut fields, &["rows"]) {
            Some(Value::Array(rows)) => rows.into_iter().map(PaymentRow::from_value).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            count: take_first(&mut fields, &["count"]).and_then(count),
            paid_amount: take_first(&mut fields, &["paid_amount", "paidAmount"]).and_then(amount),
            rows,
        })
    }
}

const PAYMENT_ID_KEYS: &[&str] = &["paymentId", "payment_id"];
const AMOUNT_KEYS: &[&str] = &["amount", "payment_amount", "paymentAmount"];
const PAID_DATE_KEYS: &[&str] = &["paidDate", "paid_date", "payment_date", "paymentDate"];
const METHOD_KEYS: &[&str] = &[
    "paymentMethod",
    "payment_method",
    "payment_wallet",
    "paymentWallet",
];
const STATUS_KEYS: &[&str] = &["paymentStatus", "payment_status"];
const CURRENCY_KEYS: &[&str] = &["currency", "payment_currency", "paymentCurrency"];

/// A single payment reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRow {
    pub payment_id: Option<String>,
    pub amount: Option<f64>,
    pub paid_date: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub currency: Option<String>,

    /// Fields the gateway sent that have no canonical name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentRow {
    /// Normalizes one gateway row. Never fails.
    ///
    /// When several spellings of a field are present, the first one in
    /// canonical order wins and the rest are discarded. Values of the wrong
    /// type are dropped; a row that is not an object is kept under `value`.
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                let mut extra = Map::new();
                extra.insert("value".to_string(), other);
                return Self {
                    extra,
                    ..Self::default()
                };
            }
        };

        Self {
            payment_id: take_first(&mut fields, PAYMENT_ID_KEYS).and_then(text),
            amount: take_first(&mut fields, AMOUNT_KEYS).and_then(amount),
            paid_date: take_first(&mut fields, PAID_DATE_KEYS).and_then(text),
            payment_method: take_first(&mut fields, METHOD_KEYS).and_then(text),
            payment_status: take_first(&mut fields, STATUS_KEYS).and_then(text),
            currency: take_first(&mut fields, CURRENCY_KEYS).and_then(text),
            extra: fields,
        }
    }
}

impl<'de> Deserialize<'de> for PaymentRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Removes every listed key and returns the first non-null value, in key order.
fn take_first(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = fields.remove(*key)
            && found.is_none()
            && !value.is_null()
        {
            found = Some(value);
        }
    }
    found
}

/// Strings pass through; numbers and booleans are rendered as text.
fn text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts a number or a numeric string such as `"100.00"` or `"5,000.00"`.
fn amount(value: Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            digits.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

fn count(value: Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_request_wire_format() {
        let req = PaymentCheckRequest::invoice("INV123");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            json!({
                "object_type": "INVOICE",
                "object_id": "INV123",
                "offset": {"page_number": 1, "page_limit": 100}
            })
        );
    }

    #[test]
    fn test_row_from_gateway_spelling() {
        let row: PaymentRow = serde_json::from_value(json!({
            "payment_id": "593744473409193",
            "payment_status": "PAID",
            "payment_date": "2024-03-01T10:15:00",
            "payment_fee": "1.00",
            "payment_amount": "100.00",
            "payment_currency": "MNT",
            "payment_wallet": "Khan bank",
            "transaction_type": "P2P"
        }))
        .unwrap();

        assert_eq!(row.payment_id.as_deref(), Some("593744473409193"));
        assert_eq!(row.amount, Some(100.0));
        assert_eq!(row.paid_date.as_deref(), Some("2024-03-01T10:15:00"));
        assert_eq!(row.payment_method.as_deref(), Some("Khan bank"));
        assert_eq!(row.currency.as_deref(), Some("MNT"));
        assert_eq!(row.extra["transaction_type"], "P2P");
    }

    #[test]
    fn test_row_from_camel_case_spelling() {
        let row: PaymentRow = serde_json::from_value(json!({
            "paymentId": 42,
            "amount": 5000,
            "paidDate": "2024-03-01",
            "paymentMethod": "CARD"
        }))
        .unwrap();

        assert_eq!(row.payment_id.as_deref(), Some("42"));
        assert_eq!(row.amount, Some(5000.0));
        assert_eq!(row.paid_date.as_deref(), Some("2024-03-01"));
        assert_eq!(row.payment_method.as_deref(), Some("CARD"));
        assert!(row.extra.is_empty());
    }

    #[test]
    fn test_row_serializes_canonical_names() {
        let row: PaymentRow = serde_json::from_value(json!({
            "payment_id": "p1",
            "paid_date": "2024-03-01",
            "payment_method": "QPAY"
        }))
        .unwrap();

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["paymentId"], "p1");
        assert_eq!(json["paidDate"], "2024-03-01");
        assert_eq!(json["paymentMethod"], "QPAY");
        assert!(json.get("payment_id").is_none());
    }

    #[test]
    fn test_unparseable_amount_is_dropped() {
        let row: PaymentRow = serde_json::from_value(json!({"payment_id": "p1", "amount": "lots"})).unwrap();
        assert_eq!(row.payment_id.as_deref(), Some("p1"));
        assert_eq!(row.amount, None);
    }

    #[test]
    fn test_odd_rows_still_count_as_paid() {
        let resp: PaymentCheckResponse = serde_json::from_value(json!({
            "count": "1",
            "paid_amount": "5,000.00",
            "rows": [{
                "payment_id": 593744473409193u64,
                "amount": "5,000.00",
                "payment_amount": 4000,
                "payment_date": 1700000000,
                "payment_wallet": {"name": "Khan bank"},
                "card_transactions": []
            }]
        }))
        .unwrap();

        assert!(resp.is_paid());
        assert_eq!(resp.count, Some(1));
        assert_eq!(resp.paid_amount, Some(5000.0));

        let row = &resp.rows[0];
        assert_eq!(row.payment_id.as_deref(), Some("593744473409193"));
        assert_eq!(row.amount, Some(5000.0));
        assert_eq!(row.paid_date.as_deref(), Some("1700000000"));
        assert_eq!(row.payment_method, None);
        assert_eq!(row.extra["card_transactions"], json!([]));
        assert!(row.extra.get("payment_amount").is_none());
    }

    #[test]
    fn test_duplicate_spellings_prefer_canonical() {
        let row: PaymentRow = serde_json::from_value(json!({
            "paymentId": "camel",
            "payment_id": "snake",
            "paidDate": null,
            "payment_date": "2024-03-01"
        }))
        .unwrap();

        assert_eq!(row.payment_id.as_deref(), Some("camel"));
        assert_eq!(row.paid_date.as_deref(), Some("2024-03-01"));
        assert!(row.extra.is_empty());
    }

    #[test]
    fn test_non_object_row_is_kept() {
        let resp: PaymentCheckResponse =
            serde_json::from_value(json!({"rows": ["PAY-1"], "count": null})).unwrap();
        assert!(resp.is_paid());
        assert_eq!(resp.count, None);
        assert_eq!(resp.rows[0].extra["value"], "PAY-1");
    }

    #[test]
    fn test_non_object_response_rejected() {
        let result: Result<PaymentCheckResponse, _> = serde_json::from_value(json!("oops"));
        assert!(result.is_err());
    }

    #[test]
    fn test_check_response_defaults() {
        let resp: PaymentCheckResponse = serde_json::from_value(json!({"count": 0})).unwrap();
        assert!(!resp.is_paid());
        assert!(resp.rows.is_empty());

        let resp: PaymentCheckResponse = serde_json::from_value(json!({
            "count": 1,
            "paid_amount": 5000,
            "rows": [{"payment_id": "p1", "payment_amount": 5000}]
        }))
        .unwrap();
        assert!(resp.is_paid());
        assert_eq!(resp.paid_amount, Some(5000.0));
    }
}
