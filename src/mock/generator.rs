//! Mock record generator
//!
//! Primary fields are skipped while a record is built and assigned
//! afterwards with the collection key generator, seeded with the records
//! generated so far.

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use super::pattern;
use super::words;
use crate::collection::{generate_primary_key_with, random_uuid, CollectionError, CollectionResult};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{Bound, FieldDefinition, FieldType, SchemaDefinition, ValidationRules};
use crate::temporal;

/// Records per generated batch
pub const MOCK_BATCH_SIZE: usize = 10;

/// Dates are drawn from this many days before today
const DATE_WINDOW_DAYS: i64 = 365;

/// Width of the number range when only `min` is given
const DEFAULT_NUMBER_SPAN: f64 = 100.0;

/// Longest string the generator pads up to. A larger `minLength` yields a
/// string that is too short rather than an unbounded allocation.
pub const MAX_MOCK_STRING: usize = 4096;

/// Synthesizes records for a schema
pub struct MockGenerator<R: Rng = StdRng> {
    rng: R,
}

impl MockGenerator<StdRng> {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for MockGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MockGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generates `MOCK_BATCH_SIZE` records with keys assigned in order.
    ///
    /// # Errors
    ///
    /// Fails if the schema has no primary field or its type has no key
    /// generator.
    pub fn generate_batch(&mut self, schema: &SchemaDefinition) -> CollectionResult<Vec<Value>> {
        let primary = schema
            .primary_field()
            .ok_or(CollectionError::MissingPrimaryKey)?;

        let mut batch: Vec<Value> = (0..MOCK_BATCH_SIZE)
            .map(|_| Value::Object(self.generate_fields(schema.fields())))
            .collect();

        for i in 0..batch.len() {
            let key = generate_primary_key_with(schema, &batch[..i], &mut self.rng)?;
            if let Some(record) = batch[i].as_object_mut() {
                record.insert(primary.name.clone(), key);
            }
        }

        log_event_with_fields(
            Event::MockBatchGenerated,
            &[("records", batch.len().to_string().as_str())],
        );
        Ok(batch)
    }

    /// Generates one record whose key follows `existing`.
    pub fn generate_record(
        &mut self,
        schema: &SchemaDefinition,
        existing: &[Value],
    ) -> CollectionResult<Value> {
        let primary = schema
            .primary_field()
            .ok_or(CollectionError::MissingPrimaryKey)?;
        let key = generate_primary_key_with(schema, existing, &mut self.rng)?;

        let mut record = self.generate_fields(schema.fields());
        record.insert(primary.name.clone(), key);
        Ok(Value::Object(record))
    }

    fn generate_fields(&mut self, fields: &[FieldDefinition]) -> Map<String, Value> {
        fields
            .iter()
            .filter(|f| !f.primary)
            .map(|f| (f.name.clone(), self.generate_value(f)))
            .collect()
    }

    fn generate_value(&mut self, field: &FieldDefinition) -> Value {
        let rules = field.rules();
        match field.field_type {
            FieldType::String => Value::String(self.string(&rules)),
            FieldType::Number => self.number(&rules),
            FieldType::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            FieldType::Date => Value::String(temporal::format_date(self.date(&rules))),
            FieldType::Datetime => {
                let seconds = self.rng.gen_range(0..DATE_WINDOW_DAYS * 86_400);
                let at = Utc::now().naive_utc() - Duration::seconds(seconds);
                Value::String(temporal::format_datetime(at))
            }
            FieldType::Email => Value::String(format!(
                "{}.{}{}@example.com",
                words::word(&mut self.rng),
                words::word(&mut self.rng),
                self.rng.gen_range(1..100)
            )),
            FieldType::Url => Value::String(format!(
                "https://www.{}.com/{}",
                words::word(&mut self.rng),
                words::word(&mut self.rng)
            )),
            FieldType::Uuid => Value::String(random_uuid(&mut self.rng).to_string()),
            FieldType::Array => {
                let choice = field
                    .items
                    .as_ref()
                    .and_then(|items| items.enum_values.as_ref())
                    .and_then(|values| values.choose(&mut self.rng))
                    .cloned();
                Value::Array(choice.into_iter().collect())
            }
            FieldType::Object => Value::Object(self.generate_fields(field.nested_fields())),
        }
    }

    fn string(&mut self, rules: &ValidationRules) -> String {
        let mut text = rules
            .pattern
            .as_deref()
            .and_then(|p| pattern::generate(p, &mut self.rng))
            .unwrap_or_else(|| words::phrase(&mut self.rng));

        if let Some(min) = rules.min_length {
            let min = usize::try_from(min)
                .unwrap_or(MAX_MOCK_STRING)
                .min(MAX_MOCK_STRING);
            let missing = min.saturating_sub(text.chars().count());
            text.extend(std::iter::repeat('x').take(missing));
        }
        if let Some(max) = rules.max_length {
            let max = usize::try_from(max).unwrap_or(usize::MAX);
            if text.chars().count() > max {
                text = text.chars().take(max).collect();
            }
        }
        text
    }

    fn number(&mut self, rules: &ValidationRules) -> Value {
        let min = rules.min.as_ref().and_then(|b| b.as_number());
        let max = rules.max.as_ref().and_then(|b| b.as_number());

        let low = min.map(f64::ceil);
        let high = max.map(f64::floor);
        let (low, high) = match (low, high) {
            (Some(l), Some(h)) => (l, h),
            (Some(l), None) => (l, l + DEFAULT_NUMBER_SPAN),
            (None, Some(h)) if h < 0.0 => (h - DEFAULT_NUMBER_SPAN, h),
            (None, Some(h)) => (0.0, h),
            (None, None) => (0.0, DEFAULT_NUMBER_SPAN),
        };

        if low > high {
            // No integer fits between fractional bounds.
            return min.or(max).map_or(json!(0), |n| json!(n));
        }
        if low <= i64::MIN as f64 || high >= i64::MAX as f64 {
            // Outside i64 every f64 is already integral; casting would saturate.
            let n = self.rng.gen_range(low..=high).floor().clamp(low, high);
            return json!(n);
        }
        json!(self.rng.gen_range(low as i64..=high as i64))
    }

    fn date(&mut self, rules: &ValidationRules) -> NaiveDate {
        let bound = |b: Option<&Bound>| {
            b.and_then(|b| b.as_date_str()).and_then(temporal::parse_date)
        };
        let min = bound(rules.min.as_ref());
        let max = bound(rules.max.as_ref());

        let days_back = self.rng.gen_range(0..DATE_WINDOW_DAYS);
        let mut date = Utc::now().date_naive() - Duration::days(days_back);
        if let Some(min) = min {
            date = date.max(min);
        }
        if let Some(max) = max {
            date = date.min(max);
        }
        date
    }
}
