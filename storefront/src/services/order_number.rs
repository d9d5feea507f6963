// storefront/src/services/order_number.rs

//! Human-readable order labels: `{prefix}-{epoch millis}-{0..=999}`.
//!
//! Two orders created in the same millisecond collide with probability 1/1000;
//! the label is for people, `Order::id` is the key.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};

pub const DEFAULT_PREFIX: &str = "BB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumberParts {
  pub prefix: String,
  pub epoch_millis: i64,
  pub suffix: u16,
}

pub fn generate_order_number(prefix: &str, now: DateTime<Utc>) -> String {
  let suffix = OsRng.next_u32() % 1000;
  format!("{}-{}-{}", prefix, now.timestamp_millis(), suffix)
}

/// Splits a label produced by [`generate_order_number`] back into its parts.
pub fn parse_order_number(label: &str) -> Option<OrderNumberParts> {
  let mut parts = label.rsplitn(3, '-');
  let suffix = parts.next()?.parse::<u16>().ok().filter(|s| *s < 1000)?;
  let epoch_millis = parts.next()?.parse::<i64>().ok()?;
  let prefix = parts.next().filter(|p| !p.is_empty())?;
  Some(OrderNumberParts {
    prefix: prefix.to_string(),
    epoch_millis,
    suffix,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn label_carries_prefix_and_timestamp() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let label = generate_order_number(DEFAULT_PREFIX, now);

    assert!(label.starts_with("BB-1700000000123-"));
    let parts = parse_order_number(&label).unwrap();
    assert_eq!(parts.prefix, "BB");
    assert_eq!(parts.epoch_millis, 1_700_000_000_123);
    assert!(parts.suffix < 1000);
  }

  #[test]
  fn hyphenated_prefixes_survive_parsing() {
    let parts = parse_order_number("BB-MSK-1700000000000-7").unwrap();
    assert_eq!(parts.prefix, "BB-MSK");
    assert_eq!(parts.suffix, 7);
  }

  #[test]
  fn rejects_foreign_labels() {
    assert_eq!(parse_order_number("BB-1700000000000"), None);
    assert_eq!(parse_order_number("BB-abc-12"), None);
    assert_eq!(parse_order_number("BB-1700000000000-1000"), None);
    assert_eq!(parse_order_number("-1700000000000-1"), None);
  }
}
