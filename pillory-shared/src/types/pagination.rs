use std::fmt;
use std::num::IntErrorKind;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: u64 = 100;
pub const DEFAULT_PER_PAGE: i64 = 20;

/// `page`/`per_page` query parameters.
///
/// Values that do not parse as integers fall back to the defaults instead of
/// rejecting the request; out-of-range values are clamped when read.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub page: i64,
    #[serde(default = "default_per_page", deserialize_with = "lenient_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 { 1 }
fn default_per_page() -> i64 { DEFAULT_PER_PAGE }

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(deserializer.deserialize_any(LenientInt)?.unwrap_or_else(default_page))
}

fn lenient_per_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(deserializer.deserialize_any(LenientInt)?.unwrap_or_else(default_per_page))
}

/// Accepts integers or integer strings; anything else yields `None`.
struct LenientInt;

impl<'de> Visitor<'de> for LenientInt {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(parse_int(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

impl PaginationParams {
    /// Page number; anything below 1 is the first page.
    pub fn page(&self) -> u64 {
        self.page.max(1).unsigned_abs()
    }

    /// Row offset, saturating for absurd page numbers.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PER_PAGE as i64).unsigned_abs()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let per_page = params.limit();
        Self {
            items,
            total,
            page: params.page(),
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: i64, per_page: i64) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(params(1, 20).offset(), 0);
        assert_eq!(params(3, 20).offset(), 40);
    }

    #[test]
    fn page_zero_is_first_page() {
        let p = params(0, 10);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(params(1, 500).limit(), MAX_PER_PAGE);
        assert_eq!(params(1, 0).limit(), 1);
        assert_eq!(params(2, 500).offset(), MAX_PER_PAGE);
    }

    #[test]
    fn negative_page_is_first_page() {
        let p = params(-3, 10);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
        assert_eq!(params(1, -5).limit(), 1);
    }

    #[test]
    fn huge_page_offset_saturates() {
        assert_eq!(params(i64::MAX, 20).offset(), u64::MAX);
        assert_eq!(params(i64::MAX, 20).page(), i64::MAX as u64);
    }

    #[test]
    fn unparseable_values_fall_back_to_defaults() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"page":"abc","per_page":"2.5"}"#).unwrap();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn string_values_are_parsed() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"page":" -1 ","per_page":"15"}"#).unwrap();
        assert_eq!(p.page, -1);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 15);

        let huge: PaginationParams =
            serde_json::from_str(r#"{"page":"18446744073709551615","per_page":18446744073709551615}"#)
                .unwrap();
        assert_eq!(huge.page, i64::MAX);
        assert_eq!(huge.limit(), MAX_PER_PAGE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Paginated<u8> = Paginated::new(vec![], 41, &params(1, 20));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.per_page, 20);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, &params(1, 20));
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn defaults_apply_when_missing() {
        let p: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 20);
    }
}
