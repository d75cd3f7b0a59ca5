/*
 * Responsibility
 * - GET /batch の query / response DTO
 * - type は small | big のみ受け付ける
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchType {
    Small,
    Big,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    #[serde(rename = "type")]
    pub batch_type: BatchType,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_type: BatchType,
    pub requested_by: String,
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use axum::{extract::Query, http::Uri};

    use super::*;

    fn parse(uri: &'static str) -> Option<BatchType> {
        Query::<BatchQuery>::try_from_uri(&Uri::from_static(uri))
            .ok()
            .map(|Query(q)| q.batch_type)
    }

    #[test]
    fn only_known_batch_types_parse() -> Result<()> {
        assert_eq!(parse("/batch?type=small"), Some(BatchType::Small));
        assert_eq!(parse("/batch?type=big&extra=1"), Some(BatchType::Big));
        assert_eq!(parse("/batch?type=BIG"), None);
        assert_eq!(parse("/batch?type="), None);
        assert_eq!(parse("/batch"), None);
        Ok(())
    }
}
