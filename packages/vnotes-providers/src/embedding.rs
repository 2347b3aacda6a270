use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` in one request and returns one vector per input, in input order.
pub async fn embed(
	cfg: &vnotes_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?
		.error_for_status()?;
	let json: Value = res.json().await?;

	parse_embedding_response(json, texts.len(), cfg.dimensions as usize)
}

fn parse_embedding_response(
	json: Value,
	expected: usize,
	dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json).map_err(|err| {
		Error::InvalidResponse { message: format!("Malformed embedding response: {err}.") }
	})?;

	if response.data.len() != expected {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding response carries {} vectors for {expected} inputs.",
				response.data.len()
			),
		});
	}

	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);
		let Some(slot) = slots.get_mut(index) else {
			return Err(Error::InvalidResponse {
				message: format!("Embedding index {index} is out of range."),
			});
		};

		if item.embedding.len() != dimensions {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding has {} dimensions, expected {dimensions}.",
					item.embedding.len()
				),
			});
		}
		if slot.replace(item.embedding).is_some() {
			return Err(Error::InvalidResponse {
				message: format!("Embedding index {index} appears twice."),
			});
		}
	}

	// Count matches and indices are unique, so every slot is filled.
	Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn orders_vectors_by_index() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json, 2, 2).expect("Failed to parse embeddings.");

		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn falls_back_to_position_without_index() {
		let json = serde_json::json!({ "data": [{ "embedding": [1.0, 0.0] }] });
		let parsed = parse_embedding_response(json, 1, 2).expect("Failed to parse embeddings.");

		assert_eq!(parsed, vec![vec![1.0, 0.0]]);
	}

	#[test]
	fn rejects_wrong_vector_count() {
		let json = serde_json::json!({ "data": [] });
		let err = parse_embedding_response(json, 1, 2).expect_err("Expected a count error.");

		assert_eq!(err.to_string(), "Embedding response carries 0 vectors for 1 inputs.");
	}

	#[test]
	fn rejects_wrong_dimension() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": [0.1, 0.2, 0.3] }] });
		let err = parse_embedding_response(json, 1, 2).expect_err("Expected a dimension error.");

		assert_eq!(err.to_string(), "Embedding has 3 dimensions, expected 2.");
	}

	#[test]
	fn rejects_duplicate_indices() {
		let json = serde_json::json!({
			"data": [
				{ "index": 0, "embedding": [1.0] },
				{ "index": 0, "embedding": [2.0] }
			]
		});

		assert!(matches!(parse_embedding_response(json, 2, 1), Err(Error::InvalidResponse { .. })));
	}

	#[test]
	fn rejects_error_bodies_and_non_numeric_values() {
		let error_body = serde_json::json!({ "error": { "message": "bad key" } });
		let non_numeric = serde_json::json!({ "data": [{ "index": 0, "embedding": [0.1, "x"] }] });

		assert!(matches!(
			parse_embedding_response(error_body, 1, 2),
			Err(Error::InvalidResponse { .. })
		));
		assert!(matches!(
			parse_embedding_response(non_numeric, 1, 2),
			Err(Error::InvalidResponse { .. })
		));
	}
}
