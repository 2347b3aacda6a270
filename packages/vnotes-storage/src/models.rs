use time::OffsetDateTime;
use uuid::Uuid;

pub const TEXT_FIELD: &str = "text";
pub const CREATED_AT_FIELD: &str = "created_at_ms";

#[derive(Clone, Debug, PartialEq)]
pub struct NotePoint {
	pub note_id: Uuid,
	pub text: String,
	pub vector: Vec<f32>,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexedNote {
	pub note_id: Uuid,
	pub text: String,
	pub created_at: Option<OffsetDateTime>,
	pub score: Option<f32>,
}

pub fn unix_ms(ts: OffsetDateTime) -> i64 {
	(ts.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_unix_ms(ms: i64) -> Option<OffsetDateTime> {
	OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000).ok()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn unix_ms_round_trips_at_millisecond_precision() {
		let ts = datetime!(2026-10-16 09:30:15.123 UTC);
		let ms = unix_ms(ts);

		assert_eq!(ms, 1_792_143_015_123);
		assert_eq!(from_unix_ms(ms), Some(ts));
	}
}
