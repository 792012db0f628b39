//! Calendar Redis operations.
//!
//! Redis key patterns:
//! - `calendar:{ref}` — submitted date set (JSON), keyed by the opaque
//!   reference handed back to the submitting client

use crate::models::StoredCalendar;
use redis::AsyncCommands;

fn calendar_key(reference: &str) -> String {
    format!("calendar:{}", reference)
}

/// Store a calendar under its reference.
///
/// References are random enough that collisions are negligible; a plain
/// SET keeps the write path simple.
pub async fn save_calendar<C>(
    con: &mut C,
    reference: &str,
    calendar: &StoredCalendar,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = serde_json::to_string(calendar).map_err(super::json_error)?;
    con.set::<_, _, ()>(calendar_key(reference), json).await?;
    Ok(())
}

/// Get a calendar by its reference.
pub async fn get_calendar_by_ref<C>(
    con: &mut C,
    reference: &str,
) -> Result<Option<StoredCalendar>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(calendar_key(reference)).await?;

    match json {
        Some(data) => Ok(Some(
            serde_json::from_str(&data).map_err(super::json_error)?,
        )),
        None => Ok(None),
    }
}
