use anyhow::Result;
use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::db::types::{Column, ResultSet, Value};
use crate::error::{AppError, ErrorKind};

pub type SqlClient = tiberius::Client<Compat<TcpStream>>;

pub async fn run_query(
    query: tiberius::Query<'_>,
    client: &mut SqlClient,
) -> Result<Vec<ResultSet>> {
    let stream = query
        .query(client)
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    collect_result_sets(stream).await
}

/// Run a query that yields a single result set; an empty response reads as no rows.
pub async fn run_single(query: tiberius::Query<'_>, client: &mut SqlClient) -> Result<ResultSet> {
    let result_sets = run_query(query, client).await?;
    Ok(result_sets.into_iter().next().unwrap_or_default())
}

pub async fn run_statement(sql: &str, client: &mut SqlClient) -> Result<u64> {
    let result = client
        .execute(sql, &[])
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;
    Ok(result.total())
}

pub async fn collect_result_sets(stream: tiberius::QueryStream<'_>) -> Result<Vec<ResultSet>> {
    let result_sets = stream
        .into_results()
        .await
        .map_err(|err| AppError::new(ErrorKind::Query, err.to_string()))?;

    let output = result_sets
        .into_iter()
        .map(|rows| {
            let columns = rows
                .first()
                .map(|row| {
                    row.columns()
                        .iter()
                        .map(|col| Column {
                            name: col.name().to_string(),
                            data_type: None,
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            let rows = rows
                .iter()
                .map(|row| row.cells().map(|(_, data)| map_column_data(data)).collect())
                .collect();
            ResultSet { columns, rows }
        })
        .collect();

    Ok(output)
}

fn map_column_data(data: &tiberius::ColumnData<'_>) -> Value {
    use tiberius::ColumnData as Data;
    let text = |value: Option<String>| value.map(Value::Text).unwrap_or(Value::Null);
    match data {
        Data::U8(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        Data::I16(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        Data::I32(value) => value.map(|v| Value::Int(v as i64)).unwrap_or(Value::Null),
        Data::I64(value) => value.map(Value::Int).unwrap_or(Value::Null),
        Data::F32(value) => value.map(|v| Value::Float(v as f64)).unwrap_or(Value::Null),
        Data::F64(value) => value.map(Value::Float).unwrap_or(Value::Null),
        Data::Bit(value) => value.map(Value::Bool).unwrap_or(Value::Null),
        Data::String(value) => text(value.as_ref().map(|v| v.to_string())),
        Data::Guid(value) => text(value.as_ref().map(|v| v.to_string())),
        Data::Binary(value) => text(value.as_ref().map(|v| format!("{:?}", v))),
        Data::Numeric(value) => text(value.as_ref().map(|v| v.to_string())),
        Data::Xml(value) => text(value.as_ref().map(|v| v.to_string())),
        // DATETIME: days since 1900-01-01 plus 1/300ths of a second.
        Data::DateTime(value) => text(value.as_ref().and_then(|v| {
            let millis = i64::from(v.seconds_fragments()) * 10 / 3;
            from_1900(i64::from(v.days()), Duration::milliseconds(millis))
        })),
        // SMALLDATETIME: days since 1900-01-01 plus minutes.
        Data::SmallDateTime(value) => text(value.as_ref().and_then(|v| {
            from_1900(
                i64::from(v.days()),
                Duration::minutes(i64::from(v.seconds_fragments())),
            )
        })),
        #[cfg(feature = "tds73")]
        Data::Time(value) => text(value.and_then(|v| tds_time(v).map(|t| t.to_string()))),
        #[cfg(feature = "tds73")]
        Data::Date(value) => {
            text(value.and_then(|v| from_year_one(v.days()).map(|d| d.to_string())))
        }
        #[cfg(feature = "tds73")]
        Data::DateTime2(value) => text(value.and_then(|v| {
            let date = from_year_one(v.date().days())?;
            let time = tds_time(v.time())?;
            Some(NaiveDateTime::new(date, time).to_string())
        })),
        #[cfg(feature = "tds73")]
        Data::DateTimeOffset(value) => text(value.and_then(|v| {
            let date = from_year_one(v.datetime2().date().days())?;
            let time = tds_time(v.datetime2().time())?;
            let offset = v.offset();
            let sign = if offset >= 0 { '+' } else { '-' };
            let abs = offset.unsigned_abs();
            Some(format!(
                "{} {}{:02}:{:02}",
                NaiveDateTime::new(date, time),
                sign,
                abs / 60,
                abs % 60
            ))
        })),
    }
}

fn from_1900(days: i64, time_of_day: Duration) -> Option<String> {
    let base = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let stamp = base
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(time_of_day)?;
    Some(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(feature = "tds73")]
fn from_year_one(days: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1, 1, 1)?.checked_add_days(Days::new(u64::from(days)))
}

#[cfg(feature = "tds73")]
fn tds_time(time: tiberius::time::Time) -> Option<NaiveTime> {
    let nanos = time.increments() * 10u64.pow(9 - u32::from(time.scale()));
    let secs = u32::try_from(nanos / 1_000_000_000).ok()?;
    let frac = u32::try_from(nanos % 1_000_000_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_legacy_datetime() {
        assert_eq!(
            from_1900(45_000, Duration::seconds(3_661)).as_deref(),
            Some("2023-03-17 01:01:01")
        );
    }

    #[test]
    fn maps_text_and_null_cells() {
        let text = tiberius::ColumnData::String(Some("LCK_M_S".into()));
        assert_eq!(map_column_data(&text), Value::Text("LCK_M_S".to_string()));
        assert_eq!(
            map_column_data(&tiberius::ColumnData::String(None)),
            Value::Null
        );
        assert_eq!(map_column_data(&tiberius::ColumnData::I16(Some(52))), Value::Int(52));
    }

    #[cfg(feature = "tds73")]
    #[test]
    fn converts_date_from_year_one() {
        let date = from_year_one(738_885).expect("date");
        assert_eq!(date.to_string(), "2024-01-01");
    }
}
