// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::SecondsFormat;
use chrono::TimeDelta;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// Milliseconds in a day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// An instant in UTC, with millisecond precision. Persisted as the number of
/// milliseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        // Truncate so that a value read back from the database compares
        // equal to the value that was written.
        Self::from_millis(Utc::now().timestamp_millis()).unwrap_or(Self(Utc::now()))
    }

    pub fn from_millis(ms: i64) -> Fallible<Self> {
        DateTime::from_timestamp_millis(ms)
            .map(Self)
            .ok_or_else(|| ErrorReport::new(format!("timestamp out of range: {ms}")))
    }

    pub fn into_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Add a (possibly fractional) number of days.
    pub fn add_days(self, days: f64) -> Fallible<Self> {
        let ms = days * MS_PER_DAY as f64;
        if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
            return Err(ErrorReport::new(format!("invalid day offset: {days}")));
        }
        TimeDelta::try_milliseconds(ms.round() as i64)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
            .ok_or_else(|| ErrorReport::new(format!("timestamp overflow adding {days} days")))
    }

    /// The calendar date of this instant in the local timezone.
    pub fn local_date(self) -> NaiveDate {
        self.0.with_timezone(&Local).date_naive()
    }

    pub fn duration_since(self, earlier: Timestamp) -> TimeDelta {
        self.0 - earlier.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.into_millis()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let ms: i64 = FromSql::column_result(value)?;
        Timestamp::from_millis(ms).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.into_millis())
    }
}
