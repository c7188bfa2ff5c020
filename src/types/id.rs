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
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// Number of hex digits of the hash kept in an identifier.
const ID_HEX_LEN: usize = 16;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Derive a fresh identifier of the form `<prefix>_<hex>`.
///
/// The hash covers the record's content, the creation instant, the process
/// ID, and a per-process counter, so two records created in the same
/// millisecond with the same content still get distinct identifiers.
fn derive_id(prefix: &str, content: &[&str], at: Timestamp) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prefix.as_bytes());
    for part in content {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.update(&at.into_millis().to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    hasher.update(&COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    let hex = hasher.finalize().to_hex();
    format!("{prefix}_{}", &hex[..ID_HEX_LEN])
}

macro_rules! record_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(String);

        impl $name {
            pub fn generate(content: &[&str], at: Timestamp) -> Self {
                Self(derive_id($prefix, content, at))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let string: String = FromSql::column_result(value)?;
                Ok(Self(string))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

record_id!(CardId, "card");
record_id!(DeckId, "deck");
record_id!(IdeaId, "idea");
record_id!(SessionId, "session");

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_prefix() -> Fallible<()> {
        let at = Timestamp::from_millis(0)?;
        let id = CardId::generate(&["front", "back"], at);
        assert!(id.to_string().starts_with("card_"));
        let text: &str = id.as_ref();
        assert_eq!(text.len(), "card_".len() + ID_HEX_LEN);
        assert_eq!(CardId::from(id.to_string()), id);
        let id = DeckId::generate(&["Rust"], at);
        assert!(id.to_string().starts_with("deck_"));
        Ok(())
    }

    #[test]
    fn test_same_content_same_instant_is_unique() -> Fallible<()> {
        let at = Timestamp::from_millis(42)?;
        let ids: HashSet<CardId> = (0..100)
            .map(|_| CardId::generate(&["q", "a"], at))
            .collect();
        assert_eq!(ids.len(), 100);
        Ok(())
    }
}
