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

use std::env::current_dir;
use std::path::PathBuf;

use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

/// The name of the database file in a collection directory.
pub const DATABASE_FILE_NAME: &str = "mindvault.db";

/// A collection directory: the database plus its configuration.
pub struct Collection {
    pub db: Database,
    pub config: Config,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };
        let config = Config::load(&directory)?;
        let db_path: PathBuf = directory.join(DATABASE_FILE_NAME);
        log::debug!("Opening database at {}", db_path.display());
        let db: Database = Database::new(&db_path)?;
        Ok(Self { db, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_collection;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert!(result.is_err());
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: directory does not exist.".to_string())
        );
    }

    #[test]
    fn test_creates_database() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        assert!(dir.path().join(DATABASE_FILE_NAME).exists());
        assert!(coll.db.get_all_decks()?.is_empty());
        assert_eq!(coll.config, Config::default());
        Ok(())
    }
}
