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

use std::path::Path;

use tempfile::TempDir;
use tempfile::tempdir;

use crate::collection::Collection;
use crate::error::Fallible;

/// Create an empty collection directory. It is deleted when the returned
/// handle is dropped.
pub fn create_tmp_collection() -> Fallible<TempDir> {
    Ok(tempdir()?)
}

pub fn open_collection(dir: &Path) -> Fallible<Collection> {
    Collection::new(Some(dir.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tmp_collection() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let coll = open_collection(dir.path())?;
        assert!(coll.db.get_all_flashcards()?.is_empty());
        Ok(())
    }
}
