//! TOML seed data for a lock database.
//!
//! ```toml
//! [[users]]
//! id = "jane"
//! first_name = "Jane"
//! last_name = "Doe"
//! email = "jane@example.com"
//!
//! [[releases]]
//! id = "release-1"
//! title = "Pupil absence"
//!
//! [[releases.sections]]
//! id = "section-1"
//! heading = "Headlines"
//! blocks = ["block-1", "block-2"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use blocklock_core::{BlockId, Error, LockOwner, ReleaseId, SectionId, SqliteStore, UserId};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    pub users: Vec<FixtureUser>,
    pub releases: Vec<FixtureRelease>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixtureUser {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixtureRelease {
    pub id: ReleaseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<FixtureSection>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FixtureSection {
    pub id: SectionId,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub blocks: Vec<BlockId>,
}

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub users: usize,
    pub releases: usize,
    pub sections: usize,
    pub blocks: usize,
}

impl Fixture {
    /// Parse a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read fixture {}: {e}", path.display())))?;
        Self::parse(&content).with_context(|| format!("in fixture {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid fixture: {e}")).into())
    }

    /// Upsert everything into `store`. Existing lock fields are kept.
    pub async fn apply(&self, store: &SqliteStore) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for user in &self.users {
            store
                .insert_user(&LockOwner {
                    id: user.id.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    email: user.email.clone(),
                })
                .await?;
            summary.users += 1;
        }

        for release in &self.releases {
            store.insert_release(&release.id, &release.title).await?;
            summary.releases += 1;

            for section in &release.sections {
                store
                    .insert_section(&section.id, &release.id, &section.heading)
                    .await?;
                summary.sections += 1;

                for block in &section.blocks {
                    store.insert_block(block, &section.id).await?;
                    summary.blocks += 1;
                }
            }
        }

        tracing::info!(
            users = summary.users,
            releases = summary.releases,
            sections = summary.sections,
            blocks = summary.blocks,
            "fixture imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use blocklock_core::{BlockStore, IdentityResolver};

    use super::*;

    const SAMPLE: &str = r#"
[[users]]
id = "jane"
first_name = "Jane"
last_name = "Doe"
email = "jane@example.com"

[[releases]]
id = "release-1"
title = "Pupil absence"

[[releases.sections]]
id = "section-1"
blocks = ["block-1", "block-2"]
"#;

    #[test]
    fn test_parse_sample() -> Result<()> {
        let fixture = Fixture::parse(SAMPLE)?;
        assert_eq!(fixture.users.len(), 1);
        assert_eq!(fixture.releases[0].sections[0].blocks.len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let result = Fixture::parse("[[users]]\nid = \"  \"\n");
        let code = result
            .err()
            .and_then(|e| e.downcast_ref::<Error>().map(Error::code));
        assert_eq!(code, Some("PARSE_ERROR"));
    }

    #[tokio::test]
    async fn test_apply_seeds_store() -> Result<()> {
        let store = SqliteStore::in_memory().await?;
        let summary = Fixture::parse(SAMPLE)?.apply(&store).await?;
        assert_eq!(
            summary,
            ImportSummary {
                users: 1,
                releases: 1,
                sections: 1,
                blocks: 2
            }
        );

        let record = store.load(&BlockId::parse("block-2")?).await?;
        assert_eq!(
            record.and_then(|r| r.release_id).map(String::from),
            Some("release-1".to_string())
        );
        assert!(store.resolve(&UserId::parse("jane")?).await?.is_some());
        Ok(())
    }
}
