//! Release ingestion
//!
//! Ingesting one identifier runs five steps in order, each depending on the
//! one before:
//!
//! 1. Fetch the release metadata from the title API
//! 2. Create `release/<code>/`
//! 3. Write the metadata to `release/<code>/data.json`
//! 4. Stream the poster to `release/<code>/poster.jpg`
//! 5. Register the release in its type catalog and every genre catalog

use crate::catalog::CatalogIndex;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::record::ReleaseRecord;
use crate::state::RunState;
use crate::storage::{ensure_dir, write, DumpLayout};
use crate::DumpError;
use url::Url;

/// Downloads releases and files them into the dump
#[derive(Debug, Clone)]
pub struct Ingestor {
    fetcher: Fetcher,
    layout: DumpLayout,
    catalogs: CatalogIndex,
    api_url: Url,
    poster_base_url: Url,
}

impl Ingestor {
    pub fn new(fetcher: Fetcher, layout: DumpLayout, api_url: Url, poster_base_url: Url) -> Self {
        let catalogs = CatalogIndex::new(layout.catalogs_dir());
        Self {
            fetcher,
            layout,
            catalogs,
            api_url,
            poster_base_url,
        }
    }

    /// Metadata URL for `identifier`
    pub fn metadata_url(&self, identifier: &str) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("code", identifier);
        url
    }

    /// Absolute poster URL for a path from the release record
    pub fn poster_url(&self, poster_path: &str) -> Result<Url, DumpError> {
        self.poster_base_url
            .join(poster_path)
            .map_err(|source| DumpError::Url {
                url: poster_path.to_string(),
                source,
            })
    }

    /// Ingests one release, recording every catalog tag in `state`
    ///
    /// Any failing step aborts the remaining ones; files written by earlier
    /// steps are left in place and overwritten by the next attempt.
    pub async fn ingest(
        &self,
        identifier: &str,
        state: &mut RunState,
    ) -> Result<ReleaseRecord, DumpError> {
        let url = self.metadata_url(identifier);
        let raw = self.fetcher.fetch_json(url.as_str()).await?;
        let record = ReleaseRecord::from_value(identifier, raw)?;
        tracing::info!("Release {} fetched", record.id());

        ensure_dir(&self.layout.release_dir(record.code())).await?;
        write(
            &self.layout.release_data_file(record.code()),
            record.to_json_bytes()?,
        )
        .await?;
        tracing::info!("Release {} data saved", record.id());

        let poster_url = self.poster_url(record.poster_path())?;
        self.fetcher
            .fetch_to_file(
                poster_url.as_str(),
                &self.layout.release_poster_file(record.code()),
            )
            .await?;
        tracing::info!("Release {} poster downloaded", record.id());

        self.classify(&record, state).await?;

        Ok(record)
    }

    /// Registers `record` under its type tag and each genre tag
    ///
    /// Catalogs are written one at a time. If one append fails the earlier
    /// ones keep the entry, and the retry in a later run prepends it to them
    /// again.
    async fn classify(
        &self,
        record: &ReleaseRecord,
        state: &mut RunState,
    ) -> Result<(), DumpError> {
        let entry = record.catalog_entry();

        let type_tag = record.type_tag();
        self.catalogs.append(type_tag, &entry).await?;
        state.record_catalog(type_tag);
        tracing::info!("Release {} added to catalog: {}", entry.name, type_tag);

        for genre in record.genre_tags() {
            self.catalogs.append(genre, &entry).await?;
            state.record_catalog(genre);
            tracing::info!("Release {} added to catalog: {}", entry.name, genre);
        }

        Ok(())
    }
}
