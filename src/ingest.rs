//! Ingestion orchestrator
//!
//! For every Pokémon id in the fixed range:
//! 1. Fetch the Pokémon and open a write session
//! 2. Upsert the Pokémon row
//! 3. For each type reference: fetch + upsert on a cache miss, then link
//! 4. Same for move references
//! 5. Commit
//!
//! One commit per Pokémon is the atomicity boundary. The reference cache
//! outlives each session and lasts for the whole run; a URL enters it only
//! after the session that wrote its row has committed.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{Fetch, ResourceClient};
use crate::cache::ReferenceCache;
use crate::model::{MoveInfo, ResourceKind, TypeInfo};
use crate::storage::{Session, SqliteStore};
use crate::{output, ui, Error, Result};

/// First Pokémon id ingested
pub const FIRST_ID: i64 = 1;
/// Last Pokémon id ingested (inclusive)
pub const LAST_ID: i64 = 15;

/// What to do when the API answers a fetch with a non-success status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// End the run; the Pokémon in progress is rolled back
    #[default]
    Abort,
    /// Skip the Pokémon, or the single type/move link, and keep going
    Skip,
}

/// A type or move: something a Pokémon links to through a URL
trait Linked: std::fmt::Display + Sized {
    const KIND: ResourceKind;

    fn id(&self) -> i64;
    fn fetch<C: ResourceClient>(client: &C, url: &str) -> Result<Fetch<Self>>;
    fn upsert(&self, session: &mut Session<'_>) -> Result<()>;
    fn link(session: &mut Session<'_>, pokemon_id: i64, id: i64) -> Result<()>;
}

impl Linked for TypeInfo {
    const KIND: ResourceKind = ResourceKind::Type;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch<C: ResourceClient>(client: &C, url: &str) -> Result<Fetch<Self>> {
        client.fetch_type(url)
    }

    fn upsert(&self, session: &mut Session<'_>) -> Result<()> {
        session.upsert_type(self)
    }

    fn link(session: &mut Session<'_>, pokemon_id: i64, id: i64) -> Result<()> {
        session.link_pokemon_type(pokemon_id, id)
    }
}

impl Linked for MoveInfo {
    const KIND: ResourceKind = ResourceKind::Move;

    fn id(&self) -> i64 {
        self.id
    }

    fn fetch<C: ResourceClient>(client: &C, url: &str) -> Result<Fetch<Self>> {
        client.fetch_move(url)
    }

    fn upsert(&self, session: &mut Session<'_>) -> Result<()> {
        session.upsert_move(self)
    }

    fn link(session: &mut Session<'_>, pokemon_id: i64, id: i64) -> Result<()> {
        session.link_pokemon_move(pokemon_id, id)
    }
}

/// Per-kind tallies for one Pokémon's reference list
#[derive(Debug, Default)]
struct LinkTally {
    fetched: usize,
    linked: usize,
    null: usize,
    missing: usize,
}

/// Statistics from an ingestion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub pokemon_stored: usize,
    pub pokemon_skipped: usize,
    pub types_fetched: usize,
    pub moves_fetched: usize,
    pub type_links: usize,
    pub move_links: usize,
    pub cache_hits: usize,
    pub null_references: usize,
    pub missing_references: usize,
}

impl IngestStats {
    fn absorb(&mut self, kind: ResourceKind, tally: LinkTally) {
        match kind {
            ResourceKind::Type => {
                self.types_fetched += tally.fetched;
                self.type_links += tally.linked;
            }
            ResourceKind::Move => {
                self.moves_fetched += tally.fetched;
                self.move_links += tally.linked;
            }
            ResourceKind::Pokemon => {}
        }
        self.null_references += tally.null;
        self.missing_references += tally.missing;
    }

    /// Label/value pairs for the summary table
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Pokemon stored", self.pokemon_stored.to_string()),
            ("Pokemon skipped", self.pokemon_skipped.to_string()),
            ("Types fetched", self.types_fetched.to_string()),
            ("Moves fetched", self.moves_fetched.to_string()),
            ("Type links", self.type_links.to_string()),
            ("Move links", self.move_links.to_string()),
            ("Cache hits", self.cache_hits.to_string()),
            ("Null references", self.null_references.to_string()),
            ("Missing references", self.missing_references.to_string()),
        ]
    }
}

/// Map a non-resolved fetch onto the run's missing-resource policy.
///
/// `Ok(None)` means "skip this one".
fn settle<T>(fetched: Fetch<T>, kind: ResourceKind, locator: &str, policy: MissingPolicy) -> Result<Option<T>> {
    match fetched {
        Fetch::Resolved(value) => Ok(Some(value)),
        Fetch::NotFound => match policy {
            MissingPolicy::Abort => Err(Error::NotFound {
                kind: kind.as_str(),
                locator: locator.to_string(),
            }),
            MissingPolicy::Skip => {
                warn!("Skipping {} {}: not found", kind, locator);
                Ok(None)
            }
        },
        Fetch::TransientError(reason) => Err(Error::Transient {
            locator: locator.to_string(),
            reason,
        }),
    }
}

fn report_resolved(kind: ResourceKind, record: &dyn std::fmt::Display) {
    debug!("Resolved {}: {}", kind, record);
    if !output::is_quiet() {
        ui::resolved(kind, &record.to_string());
    }
}

/// Drives one ingestion run over a client and a store
pub struct Ingestor<'a, C: ResourceClient> {
    client: &'a C,
    store: &'a mut SqliteStore,
    cache: ReferenceCache,
    policy: MissingPolicy,
    stats: IngestStats,
}

impl<'a, C: ResourceClient> Ingestor<'a, C> {
    pub fn new(client: &'a C, store: &'a mut SqliteStore) -> Self {
        Self {
            client,
            store,
            cache: ReferenceCache::new(),
            policy: MissingPolicy::default(),
            stats: IngestStats::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// Ingest the fixed id range
    pub fn run(&mut self) -> Result<IngestStats> {
        self.run_range(FIRST_ID..=LAST_ID)
    }

    /// Ingest every id in `ids`, in order, committing after each one
    pub fn run_range(&mut self, ids: RangeInclusive<i64>) -> Result<IngestStats> {
        info!("Ingesting pokemon {}..={}", ids.start(), ids.end());
        for id in ids {
            self.ingest_one(id)?;
        }
        self.stats.cache_hits = self.cache.hits();
        Ok(self.stats.clone())
    }

    /// Fetch, write and commit a single Pokémon with all of its links
    pub fn ingest_one(&mut self, id: i64) -> Result<()> {
        let fetched = self.client.fetch_pokemon(id)?;
        let Some(pokemon) = settle(fetched, ResourceKind::Pokemon, &id.to_string(), self.policy)? else {
            self.stats.pokemon_skipped += 1;
            return Ok(());
        };
        report_resolved(ResourceKind::Pokemon, &pokemon);

        let mut session = self.store.open_session()?;
        session.upsert_pokemon(&pokemon)?;

        // Types and moves first fetched for this Pokémon; they only join the
        // run cache once their rows are committed.
        let mut pending = ReferenceCache::new();

        let types = link_all::<C, TypeInfo>(
            self.client,
            &mut self.cache,
            &mut pending,
            &mut session,
            self.policy,
            pokemon.id,
            &pokemon.type_refs,
        )?;
        let moves = link_all::<C, MoveInfo>(
            self.client,
            &mut self.cache,
            &mut pending,
            &mut session,
            self.policy,
            pokemon.id,
            &pokemon.move_refs,
        )?;

        session.commit()?;
        self.cache.merge(pending);

        self.stats.absorb(ResourceKind::Type, types);
        self.stats.absorb(ResourceKind::Move, moves);
        self.stats.pokemon_stored += 1;
        Ok(())
    }
}

/// Resolve a Pokémon's reference list and write one link per resolvable entry.
///
/// Records fetched here go into `pending`, not `cache`.
fn link_all<C: ResourceClient, T: Linked>(
    client: &C,
    cache: &mut ReferenceCache,
    pending: &mut ReferenceCache,
    session: &mut Session<'_>,
    policy: MissingPolicy,
    pokemon_id: i64,
    references: &[Option<String>],
) -> Result<LinkTally> {
    let mut tally = LinkTally::default();

    for (position, reference) in references.iter().enumerate() {
        let Some(url) = reference else {
            warn!(
                "Pokemon {} has a null {} reference at position {}; no link written",
                pokemon_id,
                T::KIND,
                position
            );
            tally.null += 1;
            continue;
        };

        let id = match cache.lookup(url).or_else(|| pending.peek(url)) {
            Some(id) => id,
            None => {
                let Some(record) = settle(T::fetch(client, url)?, T::KIND, url, policy)? else {
                    tally.missing += 1;
                    continue;
                };
                report_resolved(T::KIND, &record);
                record.upsert(session)?;
                pending.insert(url.as_str(), record.id());
                tally.fetched += 1;
                pending
                    .peek(url)
                    .ok_or_else(|| Error::UnresolvedReference(url.clone()))?
            }
        };
        T::link(session, pokemon_id, id)?;
        tally.linked += 1;
    }

    Ok(tally)
}
