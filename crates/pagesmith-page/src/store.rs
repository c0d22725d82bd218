//! Page state store.
//!
//! Owns the ordered block sequence. Index order is render/export order.
//! Every operation is all-or-nothing against the in-memory sequence, and
//! every successful mutation queues a snapshot with the [`Persister`] (if
//! one is attached). Persistence problems are logged, never returned.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use pagesmith_blocks::{BlockInstance, BlockRegistry, InstanceId};

use crate::persister::Persister;
use crate::snapshot::PageSnapshot;

/// Storage key used when none is configured.
pub const DEFAULT_STATE_KEY: &str = "pagesmith_canvas_state";

/// Direction for [`PageStore::move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("invalid direction '{other}', expected 'up' or 'down'")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Result of a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The block swapped places with its neighbour
    Moved,
    /// The block was already first (moving up) or last (moving down)
    NoOp,
}

/// Errors returned by page mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PageError {
    #[error("Unknown block template: {0}")]
    UnknownTemplate(String),

    #[error("Block not found: {0}")]
    NotFound(String),

    #[error("Block id prefix '{0}' matches more than one block")]
    Ambiguous(String),
}

/// The ordered blocks of one page.
#[derive(Debug)]
pub struct PageStore {
    registry: Arc<BlockRegistry>,
    blocks: Vec<BlockInstance>,
    persister: Option<Persister>,
}

impl PageStore {
    /// Create an empty page without persistence.
    pub fn new(registry: Arc<BlockRegistry>) -> Self {
        Self {
            registry,
            blocks: Vec::new(),
            persister: None,
        }
    }

    /// Create a page backed by `persister`, restoring any saved state.
    ///
    /// A missing, unreadable or incompatible snapshot starts an empty page.
    pub fn open(registry: Arc<BlockRegistry>, persister: Persister) -> Self {
        let blocks = restore(&persister);

        Self {
            registry,
            blocks,
            persister: Some(persister),
        }
    }

    /// Registry used to validate new blocks.
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Blocks in page order.
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id.
    pub fn get(&self, id: &InstanceId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| &b.instance_id == id)
    }

    /// Index of a block in the page.
    pub fn position(&self, id: &InstanceId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.instance_id == id)
    }

    /// Resolve an id or a unique id prefix to a block id.
    pub fn resolve(&self, prefix: &str) -> Result<InstanceId, PageError> {
        if let Some(block) = self.blocks.iter().find(|b| b.instance_id.as_str() == prefix) {
            return Ok(block.instance_id.clone());
        }

        let mut matches = self
            .blocks
            .iter()
            .filter(|b| !prefix.is_empty() && b.instance_id.as_str().starts_with(prefix));

        match (matches.next(), matches.next()) {
            (Some(block), None) => Ok(block.instance_id.clone()),
            (Some(_), Some(_)) => Err(PageError::Ambiguous(prefix.to_string())),
            (None, _) => Err(PageError::NotFound(prefix.to_string())),
        }
    }

    /// Append a new, unedited instance of `template_id` to the end of the page.
    pub fn add_block(&mut self, template_id: &str) -> Result<InstanceId, PageError> {
        if !self.registry.contains(template_id) {
            tracing::warn!("Cannot add block: unknown template '{}'", template_id);
            return Err(PageError::UnknownTemplate(template_id.to_string()));
        }

        let id = loop {
            let candidate = InstanceId::generate();
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };

        self.blocks.push(BlockInstance::new(id.clone(), template_id));
        tracing::debug!("Added block {} ({})", id, template_id);
        self.persist();

        Ok(id)
    }

    /// Set one field override on a block (last write wins).
    ///
    /// The selector is not checked against the template; unknown selectors
    /// are kept but have no visible effect.
    pub fn update_block_content(
        &mut self,
        id: &InstanceId,
        selector: &str,
        value: impl Into<String>,
    ) -> Result<(), PageError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|b| &b.instance_id == id)
            .ok_or_else(|| not_found(id))?;

        block.set_field(selector, value);
        self.persist();
        Ok(())
    }

    /// Remove a block. Following blocks shift up by one.
    pub fn delete_block(&mut self, id: &InstanceId) -> Result<BlockInstance, PageError> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;
        let removed = self.blocks.remove(index);
        tracing::debug!("Deleted block {}", id);
        self.persist();
        Ok(removed)
    }

    /// Swap a block with its neighbour in `direction`.
    pub fn move_block(
        &mut self,
        id: &InstanceId,
        direction: Direction,
    ) -> Result<MoveOutcome, PageError> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < self.blocks.len()),
        };

        let Some(target) = target else {
            return Ok(MoveOutcome::NoOp);
        };

        self.blocks.swap(index, target);
        self.persist();
        Ok(MoveOutcome::Moved)
    }

    /// Remove every block and the saved snapshot.
    pub fn clear(&mut self) {
        self.blocks.clear();
        if let Some(ref persister) = self.persister {
            persister.clear();
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot::capture(&self.blocks)
    }

    /// Wait for queued writes to finish.
    pub async fn flush(&self) {
        if let Some(ref persister) = self.persister {
            persister.flush().await;
        }
    }

    fn persist(&self) {
        let Some(ref persister) = self.persister else {
            return;
        };

        match self.snapshot().encode() {
            Ok(blob) => persister.save(blob),
            Err(err) => persister.report(&err),
        }
    }
}

fn not_found(id: &InstanceId) -> PageError {
    tracing::warn!("Block not found: {}", id);
    PageError::NotFound(id.to_string())
}

fn restore(persister: &Persister) -> Vec<BlockInstance> {
    let bytes = match persister.load() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Vec::new(),
        Err(err) => {
            persister.report(&err);
            return Vec::new();
        }
    };

    match PageSnapshot::decode(&bytes) {
        Ok(snapshot) => {
            tracing::info!("Restored {} blocks from saved state", snapshot.blocks.len());
            snapshot.blocks
        }
        Err(err) => {
            tracing::warn!("Ignoring saved page state: {}", err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use crate::storage::{PersistenceError, PersistenceResult, PersistenceStore};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn registry() -> Arc<BlockRegistry> {
        Arc::new(BlockRegistry::with_defaults())
    }

    fn page_with(ids: &[&str]) -> (PageStore, Vec<InstanceId>) {
        let mut page = PageStore::new(registry());
        let added = ids
            .iter()
            .map(|template| page.add_block(template).unwrap())
            .collect();
        (page, added)
    }

    fn order(page: &PageStore) -> Vec<InstanceId> {
        page.blocks().iter().map(|b| b.instance_id.clone()).collect()
    }

    #[test]
    fn add_appends_with_empty_content() {
        let (page, ids) = page_with(&["hero-simple", "cta-section"]);

        assert_eq!(order(&page), ids);
        assert_eq!(page.blocks()[1].template_id, "cta-section");
        assert!(page.blocks().iter().all(|b| b.content.is_empty()));
    }

    #[test]
    fn add_unknown_template_fails_without_change() {
        let (mut page, _) = page_with(&["hero-simple"]);
        let err = page.add_block("nope").unwrap_err();

        assert_eq!(err, PageError::UnknownTemplate("nope".to_string()));
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn update_merges_fields() {
        let (mut page, ids) = page_with(&["hero-simple"]);

        page.update_block_content(&ids[0], "h1", "One").unwrap();
        page.update_block_content(&ids[0], "p", "Body").unwrap();
        page.update_block_content(&ids[0], "h1", "Two").unwrap();
        page.update_block_content(&ids[0], "h9", "kept").unwrap();

        let block = page.get(&ids[0]).unwrap();
        assert_eq!(block.field("h1"), Some("Two"));
        assert_eq!(block.field("p"), Some("Body"));
        assert_eq!(block.field("h9"), Some("kept"));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (mut page, _) = page_with(&["hero-simple"]);
        let ghost = InstanceId::from("ghost");

        assert!(matches!(
            page.update_block_content(&ghost, "h1", "x"),
            Err(PageError::NotFound(_))
        ));
        assert!(matches!(page.delete_block(&ghost), Err(PageError::NotFound(_))));
        assert!(matches!(
            page.move_block(&ghost, Direction::Up),
            Err(PageError::NotFound(_))
        ));
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn delete_closes_the_gap() {
        let (mut page, ids) = page_with(&["hero-simple", "features-grid", "footer-simple"]);

        let removed = page.delete_block(&ids[1]).unwrap();

        assert_eq!(removed.template_id, "features-grid");
        assert_eq!(order(&page), vec![ids[0].clone(), ids[2].clone()]);
        assert_eq!(page.position(&ids[2]), Some(1));
    }

    #[test]
    fn move_swaps_with_neighbour() {
        let (mut page, ids) = page_with(&["hero-simple", "features-grid", "footer-simple"]);

        assert_eq!(page.move_block(&ids[1], Direction::Up), Ok(MoveOutcome::Moved));
        assert_eq!(order(&page), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);

        assert_eq!(page.move_block(&ids[1], Direction::Down), Ok(MoveOutcome::Moved));
        assert_eq!(order(&page), ids);
    }

    #[test]
    fn moves_past_the_ends_are_noops() {
        let (mut page, ids) = page_with(&["hero-simple", "features-grid", "footer-simple"]);

        assert_eq!(page.move_block(&ids[0], Direction::Up), Ok(MoveOutcome::NoOp));
        assert_eq!(page.move_block(&ids[2], Direction::Down), Ok(MoveOutcome::NoOp));
        assert_eq!(order(&page), ids);
    }

    #[test]
    fn resolves_unique_prefixes() {
        let (page, ids) = page_with(&["hero-simple", "cta-section"]);

        assert_eq!(page.resolve(ids[0].as_str()), Ok(ids[0].clone()));
        assert_eq!(page.resolve(&ids[1].as_str()[..16]), Ok(ids[1].clone()));
        assert_eq!(page.resolve("blk-"), Err(PageError::Ambiguous("blk-".to_string())));
        assert!(matches!(page.resolve("zzz"), Err(PageError::NotFound(_))));
        assert!(matches!(page.resolve(""), Err(PageError::NotFound(_))));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert!("left".parse::<Direction>().is_err());
    }

    #[tokio::test]
    async fn restores_order_and_content_after_restart() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry();

        let mut page = PageStore::open(
            registry.clone(),
            Persister::spawn(store.clone(), DEFAULT_STATE_KEY).unwrap(),
        );
        let a = page.add_block("hero-simple").unwrap();
        let b = page.add_block("features-grid").unwrap();
        let c = page.add_block("contact-form").unwrap();
        page.update_block_content(&a, "h1", "Hello").unwrap();
        page.update_block_content(&c, "button", "Send").unwrap();
        page.flush().await;
        let before = page.blocks().to_vec();
        drop(page);

        let restored = PageStore::open(
            registry,
            Persister::spawn(store, DEFAULT_STATE_KEY).unwrap(),
        );

        assert_eq!(order(&restored), vec![a, b, c]);
        assert_eq!(restored.blocks(), before.as_slice());
    }

    #[tokio::test]
    async fn corrupt_snapshot_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.save(DEFAULT_STATE_KEY, b"\x00garbage{{").unwrap();

        let page = PageStore::open(
            registry(),
            Persister::spawn(store, DEFAULT_STATE_KEY).unwrap(),
        );

        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn incompatible_snapshot_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store
            .save(DEFAULT_STATE_KEY, br#"{"canvasBlocks": [], "timestamp": 1}"#)
            .unwrap();

        let page = PageStore::open(
            registry(),
            Persister::spawn(store, DEFAULT_STATE_KEY).unwrap(),
        );

        assert!(page.is_empty());
    }

    /// Fails every call, so both restore and save go wrong.
    struct FailingStore;

    impl PersistenceStore for FailingStore {
        fn save(&self, _key: &str, _blob: &[u8]) -> PersistenceResult<()> {
            Err(PersistenceError::Io("read-only".to_string()))
        }

        fn load(&self, _key: &str) -> PersistenceResult<Option<Vec<u8>>> {
            Err(PersistenceError::Io("unreachable".to_string()))
        }

        fn clear(&self, _key: &str) -> PersistenceResult<()> {
            Err(PersistenceError::Io("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn persistence_failures_never_reach_mutations() {
        let mut page = PageStore::open(
            registry(),
            Persister::spawn(Arc::new(FailingStore), DEFAULT_STATE_KEY).unwrap(),
        );
        assert!(page.is_empty());

        let id = page.add_block("hero-simple").unwrap();
        page.update_block_content(&id, "h1", "Still here").unwrap();
        page.flush().await;

        assert_eq!(page.get(&id).unwrap().field("h1"), Some("Still here"));
    }

    #[tokio::test]
    async fn clear_removes_saved_state() {
        let store = Arc::new(MemoryStore::new());
        let mut page = PageStore::open(
            registry(),
            Persister::spawn(store.clone(), DEFAULT_STATE_KEY).unwrap(),
        );
        page.add_block("hero-simple").unwrap();
        page.flush().await;
        assert!(store.load(DEFAULT_STATE_KEY).unwrap().is_some());

        page.clear();
        page.flush().await;

        assert!(page.is_empty());
        assert_eq!(store.load(DEFAULT_STATE_KEY).unwrap(), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize),
        Delete(usize),
        Move(usize, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..5).prop_map(Op::Add),
            (0usize..16).prop_map(Op::Delete),
            (0usize..16, any::<bool>()).prop_map(|(i, up)| Op::Move(i, up)),
        ]
    }

    proptest! {
        #[test]
        fn length_and_uniqueness_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..64)) {
            let registry = registry();
            let templates: Vec<String> =
                registry.templates().iter().map(|t| t.id().to_string()).collect();
            let mut page = PageStore::new(registry);
            let (mut adds, mut deletes) = (0usize, 0usize);

            for op in ops {
                match op {
                    Op::Add(t) => {
                        page.add_block(&templates[t]).unwrap();
                        adds += 1;
                    }
                    Op::Delete(i) if !page.is_empty() => {
                        let id = page.blocks()[i % page.len()].instance_id.clone();
                        page.delete_block(&id).unwrap();
                        deletes += 1;
                    }
                    Op::Move(i, up) if !page.is_empty() => {
                        let index = i % page.len();
                        let id = page.blocks()[index].instance_id.clone();
                        let direction = if up { Direction::Up } else { Direction::Down };
                        let before = order(&page);
                        let outcome = page.move_block(&id, direction).unwrap();

                        let at_edge = (up && index == 0) || (!up && index + 1 == before.len());
                        prop_assert_eq!(outcome == MoveOutcome::NoOp, at_edge);
                        if at_edge {
                            prop_assert_eq!(order(&page), before);
                        }
                    }
                    _ => {}
                }

                let ids: HashSet<_> = page.blocks().iter().map(|b| &b.instance_id).collect();
                prop_assert_eq!(ids.len(), page.len());
            }

            prop_assert_eq!(page.len(), adds - deletes);
        }
    }
}
