//! Persistence boundary for assets and their boards.

use dashmap::DashMap;

use deprecia_shared::types::AssetId;

use super::error::AssetError;
use super::types::{Asset, DepreciationMove};

/// Repository trait for asset persistence.
///
/// The engine never talks to storage directly; the service loads through
/// this trait, computes on a private copy and writes the result back.
pub trait AssetRepository: Send + Sync {
    /// Loads an asset with its board.
    fn load_asset(&self, id: AssetId) -> Result<Option<Asset>, AssetError>;

    /// Inserts or replaces an asset with its board.
    fn save_asset(&self, asset: &Asset) -> Result<(), AssetError>;

    /// Loads the board of an asset.
    fn load_moves(&self, id: AssetId) -> Result<Vec<DepreciationMove>, AssetError>;

    /// Replaces the board of an existing asset.
    fn save_moves(&self, id: AssetId, moves: &[DepreciationMove]) -> Result<(), AssetError>;

    /// Assets spawned by increases on `parent_id`.
    fn children_of(&self, parent_id: AssetId) -> Result<Vec<Asset>, AssetError>;

    /// Saves several assets as one unit.
    ///
    /// Implementations backed by a database should wrap this in a transaction.
    fn commit(&self, assets: &[Asset]) -> Result<(), AssetError> {
        for asset in assets {
            self.save_asset(asset)?;
        }
        Ok(())
    }
}

/// In-memory repository backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryAssetRepository {
    assets: DashMap<AssetId, Asset>,
}

impl InMemoryAssetRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetRepository for InMemoryAssetRepository {
    fn load_asset(&self, id: AssetId) -> Result<Option<Asset>, AssetError> {
        Ok(self.assets.get(&id).map(|entry| entry.value().clone()))
    }

    fn save_asset(&self, asset: &Asset) -> Result<(), AssetError> {
        self.assets.insert(asset.id, asset.clone());
        Ok(())
    }

    fn load_moves(&self, id: AssetId) -> Result<Vec<DepreciationMove>, AssetError> {
        self.assets
            .get(&id)
            .map(|entry| entry.moves.clone())
            .ok_or(AssetError::AssetNotFound(id))
    }

    fn save_moves(&self, id: AssetId, moves: &[DepreciationMove]) -> Result<(), AssetError> {
        let mut entry = self
            .assets
            .get_mut(&id)
            .ok_or(AssetError::AssetNotFound(id))?;
        entry.moves = moves.to_vec();
        Ok(())
    }

    fn children_of(&self, parent_id: AssetId) -> Result<Vec<Asset>, AssetError> {
        let mut children: Vec<Asset> = self
            .assets
            .iter()
            .filter(|entry| {
                entry
                    .parent
                    .is_some_and(|link| link.parent_id == parent_id)
            })
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by_key(|child| (child.params.acquisition_date, child.id));
        Ok(children)
    }
}
