//! Chain profile repository implementation.
//!
//! Loads chain profiles from JSON files and serves them read-only to the balance
//! source and to wallet validation.

#![allow(clippy::result_large_err)]

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;

use crate::{
	models::{ChainProfile, ConfigLoader},
	repositories::error::RepositoryError,
};

/// Repository for storing and retrieving chain profiles
#[derive(Clone)]
pub struct ChainRepository {
	/// Map of chain ids to their profiles
	pub chains: HashMap<String, ChainProfile>,
}

impl ChainRepository {
	/// Create a new chain repository from the given path
	///
	/// Loads all chain profiles from JSON files in the specified directory
	/// (or default config directory if None is provided).
	pub async fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let chains = Self::load_all(path).await?;
		Ok(ChainRepository { chains })
	}

	/// Create a chain repository from profiles built in code
	pub fn new_with_chains(chains: impl IntoIterator<Item = ChainProfile>) -> Self {
		ChainRepository {
			chains: chains
				.into_iter()
				.map(|chain| (chain.id.clone(), chain))
				.collect(),
		}
	}
}

/// Interface for chain repository implementations
#[async_trait]
pub trait ChainRepositoryTrait: Clone + Send + Sync {
	/// Create a new chain repository from the given path
	async fn new(path: Option<&Path>) -> Result<Self, RepositoryError>
	where
		Self: Sized;

	/// Load all chain profiles from the given path
	///
	/// If no path is provided, uses the default config directory.
	async fn load_all(path: Option<&Path>)
		-> Result<HashMap<String, ChainProfile>, RepositoryError>;

	/// Get a specific chain by id
	///
	/// Returns None if the chain doesn't exist.
	fn get(&self, chain_id: &str) -> Option<ChainProfile>;

	/// Get all chains
	fn get_all(&self) -> HashMap<String, ChainProfile>;
}

#[async_trait]
impl ChainRepositoryTrait for ChainRepository {
	async fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		ChainRepository::new(path).await
	}

	async fn load_all(
		path: Option<&Path>,
	) -> Result<HashMap<String, ChainProfile>, RepositoryError> {
		ChainProfile::load_all(path).await.map_err(|e| {
			RepositoryError::load_error(
				"Failed to load chains",
				Some(Box::new(e)),
				Some(HashMap::from([(
					"path".to_string(),
					path.map_or_else(|| "default".to_string(), |p| p.display().to_string()),
				)])),
			)
		})
	}

	fn get(&self, chain_id: &str) -> Option<ChainProfile> {
		self.chains.get(chain_id).cloned()
	}

	fn get_all(&self) -> HashMap<String, ChainProfile> {
		self.chains.clone()
	}
}

/// Service layer for chain repository operations
#[derive(Clone)]
pub struct ChainService<T: ChainRepositoryTrait> {
	repository: T,
}

impl<T: ChainRepositoryTrait> ChainService<T> {
	/// Create a new chain service with the default repository implementation
	pub async fn new(path: Option<&Path>) -> Result<ChainService<ChainRepository>, RepositoryError> {
		let repository = ChainRepository::new(path).await?;
		Ok(ChainService { repository })
	}

	/// Create a new chain service with a custom repository implementation
	pub fn new_with_repository(repository: T) -> Result<Self, RepositoryError> {
		Ok(ChainService { repository })
	}

	/// Create a new chain service with a specific configuration path
	pub async fn new_with_path(
		path: Option<&Path>,
	) -> Result<ChainService<ChainRepository>, RepositoryError> {
		let repository = ChainRepository::new(path).await?;
		Ok(ChainService { repository })
	}

	/// Get a specific chain by id
	pub fn get(&self, chain_id: &str) -> Option<ChainProfile> {
		self.repository.get(chain_id)
	}

	/// Get all chains
	pub fn get_all(&self) -> HashMap<String, ChainProfile> {
		self.repository.get_all()
	}
}
