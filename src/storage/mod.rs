pub mod memory;
pub mod models;
pub mod seed;

use crate::errors::Result;
use models::{CatalogStats, Clip, ClipQuery, NewClip};

pub trait ClipStorage {
    fn insert(&self, clip: NewClip) -> Result<Clip>;
    fn query(&self, query: &ClipQuery) -> Result<Vec<Clip>>;
    fn stats(&self) -> Result<CatalogStats>;
}
