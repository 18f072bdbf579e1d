use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single identified cell of a notebook.
///
/// `id` is the stable identifier; every other member of the cell object is
/// kept as the payload in its original key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Cell {
    pub fn new(id: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}

/// A notebook: an ordered sequence of cells plus opaque top-level members
/// (metadata, format versions) that ride along untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            extra: Map::new(),
        }
    }

    /// Cell identifiers in presentation order
    pub fn cell_ids(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.id.clone()).collect()
    }
}
