use serde::{Deserialize, Serialize};

// position of a vertex inside its partition, stable for the lifetime of a job
#[repr(transparent)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, Default,
)]
pub struct VID(pub usize);

impl VID {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for VID {
    fn from(id: usize) -> Self {
        VID(id)
    }
}

impl From<VID> for usize {
    fn from(id: VID) -> Self {
        id.0
    }
}

/// Physical address of a vertex: the partition that owns it and its slot there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalVertexRef {
    pub partition: usize,
    pub vid: VID,
}

impl LocalVertexRef {
    pub fn new(partition: usize, vid: VID) -> Self {
        Self { partition, vid }
    }
}
