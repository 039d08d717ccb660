use akl_ir::{EnvId, EnvParent};

/// Arena of env-tree nodes (§3.2). Index 0 is the distinguished query
/// env, the implicit root of every computation; it has no parent.
pub struct EnvArena {
    parents: Vec<Option<EnvId>>,
}

impl EnvArena {
    /// Builds an arena already containing the query env at index 0.
    pub fn new() -> Self {
        EnvArena {
            parents: vec![None],
        }
    }

    pub fn query_env() -> EnvId {
        EnvId::from_raw(0)
    }

    /// Allocates a fresh env as a child of `parent`.
    pub fn child_of(&mut self, parent: EnvId) -> EnvId {
        let id = EnvId::from_raw(self.parents.len() as u32);
        self.parents.push(Some(parent));
        id
    }

    /// Moves `env` to a new parent (§4.E step 2: rehoming a promoted
    /// and-box's env onto its grandparent). Locality being a pure
    /// function of env-equality means this single pointer update is
    /// all that's needed to make every variable local to `env` local
    /// to `new_parent` instead.
    pub fn reparent(&mut self, env: EnvId, new_parent: EnvId) {
        self.parents[env.index()] = Some(new_parent);
    }
}

impl Default for EnvArena {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvParent for EnvArena {
    fn parent(&self, env: EnvId) -> Option<EnvId> {
        self.parents[env.index()]
    }
}
