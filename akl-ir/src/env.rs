use crate::EnvId;

/// Supplies the parent link of the env tree (§3.2). `akl-engine`
/// implements this over its env arena; keeping it as a trait here
/// means the scope predicates below don't need to know how envs are
/// stored, only how to walk up one level.
pub trait EnvParent {
    /// The parent of `env`, or `None` if `env` is the query env (the
    /// implicit root of every computation).
    fn parent(&self, env: EnvId) -> Option<EnvId>;
}

/// `is_local(v, andb)` of §4.B: true iff `v`'s env is exactly `andb`'s
/// env.
pub fn is_local(var_env: Option<EnvId>, andbox_env: EnvId) -> bool {
    var_env == Some(andbox_env)
}

/// `is_external(v, andb)` of §4.B: true iff `v`'s env is a strict
/// ancestor of `andb`'s env, or `v` has no env at all (a naked query
/// variable, which is external to every and-box). O(depth) in the env
/// chain.
pub fn is_external<C: EnvParent>(chain: &C, var_env: Option<EnvId>, andbox_env: EnvId) -> bool {
    let Some(target) = var_env else {
        return true;
    };
    if target == andbox_env {
        return false;
    }
    let mut cursor = chain.parent(andbox_env);
    while let Some(here) = cursor {
        if here == target {
            return true;
        }
        cursor = chain.parent(here);
    }
    false
}
