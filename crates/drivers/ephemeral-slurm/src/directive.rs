//! Shared directive assembly.

use stagehand_protocols::workflow::ServiceKind;

/// The directive prefix the buffer plugin expects.
///
/// Lua-based plugins are addressed as `BB_LUA <TAG>`, C plugins directly
/// as `<TAG>`.
pub fn prefix(lua_directives: bool, kind: ServiceKind) -> String {
    if lua_directives {
        format!("BB_LUA {}", kind.scheduler_tag())
    } else {
        kind.scheduler_tag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_lua_prefixes() {
        assert_eq!(prefix(false, ServiceKind::BurstBuffer), "SBB");
        assert_eq!(prefix(true, ServiceKind::BurstBuffer), "BB_LUA SBB");
        assert_eq!(prefix(true, ServiceKind::NamespaceExport), "BB_LUA GBF");
        assert_eq!(prefix(false, ServiceKind::CacheIndex), "DASI");
    }
}
