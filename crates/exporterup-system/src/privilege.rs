/// Administrative-rights check. The tool mutates system paths and the
/// service manager, so a non-root invocation is rejected before anything
/// else happens.
pub fn effective_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}
