/// Build version, injected by build.rs from `git describe`.
pub const GIT_VERSION: &str = env!("GIT_VERSION");
