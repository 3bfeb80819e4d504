//! Everything a task body can see while it runs.

use std::sync::Arc;

use crate::config::Config;
use crate::core::task::Profile;
use crate::layout::Layout;
use crate::services::Services;
use crate::toolchain::Toolchain;

/// Shared, read-only view handed to every action.
///
/// Tasks never exchange data through the context; they communicate only
/// through the files described by [`Layout`].
#[derive(Clone)]
pub struct BuildContext {
    pub config: Arc<Config>,
    pub layout: Arc<Layout>,
    pub toolchain: Arc<dyn Toolchain>,
    pub services: Arc<Services>,
    pub profile: Profile,
}

impl BuildContext {
    pub fn source_maps(&self) -> bool {
        self.profile.source_maps()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("project", &self.layout.project())
            .field("profile", &self.profile)
            .finish()
    }
}
