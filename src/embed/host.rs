//! The page the widget is embedded in.

use super::view::Frame;

/// Opaque handle to the element the widget renders into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountId(pub String);

/// Document operations the bootstrap needs. Implementations own any
/// interior mutability; the bootstrap drives them from one task.
pub trait EmbedHost: Send + Sync {
    fn has_element(&self, id: &str) -> bool;

    fn inject_style(&self, id: &str, css: &str);

    fn find_container(&self, id: &str) -> Option<MountId>;

    /// Creates a new element with `class_name` right before the script tag.
    fn create_mount_before_script(&self, class_name: &str) -> MountId;

    fn render(&self, mount: &MountId, frame: &Frame);

    fn dispatch_event(&self, name: &str, detail: serde_json::Value);

    fn navigate(&self, url: &str);
}
