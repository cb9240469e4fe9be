pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const INFO: &str = "ℹ️";
    pub const LINK: &str = "🔗";
    pub const PACKAGE: &str = "📦";
}
