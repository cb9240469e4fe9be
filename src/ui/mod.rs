pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, resolved, section, success};
pub use table::{stats_table, query_table, TableBuilder};
pub use theme::{theme, Theme};
