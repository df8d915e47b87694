//! Reports module for MoneyNote
//!
//! Derived views over the stored records: the dashboard summary, spending
//! by category, monthly trends, and tag and payment-method breakdowns.

pub mod breakdown;
pub mod categories;
pub mod dashboard;
pub mod trend;

pub use breakdown::{Breakdown, BreakdownRow};
pub use categories::{CategoryBreakdown, CategorySpending, SubcategorySpending};
pub use dashboard::{Dashboard, RecentEntry};
pub use trend::{MonthSummary, TrendReport};
