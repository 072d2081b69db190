mod reconciler;
mod threshold_filter;

pub use reconciler::Reconciler;
pub use threshold_filter::ThresholdFilter;
