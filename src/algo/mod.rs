/// Table-based value learning for discrete environments
pub mod tabular;
