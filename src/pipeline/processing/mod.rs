// Processing stages for one batch of normalized order rows
pub mod annotation;
pub mod grouping;
pub mod packaging;
pub mod review;
